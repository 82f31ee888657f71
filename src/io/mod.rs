//! Binary matrix I/O: writers for every section of the output file, and a
//! memory-mapped reader for the consuming side.
//!
//! The overall file layout is:
//!
//! 1. HEADER (64 bytes, fixed)
//! 2. MATRIX (row records: one prefix word + NC payload words per row)
//! 3. STRINGS (optional, padded to a 16-byte boundary)
//! 4. ROWMAP (optional, padded to a 512-byte boundary)
//!
//! All integers are little-endian unsigned 32-bit; all offsets are byte
//! offsets from the start of the file.

pub mod header;
pub mod matrix;
pub mod metadata;
pub mod prefix;
pub mod reader;
pub mod rowmap;

pub use header::FileHeader;
pub use metadata::MetadataWriter;
pub use prefix::RowPrefix;
pub use reader::{MatrixFile, RowView};

/// Bit pattern marking a missing value in both float and integer payloads.
///
/// This is the canonical quiet-NaN pattern, reused as the missing-integer
/// sentinel: category codes are bounded by [`MAX_LEVELS`], so the pattern
/// can never collide with a real code. A fixed contract value.
pub const MISSING_WORD: u32 = 0x7FC0_0000;

/// Maximum number of distinct levels a categorical row may carry.
///
/// Rows exceeding this either fail the conversion or, when implicit
/// conversion is enabled, are re-encoded as numeric. A fixed contract value.
pub const MAX_LEVELS: usize = 32;

//! pairprep - feature matrix preprocessor for the pairwise statistics engine
//!
//! Converts a "TCGA format" tab-delimited feature matrix into the compact
//! binary representation the pairwise executable consumes. The conversion
//! carries out, once and in a safe place, the inspections that would
//! otherwise be done redundantly by the statistics engine on every run:
//!
//! 1. Every value of the original matrix becomes a 4-byte float or integer.
//! 2. Every row is prefixed by a 32-bit word conveying its attributes —
//!    missing-value count, category count, discrete flag, degeneracy.
//! 3. Optionally, a sorted string table of row names and a parallel offset
//!    map are appended, enabling feature lookup by name.
//!
//! The resulting file is `HEADER | MATRIX | STRINGS | ROWMAP` with the last
//! two sections optional; see [`io`] for the exact layout. A line-oriented
//! metadata side channel records NA counts, category encodings and
//! conversion notices for audit.
//!
//! # Example
//!
//! ```no_run
//! use pairprep::{convert_file, ConvertOptions, MatrixFile};
//! use std::path::Path;
//!
//! # fn main() -> pairprep::Result<()> {
//! // Digest computed by the caller; embedded verbatim for provenance.
//! let digest = *b"5eb63bbbe01eeed093cb22bb8f5acdc3";
//!
//! let summary = convert_file(Path::new("expr.tab"), &digest, &ConvertOptions::default())?;
//! println!("{} rows x {} columns", summary.rows, summary.columns);
//!
//! // Read it back through the row map.
//! let matrix = MatrixFile::open(&summary.matrix_path)?;
//! if let Some(index) = matrix.lookup("N:gene1") {
//!     let row = matrix.row(index).unwrap();
//!     println!("NA count: {}", row.prefix().na_count());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod formats;
pub mod io;

pub use config::ConvertOptions;
pub use convert::{convert_file, output_paths, ConvertSummary};
pub use error::{PrepError, Result};
pub use io::{FileHeader, MatrixFile, RowPrefix, RowView};

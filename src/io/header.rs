//! The fixed 64-byte file header.
//!
//! Layout (all integers little-endian u32):
//!
//! | Offset | Field | Size |
//! |---|---|---|
//! | 0 | signature `"PAIRWISE"` | 8 |
//! | 8 | header size (= 64) | 4 |
//! | 12 | row count | 4 |
//! | 16 | data column count | 4 |
//! | 20 | string-table offset (0 = absent) | 4 |
//! | 24 | row-map offset (0 = absent) | 4 |
//! | 28 | reserved (0) | 4 |
//! | 32 | content digest | 32 |
//!
//! Row count, column count and the section offsets are unknown until the
//! whole matrix has been encoded, so the header is written twice: a
//! placeholder with zeroed fields up front, then a seek back to offset 8 to
//! patch the five counted fields once everything else is on disk.

use crate::error::{PrepError, Result};
use std::io::{Seek, SeekFrom, Write};

/// File signature, first 8 bytes of every converted matrix.
pub const SIGNATURE: &[u8; 8] = b"PAIRWISE";

/// Total header size in bytes.
pub const HEADER_SIZE: u32 = 64;

/// Length of the embedded content digest.
pub const DIGEST_LEN: usize = 32;

/// Byte offset of the first backpatched field (header size).
const PATCH_OFFSET: u64 = 8;

/// Writes the placeholder header: signature, zeroed count/offset fields,
/// and the caller-supplied content digest.
///
/// The digest is opaque to the converter; it is embedded verbatim to tie
/// the output to its source matrix.
///
/// # Errors
///
/// Any I/O failure, including a short write, is fatal.
pub fn write_placeholder<W: Write>(sink: &mut W, digest: &[u8; DIGEST_LEN]) -> Result<()> {
    let mut buf = [0u8; HEADER_SIZE as usize];
    buf[..SIGNATURE.len()].copy_from_slice(SIGNATURE);
    buf[32..].copy_from_slice(digest);
    sink.write_all(&buf)?;
    Ok(())
}

/// Seeks back over a placeholder header and fills in the final values.
///
/// An offset of 0 in either section field means the section is absent.
///
/// # Errors
///
/// Returns [`PrepError::OffsetOverflow`] if either section offset exceeds
/// the 32-bit range the header can represent (capping the string/row-map
/// sections at 4 GiB), before anything is patched.
pub fn backpatch<W: Write + Seek>(
    sink: &mut W,
    rows: u32,
    columns: u32,
    string_offset: u64,
    rowmap_offset: u64,
) -> Result<()> {
    for offset in [string_offset, rowmap_offset] {
        if offset > u32::MAX as u64 {
            return Err(PrepError::OffsetOverflow { offset });
        }
    }

    let mut buf = [0u8; 20];
    buf[0..4].copy_from_slice(&HEADER_SIZE.to_le_bytes());
    buf[4..8].copy_from_slice(&rows.to_le_bytes());
    buf[8..12].copy_from_slice(&columns.to_le_bytes());
    buf[12..16].copy_from_slice(&(string_offset as u32).to_le_bytes());
    buf[16..20].copy_from_slice(&(rowmap_offset as u32).to_le_bytes());

    sink.seek(SeekFrom::Start(PATCH_OFFSET))?;
    sink.write_all(&buf)?;
    Ok(())
}

/// A parsed and validated file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Number of row records
    pub rows: u32,
    /// Number of data columns per row (prefix word excluded)
    pub columns: u32,
    /// Byte offset of the string table, 0 if absent
    pub string_offset: u32,
    /// Byte offset of the row map, 0 if absent
    pub rowmap_offset: u32,
    /// Content digest of the source matrix
    pub digest: [u8; DIGEST_LEN],
}

impl FileHeader {
    /// Parses a header from the first bytes of a matrix file.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidMatrixFile`] if the input is shorter than
    /// a header, the signature is wrong, or the recorded header size
    /// disagrees with this format revision.
    pub fn read_from(bytes: &[u8]) -> Result<FileHeader> {
        if bytes.len() < HEADER_SIZE as usize {
            return Err(PrepError::InvalidMatrixFile {
                reason: format!("{} bytes is shorter than the 64-byte header", bytes.len()),
            });
        }
        if &bytes[..SIGNATURE.len()] != SIGNATURE {
            return Err(PrepError::InvalidMatrixFile {
                reason: "bad signature (not a PAIRWISE matrix)".to_string(),
            });
        }
        let header_size = read_u32(bytes, 8);
        if header_size != HEADER_SIZE {
            return Err(PrepError::InvalidMatrixFile {
                reason: format!("unsupported header size {}", header_size),
            });
        }

        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&bytes[32..64]);

        Ok(FileHeader {
            rows: read_u32(bytes, 12),
            columns: read_u32(bytes, 16),
            string_offset: read_u32(bytes, 20),
            rowmap_offset: read_u32(bytes, 24),
            digest,
        })
    }

    /// True if the file carries a string table.
    pub fn has_string_table(&self) -> bool {
        self.string_offset != 0
    }

    /// True if the file carries a row map.
    pub fn has_row_map(&self) -> bool {
        self.rowmap_offset != 0
    }
}

pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DIGEST: [u8; DIGEST_LEN] = *b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_placeholder_is_64_bytes() {
        let mut sink = Cursor::new(Vec::new());
        write_placeholder(&mut sink, &DIGEST).unwrap();

        let bytes = sink.into_inner();
        assert_eq!(bytes.len(), 64);
        assert_eq!(&bytes[..8], b"PAIRWISE");
        // all counted fields zeroed until backpatch
        assert!(bytes[8..32].iter().all(|&b| b == 0));
        assert_eq!(&bytes[32..], &DIGEST);
    }

    #[test]
    fn test_backpatch_round_trip() {
        let mut sink = Cursor::new(Vec::new());
        write_placeholder(&mut sink, &DIGEST).unwrap();
        backpatch(&mut sink, 12, 40, 2128, 2560).unwrap();

        let header = FileHeader::read_from(sink.get_ref()).unwrap();
        assert_eq!(header.rows, 12);
        assert_eq!(header.columns, 40);
        assert_eq!(header.string_offset, 2128);
        assert_eq!(header.rowmap_offset, 2560);
        assert_eq!(header.digest, DIGEST);
        assert!(header.has_string_table());
        assert!(header.has_row_map());
    }

    #[test]
    fn test_backpatch_zero_offsets_mean_absent() {
        let mut sink = Cursor::new(Vec::new());
        write_placeholder(&mut sink, &DIGEST).unwrap();
        backpatch(&mut sink, 1, 1, 0, 0).unwrap();

        let header = FileHeader::read_from(sink.get_ref()).unwrap();
        assert!(!header.has_string_table());
        assert!(!header.has_row_map());
    }

    #[test]
    fn test_backpatch_rejects_wide_offsets() {
        let mut sink = Cursor::new(Vec::new());
        write_placeholder(&mut sink, &DIGEST).unwrap();

        let too_far = u32::MAX as u64 + 1;
        match backpatch(&mut sink, 1, 1, too_far, 0) {
            Err(PrepError::OffsetOverflow { offset }) => assert_eq!(offset, too_far),
            other => panic!("expected OffsetOverflow, got {:?}", other),
        }
        // nothing was patched
        assert!(sink.get_ref()[8..32].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_read_rejects_bad_signature() {
        let mut bytes = vec![0u8; 64];
        bytes[..8].copy_from_slice(b"NOTAMTRX");
        assert!(matches!(
            FileHeader::read_from(&bytes),
            Err(PrepError::InvalidMatrixFile { .. })
        ));
    }

    #[test]
    fn test_read_rejects_truncation() {
        assert!(matches!(
            FileHeader::read_from(&[0u8; 10]),
            Err(PrepError::InvalidMatrixFile { .. })
        ));
    }
}

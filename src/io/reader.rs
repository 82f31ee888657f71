//! Memory-mapped reader for converted matrices.
//!
//! The binary format is designed to be consumed in place: the whole file is
//! mapped read-only and every access decodes little-endian words straight
//! out of the map. Row lookup by name binary-searches the row map, whose
//! entries are sorted by name at write time.
//!
//! # Example
//!
//! ```no_run
//! use pairprep::io::MatrixFile;
//!
//! # fn main() -> pairprep::Result<()> {
//! let matrix = MatrixFile::open("expr.bin")?;
//! println!("{} rows x {} columns", matrix.rows(), matrix.columns());
//!
//! if let Some(index) = matrix.lookup("N:gene1") {
//!     let row = matrix.row(index).unwrap();
//!     println!("NA count: {}", row.prefix().na_count());
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{PrepError, Result};
use crate::io::header::{read_u32, FileHeader, HEADER_SIZE};
use crate::io::prefix::RowPrefix;
use crate::io::MISSING_WORD;
use memmap2::Mmap;
use std::cmp::Ordering;
use std::fs::File;
use std::path::Path;

/// A converted matrix, memory-mapped and validated.
pub struct MatrixFile {
    map: Mmap,
    header: FileHeader,
}

impl MatrixFile {
    /// Maps a matrix file and validates its header and section bounds.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidMatrixFile`] if the signature or header
    /// size is wrong, or if any section extends past the end of the file.
    pub fn open(path: impl AsRef<Path>) -> Result<MatrixFile> {
        let file = File::open(path)?;
        let map = unsafe { Mmap::map(&file)? };
        let header = FileHeader::read_from(&map)?;

        let record_bytes = header.rows as u64 * (header.columns as u64 + 1) * 4;
        let matrix_end = HEADER_SIZE as u64 + record_bytes;
        if (map.len() as u64) < matrix_end {
            return Err(PrepError::InvalidMatrixFile {
                reason: format!(
                    "row records end at byte {} but the file holds {}",
                    matrix_end,
                    map.len()
                ),
            });
        }

        if header.has_row_map() {
            if !header.has_string_table() {
                return Err(PrepError::InvalidMatrixFile {
                    reason: "row map present without a string table".to_string(),
                });
            }
            let map_end = header.rowmap_offset as u64 + header.rows as u64 * 8;
            if (map.len() as u64) < map_end {
                return Err(PrepError::InvalidMatrixFile {
                    reason: format!(
                        "row map ends at byte {} but the file holds {}",
                        map_end,
                        map.len()
                    ),
                });
            }
        }

        Ok(MatrixFile { map, header })
    }

    /// The parsed file header.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.header.rows
    }

    /// Number of data columns per row.
    pub fn columns(&self) -> u32 {
        self.header.columns
    }

    /// The content digest embedded at conversion time.
    pub fn digest(&self) -> &[u8] {
        &self.header.digest
    }

    /// Returns one row's prefix and payload, or `None` past the end.
    pub fn row(&self, index: u32) -> Option<RowView<'_>> {
        if index >= self.header.rows {
            return None;
        }
        let stride = (self.header.columns as usize + 1) * 4;
        let start = HEADER_SIZE as usize + index as usize * stride;
        Some(RowView {
            prefix: RowPrefix::unpack(read_u32(&self.map, start)),
            payload: &self.map[start + 4..start + stride],
        })
    }

    /// Looks a row up by name through the row map.
    ///
    /// Returns the row's index in the matrix, or `None` if the name is
    /// absent or the file was written without a string table.
    pub fn lookup(&self, name: &str) -> Option<u32> {
        if !self.header.has_row_map() {
            return None;
        }

        let wanted = name.as_bytes();
        let mut lo = 0u32;
        let mut hi = self.header.rows;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let (string_offset, row_index) = self.map_entry(mid);
            match self.name_bytes(string_offset).cmp(wanted) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Some(row_index),
            }
        }
        None
    }

    /// Returns each row's name, indexed by row position.
    ///
    /// Rows the map does not cover (never the case for files this crate
    /// writes) come back empty. Returns `None` if the file was written
    /// without a string table.
    pub fn names_by_row(&self) -> Option<Vec<String>> {
        if !self.header.has_row_map() {
            return None;
        }

        let mut names = vec![String::new(); self.header.rows as usize];
        for entry in 0..self.header.rows {
            let (string_offset, row_index) = self.map_entry(entry);
            if let Some(slot) = names.get_mut(row_index as usize) {
                *slot = String::from_utf8_lossy(self.name_bytes(string_offset)).into_owned();
            }
        }
        Some(names)
    }

    /// Reads the row map's `entry`-th `(string_offset, row_index)` pair.
    fn map_entry(&self, entry: u32) -> (u32, u32) {
        let at = self.header.rowmap_offset as usize + entry as usize * 8;
        (read_u32(&self.map, at), read_u32(&self.map, at + 4))
    }

    /// The NUL-terminated name starting at `string_offset` in the table.
    fn name_bytes(&self, string_offset: u32) -> &[u8] {
        let start = self.header.string_offset as usize + string_offset as usize;
        let tail = &self.map[start.min(self.map.len())..];
        match tail.iter().position(|&b| b == 0) {
            Some(nul) => &tail[..nul],
            None => tail,
        }
    }
}

/// One row of a mapped matrix: decoded prefix plus raw payload.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    prefix: RowPrefix,
    payload: &'a [u8],
}

impl<'a> RowView<'a> {
    /// The row's metadata prefix.
    pub fn prefix(&self) -> RowPrefix {
        self.prefix
    }

    /// Number of payload words.
    pub fn columns(&self) -> usize {
        self.payload.len() / 4
    }

    /// The raw payload word at `col`, or `None` out of range.
    pub fn word(&self, col: usize) -> Option<u32> {
        if col >= self.columns() {
            return None;
        }
        Some(read_u32(self.payload, col * 4))
    }

    /// A numeric row's value at `col`; `None` if missing or out of range.
    pub fn value(&self, col: usize) -> Option<f32> {
        match self.word(col)? {
            MISSING_WORD => None,
            bits => Some(f32::from_bits(bits)),
        }
    }

    /// A discrete row's category code at `col`; `None` if missing or out of
    /// range.
    pub fn code(&self, col: usize) -> Option<u32> {
        match self.word(col)? {
            MISSING_WORD => None,
            code => Some(code),
        }
    }
}

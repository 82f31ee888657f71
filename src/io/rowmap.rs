//! The optional string table and row map appendix.
//!
//! When row names are kept, two sections follow the matrix:
//!
//! 1. STRINGS — every row name, sorted ascending, NUL-terminated, packed
//!    back to back (a ragged array). Padded to a 16-byte boundary so hex
//!    dumps line up.
//! 2. ROWMAP — one `(string_offset: u32, row_index: u32)` pair per row, in
//!    the same sorted order. String offsets are relative to the STRINGS
//!    base. Padded to a 512-byte (disk sector) boundary.
//!
//! Because both sections share one sort order, the downstream engine can
//! binary-search the row map by name. Duplicate names are permitted; the
//! sort is stable, so duplicates keep their input order.

use crate::error::Result;
use std::io::{Seek, Write};

/// STRINGS section alignment.
pub const STRING_ALIGNMENT: u64 = 16;

/// ROWMAP section alignment (storage sector size).
pub const SECTOR_SIZE: u64 = 512;

/// Appends the string table and row map to the output.
///
/// `names` holds one `(row_name, row_index)` pair per encoded row, in input
/// order. Returns the byte offsets (from file start) of the two sections
/// for the header backpatch.
///
/// # Errors
///
/// Write failures are fatal; the caller's cleanup guard removes the file.
pub fn append_row_names<W: Write + Seek>(
    sink: &mut W,
    names: &[(String, u32)],
) -> Result<(u64, u64)> {
    let mut ordered: Vec<&(String, u32)> = names.iter().collect();
    ordered.sort_by(|a, b| a.0.cmp(&b.0));

    pad_to(sink, STRING_ALIGNMENT)?;
    let string_base = sink.stream_position()?;

    // Store the strings, noting each one's offset FROM THE BASE of the
    // section; those relative offsets become the row map's first column.
    let mut entries: Vec<(u32, u32)> = Vec::with_capacity(ordered.len());
    for (name, row_index) in ordered {
        let offset = sink.stream_position()? - string_base;
        sink.write_all(name.as_bytes())?;
        sink.write_all(&[0])?;
        entries.push((offset as u32, *row_index));
    }

    pad_to(sink, SECTOR_SIZE)?;
    let map_base = sink.stream_position()?;

    for (string_offset, row_index) in entries {
        sink.write_all(&string_offset.to_le_bytes())?;
        sink.write_all(&row_index.to_le_bytes())?;
    }

    Ok((string_base, map_base))
}

/// Pads the sink with NULs up to the next `alignment`-byte boundary.
fn pad_to<W: Write + Seek>(sink: &mut W, alignment: u64) -> Result<()> {
    let position = sink.stream_position()?;
    let remainder = position % alignment;
    if remainder != 0 {
        let padding = (alignment - remainder) as usize;
        sink.write_all(&vec![0u8; padding])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn pairs(names: &[(&str, u32)]) -> Vec<(String, u32)> {
        names.iter().map(|(n, i)| (n.to_string(), *i)).collect()
    }

    fn read_entries(bytes: &[u8], map_base: u64, count: usize) -> Vec<(u32, u32)> {
        (0..count)
            .map(|i| {
                let at = map_base as usize + i * 8;
                (
                    crate::io::header::read_u32(bytes, at),
                    crate::io::header::read_u32(bytes, at + 4),
                )
            })
            .collect()
    }

    #[test]
    fn test_names_sorted_and_nul_terminated() {
        // start mid-stream to exercise the 16-byte alignment
        let mut sink = Cursor::new(vec![0xAAu8; 70]);
        sink.set_position(70);

        let (string_base, map_base) =
            append_row_names(&mut sink, &pairs(&[("N:b", 0), ("N:a", 1)])).unwrap();
        assert_eq!(string_base, 80);
        assert_eq!(map_base, 512);

        let bytes = sink.into_inner();
        // ascending name order: "N:a" first despite being row 1
        assert_eq!(&bytes[80..88], b"N:a\0N:b\0");

        let entries = read_entries(&bytes, map_base, 2);
        assert_eq!(entries, vec![(0, 1), (4, 0)]);
    }

    #[test]
    fn test_offsets_strictly_increasing() {
        let mut sink = Cursor::new(Vec::new());
        let names = pairs(&[("N:gene3", 0), ("N:gene1", 1), ("N:gene2", 2)]);

        let (_, map_base) = append_row_names(&mut sink, &names).unwrap();
        let bytes = sink.into_inner();
        let entries = read_entries(&bytes, map_base, 3);

        assert_eq!(entries[0], (0, 1)); // N:gene1
        assert_eq!(entries[1], (8, 2)); // N:gene2
        assert_eq!(entries[2], (16, 0)); // N:gene3
        assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_duplicate_names_keep_input_order() {
        let mut sink = Cursor::new(Vec::new());
        let names = pairs(&[("N:dup", 0), ("N:aaa", 1), ("N:dup", 2)]);

        let (_, map_base) = append_row_names(&mut sink, &names).unwrap();
        let bytes = sink.into_inner();
        let entries = read_entries(&bytes, map_base, 3);

        assert_eq!(entries[0].1, 1); // N:aaa
        assert_eq!(entries[1].1, 0); // first N:dup keeps earlier index
        assert_eq!(entries[2].1, 2);
    }

    #[test]
    fn test_map_lands_on_sector_boundary() {
        let mut sink = Cursor::new(Vec::new());
        let names = pairs(&[("N:x", 0)]);

        let (string_base, map_base) = append_row_names(&mut sink, &names).unwrap();
        assert_eq!(string_base, 0);
        assert_eq!(map_base % SECTOR_SIZE, 0);
    }

    #[test]
    fn test_empty_name_list() {
        let mut sink = Cursor::new(vec![1u8; 64]);
        sink.set_position(64);

        let (string_base, map_base) = append_row_names(&mut sink, &[]).unwrap();
        assert_eq!(string_base, 64);
        assert_eq!(map_base, 512);
    }
}

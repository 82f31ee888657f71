//! The conversion pipeline.
//!
//! Drives a single streaming pass over a TCGA-format matrix:
//!
//! 1. write the placeholder header
//! 2. classify and encode every data row in input order
//! 3. append the string table and row map (unless names are excluded)
//! 4. seek back and patch the header with the final counts and offsets
//!
//! The pass is strictly sequential; the output sink is exclusively owned by
//! the pipeline for the whole operation. Every fatal error aborts the whole
//! production, and a cleanup guard deletes both output files so no
//! downstream consumer can observe a truncated or inconsistent artifact.

use crate::config::ConvertOptions;
use crate::error::{PrepError, Result};
use crate::formats::tcga::{RowType, TcgaParser};
use crate::io::header::{self, DIGEST_LEN};
use crate::io::matrix::{write_categorical_row, write_numeric_row};
use crate::io::metadata::MetadataWriter;
use crate::io::rowmap;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

/// What a successful conversion produced.
#[derive(Debug)]
pub struct ConvertSummary {
    /// Number of data rows encoded
    pub rows: u32,
    /// Number of data columns per row
    pub columns: u32,
    /// Path of the binary matrix
    pub matrix_path: PathBuf,
    /// Path of the metadata side channel
    pub metadata_path: PathBuf,
    /// Byte offsets of the string table and row map, if written
    pub sections: Option<(u64, u64)>,
}

/// Derives the output paths for an input matrix: `<stem>.bin` for the
/// binary matrix and `<stem>.cat` for the metadata side channel.
pub fn output_paths(input: &Path) -> (PathBuf, PathBuf) {
    (input.with_extension("bin"), input.with_extension("cat"))
}

/// Converts one matrix file.
///
/// `digest` is the precomputed content digest of the input, embedded
/// verbatim in the header for provenance; the converter itself never
/// computes it.
///
/// # Errors
///
/// Fails up front with [`PrepError::OutputExists`] if either output is
/// already present and overwriting was not requested. Any error after that
/// — format, cardinality, I/O, offset overflow — aborts the conversion and
/// removes both partially written outputs.
///
/// # Examples
///
/// ```no_run
/// use pairprep::{convert_file, ConvertOptions};
/// use std::path::Path;
///
/// # fn main() -> pairprep::Result<()> {
/// let digest = *b"5eb63bbbe01eeed093cb22bb8f5acdc3";
/// let summary = convert_file(Path::new("expr.tab"), &digest, &ConvertOptions::default())?;
/// println!("{} rows x {} columns", summary.rows, summary.columns);
/// # Ok(())
/// # }
/// ```
pub fn convert_file(
    input: &Path,
    digest: &[u8; DIGEST_LEN],
    options: &ConvertOptions,
) -> Result<ConvertSummary> {
    let (matrix_path, metadata_path) = output_paths(input);
    if !options.overwrite {
        for path in [&matrix_path, &metadata_path] {
            if path.exists() {
                return Err(PrepError::OutputExists(path.clone()));
            }
        }
    }

    let parser = TcgaParser::open(input)?;

    // From here on every exit path either disarms the guard or loses both
    // output files.
    let guard = OutputGuard::new(vec![matrix_path.clone(), metadata_path.clone()]);
    let mut sink = BufWriter::new(File::create(&matrix_path)?);
    let mut meta = MetadataWriter::new(BufWriter::new(File::create(&metadata_path)?));

    meta.preamble(
        &input.display().to_string(),
        &String::from_utf8_lossy(digest),
    )?;

    let (rows, columns, sections) = run_pipeline(parser, &mut sink, &mut meta, digest, options)?;

    sink.flush()?;
    meta.flush()?;
    guard.disarm();

    Ok(ConvertSummary {
        rows,
        columns,
        matrix_path,
        metadata_path,
        sections,
    })
}

/// The row-classifier loop and section writers, generic over the sinks so
/// the unit tests can drive it in memory.
fn run_pipeline<R: Read, W: Write + Seek, M: Write>(
    mut parser: TcgaParser<R>,
    sink: &mut W,
    meta: &mut MetadataWriter<M>,
    digest: &[u8; DIGEST_LEN],
    options: &ConvertOptions,
) -> Result<(u32, u32, Option<(u64, u64)>)> {
    header::write_placeholder(sink, digest)?;

    // The header row, when present, fixes the data column count; otherwise
    // the first data row does.
    let mut expected: Option<usize> = None;
    if options.expect_header {
        if let Some(samples) = parser.read_header()? {
            expected = Some(samples.len());
        }
    }

    let mut names: Vec<(String, u32)> = Vec::new();
    for row in parser {
        let row = row?;
        let index = names.len() as u32;

        let actual = row.cells.len();
        match expected {
            None => expected = Some(actual),
            Some(e) if e != actual => {
                return Err(PrepError::ColumnCountMismatch {
                    line: row.line,
                    expected: e,
                    actual,
                })
            }
            Some(_) => {}
        }

        match row.row_type {
            RowType::Numeric => {
                write_numeric_row(sink, meta, index, &row.cells, row.line)?;
            }
            RowType::Boolean | RowType::Categorical => {
                write_categorical_row(
                    sink,
                    meta,
                    index,
                    &row.cells,
                    row.line,
                    options.allow_implicit_numeric,
                )
                .map_err(|e| e.in_row(&row.name))?;
            }
        }

        names.push((row.name, index));
    }

    let rows = names.len() as u32;
    let columns = expected.unwrap_or(0) as u32;

    let sections = if options.include_string_table {
        Some(rowmap::append_row_names(sink, &names)?)
    } else {
        None
    };

    let (string_offset, rowmap_offset) = sections.unwrap_or((0, 0));
    header::backpatch(sink, rows, columns, string_offset, rowmap_offset)?;

    Ok((rows, columns, sections))
}

/// Removes the output files on drop unless the conversion succeeded.
struct OutputGuard {
    paths: Vec<PathBuf>,
    armed: bool,
}

impl OutputGuard {
    fn new(paths: Vec<PathBuf>) -> OutputGuard {
        OutputGuard { paths, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if self.armed {
            for path in &self.paths {
                let _ = fs::remove_file(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MatrixFile;

    const DIGEST: [u8; DIGEST_LEN] = *b"0123456789abcdef0123456789abcdef";

    fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_basic_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            dir.path(),
            "expr.tab",
            "id\ts1\ts2\ts3\nN:a\t1.0\t2.0\t3.0\nC:b\tx\ty\tx\n",
        );

        let summary = convert_file(&input, &DIGEST, &ConvertOptions::default()).unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns, 3);
        assert!(summary.sections.is_some());

        let matrix = MatrixFile::open(&summary.matrix_path).unwrap();
        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.columns(), 3);
        assert_eq!(matrix.digest(), &DIGEST);
        assert_eq!(matrix.lookup("C:b"), Some(1));

        let metadata = fs::read_to_string(&summary.metadata_path).unwrap();
        assert!(metadata.starts_with("# for matrix"));
        assert!(metadata.contains("FE\t1\t2"));
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "expr.tab", "id\ts1\nN:a\t1\n");
        fs::write(dir.path().join("expr.bin"), b"precious").unwrap();

        match convert_file(&input, &DIGEST, &ConvertOptions::default()) {
            Err(PrepError::OutputExists(path)) => {
                assert!(path.ends_with("expr.bin"))
            }
            other => panic!("expected OutputExists, got {:?}", other),
        }
        // the pre-existing file is untouched
        assert_eq!(fs::read(dir.path().join("expr.bin")).unwrap(), b"precious");
    }

    #[test]
    fn test_overwrite_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "expr.tab", "id\ts1\nN:a\t1\n");
        fs::write(dir.path().join("expr.bin"), b"old").unwrap();

        let options = ConvertOptions {
            overwrite: true,
            ..ConvertOptions::default()
        };
        let summary = convert_file(&input, &DIGEST, &options).unwrap();
        assert_eq!(summary.rows, 1);
    }

    #[test]
    fn test_column_mismatch_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            dir.path(),
            "expr.tab",
            "id\ts1\ts2\nN:a\t1\t2\nN:b\t1\t2\t3\n",
        );

        match convert_file(&input, &DIGEST, &ConvertOptions::default()) {
            Err(PrepError::ColumnCountMismatch {
                line: 3,
                expected: 2,
                actual: 3,
            }) => {}
            other => panic!("expected ColumnCountMismatch, got {:?}", other),
        }

        assert!(!dir.path().join("expr.bin").exists());
        assert!(!dir.path().join("expr.cat").exists());
    }

    #[test]
    fn test_no_header_first_row_fixes_columns() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "expr.tab", "N:a\t1\t2\nN:b\t3\t4\n");

        let options = ConvertOptions {
            expect_header: false,
            ..ConvertOptions::default()
        };
        let summary = convert_file(&input, &DIGEST, &options).unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns, 2);
    }

    #[test]
    fn test_names_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "expr.tab", "id\ts1\nN:a\t1\n");

        let options = ConvertOptions {
            include_string_table: false,
            ..ConvertOptions::default()
        };
        let summary = convert_file(&input, &DIGEST, &options).unwrap();
        assert!(summary.sections.is_none());

        let matrix = MatrixFile::open(&summary.matrix_path).unwrap();
        assert!(!matrix.header().has_string_table());
        assert!(!matrix.header().has_row_map());
        assert_eq!(matrix.lookup("N:a"), None);
    }

    #[test]
    fn test_cardinality_error_is_tagged_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let labels: Vec<String> = (0..40).map(|i| format!("v{}", i)).collect();
        let content = format!(
            "id\t{}\nC:wide\t{}\n",
            (0..40).map(|i| format!("s{}", i)).collect::<Vec<_>>().join("\t"),
            labels.join("\t")
        );
        let input = write_input(dir.path(), "expr.tab", &content);

        match convert_file(&input, &DIGEST, &ConvertOptions::default()) {
            Err(PrepError::InRow { row, source }) => {
                assert_eq!(row, "C:wide");
                assert!(matches!(*source, PrepError::TooManyLevels { levels: 40 }));
            }
            other => panic!("expected InRow, got {:?}", other),
        }

        assert!(!dir.path().join("expr.bin").exists());
        assert!(!dir.path().join("expr.cat").exists());
    }

    #[test]
    fn test_unknown_tag_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "expr.tab", "id\ts1\nQ:weird\t1\n");

        assert!(matches!(
            convert_file(&input, &DIGEST, &ConvertOptions::default()),
            Err(PrepError::UnknownRowType { line: 2, tag: 'Q' })
        ));
        assert!(!dir.path().join("expr.bin").exists());
    }

    #[test]
    fn test_empty_input_yields_empty_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "empty.tab", "");

        let summary = convert_file(&input, &DIGEST, &ConvertOptions::default()).unwrap();
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.columns, 0);

        let matrix = MatrixFile::open(&summary.matrix_path).unwrap();
        assert_eq!(matrix.rows(), 0);
    }
}

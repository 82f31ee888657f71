//! TCGA-format feature matrix parsing.
//!
//! A TCGA-format file is tab-delimited text. An optional header line names
//! the samples:
//!
//! ```text
//! <ignored-label> <TAB> <sample-1> <TAB> ... <TAB> <sample-NC>
//! ```
//!
//! Every data line carries a type-tagged row name followed by `NC` cells:
//!
//! ```text
//! <TypeTag>:<row-name> <TAB> <cell-1> <TAB> ... <TAB> <cell-NC>
//! ```
//!
//! where `TypeTag` is `N` (numeric), `B` (boolean) or `C` (categorical),
//! case-insensitive, and cells are numeric literals, category labels, or the
//! case-insensitive missing marker `NA`. The row name is the entire first
//! field, tag prefix included; the tag is read from its first character.
//!
//! # Design
//!
//! [`TcgaParser`] is a streaming line parser: constant memory, 1-based line
//! numbers for error reporting, blank lines and `#` comment lines skipped.
//! Column-count consistency is *not* enforced here — that is the row
//! classifier's job, since the expected count may come from the header line.
//!
//! # Examples
//!
//! ```
//! use pairprep::formats::{RowType, TcgaParser};
//!
//! let data = "id\ts1\ts2\nN:ager\t1.5\tNA\nC:sex\tM\tF\n";
//! let mut parser = TcgaParser::new(data.as_bytes());
//!
//! let samples = parser.read_header().unwrap().unwrap();
//! assert_eq!(samples, vec!["s1", "s2"]);
//!
//! let row = parser.next().unwrap().unwrap();
//! assert_eq!(row.row_type, RowType::Numeric);
//! assert_eq!(row.name, "N:ager");
//! assert_eq!(row.cells, vec!["1.5", "NA"]);
//! ```

use crate::error::{PrepError, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Statistical class of a row, from its leading tag character.
///
/// Boolean and categorical rows share the discrete encoder; the distinction
/// is kept so dispatch stays an exhaustive match over a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowType {
    /// `N`: scalar values encoded as 32-bit floats
    Numeric,
    /// `B`: two-level data encoded as integers
    Boolean,
    /// `C`: labeled data encoded as sorted-rank integers
    Categorical,
}

impl RowType {
    /// Resolves a tag character, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::UnknownRowType`] for anything but `N`, `B`, `C`.
    pub fn from_tag(tag: char, line: usize) -> Result<RowType> {
        match tag.to_ascii_uppercase() {
            'N' => Ok(RowType::Numeric),
            'B' => Ok(RowType::Boolean),
            'C' => Ok(RowType::Categorical),
            _ => Err(PrepError::UnknownRowType { line, tag }),
        }
    }
}

/// Returns true if a cell token is the missing-value marker.
///
/// The marker is "NA" in any case mix.
pub fn is_missing(token: &str) -> bool {
    token.eq_ignore_ascii_case("na")
}

/// One parsed data row: type tag, name, and raw cell tokens.
///
/// Cells are kept as raw strings; interpretation (float parsing, label set
/// discovery) belongs to the encoders.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Statistical class from the leading tag character
    pub row_type: RowType,
    /// The entire first field, tag prefix included (e.g. `N:gene1`)
    pub name: String,
    /// Raw data tokens, one per sample
    pub cells: Vec<String>,
    /// 1-based input line number, for error reporting
    pub line: usize,
}

impl FeatureRow {
    /// Parses one data line (without its trailing newline).
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::UnknownRowType`] if the leading character is not
    /// a recognized tag.
    pub fn from_line(line: &str, line_number: usize) -> Result<FeatureRow> {
        let mut fields = line.split('\t');
        // split always yields at least one field, and the caller never
        // passes an empty line
        let name = fields.next().unwrap_or("");
        let tag = name.chars().next().unwrap_or('\0');
        let row_type = RowType::from_tag(tag, line_number)?;

        Ok(FeatureRow {
            row_type,
            name: name.to_string(),
            cells: fields.map(str::to_string).collect(),
            line: line_number,
        })
    }
}

/// Streaming parser for TCGA-format matrices.
///
/// Yields one [`FeatureRow`] per data line. Automatically skips:
/// - Empty lines
/// - Comment lines (starting with `#`)
///
/// # Examples
///
/// ## Parse from a file
///
/// ```no_run
/// use pairprep::formats::TcgaParser;
///
/// # fn main() -> pairprep::Result<()> {
/// let mut parser = TcgaParser::open("matrix.tab")?;
/// let _samples = parser.read_header()?;
/// for row in parser {
///     let row = row?;
///     println!("{}: {} cells", row.name, row.cells.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct TcgaParser<R: Read> {
    reader: BufReader<R>,
    line_buf: String,
    line_number: usize,
}

impl<R: Read> TcgaParser<R> {
    /// Creates a parser from any reader.
    pub fn new(reader: R) -> Self {
        TcgaParser {
            reader: BufReader::new(reader),
            line_buf: String::with_capacity(1024),
            line_number: 0,
        }
    }

    /// Returns the current line number (1-based).
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Consumes the header line and returns the sample names it carries.
    ///
    /// The header's first field is an ignored label; the remainder name the
    /// `NC` samples and fix the data column count. Returns `Ok(None)` if the
    /// input holds no content lines at all.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub fn read_header(&mut self) -> Result<Option<Vec<String>>> {
        if !self.next_content_line()? {
            return Ok(None);
        }
        let samples = self
            .line_buf
            .trim()
            .split('\t')
            .skip(1)
            .map(str::to_string)
            .collect();
        Ok(Some(samples))
    }

    /// Advances to the next non-blank, non-comment line.
    ///
    /// On success the line sits in `line_buf`; returns false at EOF.
    fn next_content_line(&mut self) -> std::io::Result<bool> {
        loop {
            self.line_buf.clear();

            if self.reader.read_line(&mut self.line_buf)? == 0 {
                return Ok(false); // EOF
            }
            self.line_number += 1;

            let line = self.line_buf.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Ok(true);
        }
    }
}

impl TcgaParser<Box<dyn Read>> {
    /// Opens a matrix file, transparently decompressing `.gz` input.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self::new(reader))
    }
}

impl<R: Read> Iterator for TcgaParser<R> {
    type Item = Result<FeatureRow>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_content_line() {
            Ok(false) => None,
            Ok(true) => Some(FeatureRow::from_line(self.line_buf.trim(), self.line_number)),
            Err(e) => Some(Err(e.into())),
        }
    }
}

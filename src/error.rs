//! Error types for pairprep

use std::fmt;
use std::path::PathBuf;

/// Result type alias for pairprep operations
pub type Result<T> = std::result::Result<T, PrepError>;

/// Error types that can occur while converting or reading a matrix
#[derive(Debug)]
pub enum PrepError {
    /// I/O error (includes short writes to the output sink)
    Io(std::io::Error),

    /// A data row's cell count disagrees with the established column count
    ColumnCountMismatch {
        /// 1-based input line number of the offending row
        line: usize,
        /// Column count fixed by the header or first data row
        expected: usize,
        /// Column count actually found
        actual: usize,
    },

    /// A row's leading type tag is not one of N, B, or C
    UnknownRowType {
        /// 1-based input line number
        line: usize,
        /// The unrecognized tag character
        tag: char,
    },

    /// A token in a numeric row is neither a float literal nor "NA"
    InvalidNumericField {
        /// 1-based input line number
        line: usize,
        /// The offending token
        token: String,
        /// Parser message
        reason: String,
    },

    /// A categorical row has more distinct levels than the format encodes
    TooManyLevels {
        /// Number of distinct non-missing labels found
        levels: usize,
    },

    /// An output file already exists and overwriting was not requested
    OutputExists(PathBuf),

    /// A string-table or row-map offset exceeds the header's 32-bit field
    OffsetOverflow {
        /// The offending byte offset
        offset: u64,
    },

    /// A binary matrix file failed validation on read
    InvalidMatrixFile {
        /// What was wrong with it
        reason: String,
    },

    /// An error raised while encoding a row, tagged with the row's name
    InRow {
        /// Name of the row being encoded (first input field, tag included)
        row: String,
        /// The underlying error
        source: Box<PrepError>,
    },
}

impl PrepError {
    /// Tags this error with the name of the row being encoded.
    pub fn in_row(self, row: &str) -> PrepError {
        PrepError::InRow {
            row: row.to_string(),
            source: Box::new(self),
        }
    }
}

impl fmt::Display for PrepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepError::Io(e) => write!(f, "I/O error: {}", e),
            PrepError::ColumnCountMismatch {
                line,
                expected,
                actual,
            } => write!(
                f,
                "{} data columns on line {}, expected {}",
                actual, line, expected
            ),
            PrepError::UnknownRowType { line, tag } => {
                write!(f, "unexpected row type '{}' at line {}", tag, line)
            }
            PrepError::InvalidNumericField {
                line,
                token,
                reason,
            } => write!(
                f,
                "invalid numeric value '{}' at line {}: {}",
                token, line, reason
            ),
            PrepError::TooManyLevels { levels } => write!(
                f,
                "factor with too many levels ({}). Maybe try the --cat2num option?",
                levels
            ),
            PrepError::OutputExists(path) => {
                write!(f, "{} exists, and I won't overwrite it", path.display())
            }
            PrepError::OffsetOverflow { offset } => write!(
                f,
                "section offset {} exceeds the header's 32-bit field (file too large)",
                offset
            ),
            PrepError::InvalidMatrixFile { reason } => {
                write!(f, "invalid matrix file: {}", reason)
            }
            PrepError::InRow { row, source } => write!(f, "{} in row {}", source, row),
        }
    }
}

impl std::error::Error for PrepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrepError::Io(e) => Some(e),
            PrepError::InRow { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PrepError {
    fn from(error: std::io::Error) -> Self {
        PrepError::Io(error)
    }
}

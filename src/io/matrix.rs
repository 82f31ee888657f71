//! Row record encoders.
//!
//! Every value of the source matrix becomes one 4-byte word in the output,
//! and every row is prefixed by a [`RowPrefix`] word describing it. This
//! module holds the two encoders the row classifier dispatches to:
//!
//! - [`write_numeric_row`] — scalar rows, stored as 32-bit floats
//! - [`write_categorical_row`] — boolean/categorical rows, stored as
//!   integer codes (or delegated back to the numeric encoder when implicit
//!   conversion kicks in)
//!
//! Row record format (all words little-endian):
//!
//! - prefix: [`RowPrefix`] (4 bytes)
//! - payload: NC words; floats for numeric rows, integer category codes for
//!   discrete rows, [`MISSING_WORD`](crate::io::MISSING_WORD) for `NA`
//!
//! Degeneracies (constant rows, single-level factors) are not errors; they
//! are flagged in the prefix so the downstream engine can skip the row.

use crate::error::{PrepError, Result};
use crate::formats::tcga::is_missing;
use crate::io::metadata::MetadataWriter;
use crate::io::prefix::RowPrefix;
use crate::io::{MAX_LEVELS, MISSING_WORD};
use std::collections::BTreeSet;
use std::io::Write;

/// Encodes a numeric row: prefix word plus NC float words.
///
/// Non-missing tokens are parsed as 64-bit floats for analysis and narrowed
/// to 32 bits on output; `NA` becomes the canonical missing pattern. The
/// row is degenerate if it holds fewer than two distinct non-missing values
/// (bit-identical comparison).
///
/// Returns the number of payload words written, for the caller's
/// consistency checks.
///
/// # Errors
///
/// A token that is neither a float literal nor `NA` is a fatal
/// [`PrepError::InvalidNumericField`]. Write failures are fatal.
pub fn write_numeric_row<W: Write, M: Write>(
    sink: &mut W,
    meta: &mut MetadataWriter<M>,
    row: u32,
    cells: &[String],
    line: usize,
) -> Result<usize> {
    let mut values: Vec<Option<f64>> = Vec::with_capacity(cells.len());
    for token in cells {
        if is_missing(token) {
            values.push(None);
        } else {
            values.push(Some(parse_float(token, line)?));
        }
    }

    let present: Vec<f64> = values.iter().copied().flatten().collect();
    let na = cells.len() - present.len();
    let degenerate = present.len() < 2
        || present[1..]
            .iter()
            .all(|v| v.to_bits() == present[0].to_bits());

    meta.na(row, na)?;

    let words: Vec<u32> = values
        .iter()
        .map(|value| match value {
            Some(v) => (*v as f32).to_bits(),
            None => MISSING_WORD,
        })
        .collect();
    write_row_record(sink, RowPrefix::numeric(na as u16, degenerate), &words)
}

/// Encodes a boolean or categorical row.
///
/// The distinct non-missing label set `S` decides the path:
///
/// 1. `S == {"0", "1"}` exactly: genuinely boolean, unlabeled. Payload is
///    the literal 0/1 values; the prefix's category field is 2 and no label
///    map is emitted.
/// 2. `|S| <= 32`: generic categorical. Labels are sorted ascending and
///    each token is coded by its sort rank; the encoding is recorded in the
///    metadata stream.
/// 3. `|S| > 32` with implicit conversion enabled: the row is re-encoded as
///    numeric — unchanged if every non-missing token is a non-negative
///    integer literal ("natural" order), otherwise via sorted-rank codes
///    ("arbitrary" order) — and the conversion is noted in the metadata.
/// 4. `|S| > 32` otherwise: fatal [`PrepError::TooManyLevels`].
///
/// Returns the number of payload words written.
pub fn write_categorical_row<W: Write, M: Write>(
    sink: &mut W,
    meta: &mut MetadataWriter<M>,
    row: u32,
    cells: &[String],
    line: usize,
    allow_implicit_numeric: bool,
) -> Result<usize> {
    let na = cells.iter().filter(|c| is_missing(c)).count();
    meta.na(row, na)?;

    let labels: BTreeSet<&str> = cells
        .iter()
        .map(String::as_str)
        .filter(|c| !is_missing(c))
        .collect();

    // Genuinely boolean categories (without labels)
    if labels.len() == 2 && labels.contains("0") && labels.contains("1") {
        let words: Vec<u32> = cells
            .iter()
            .map(|token| {
                if is_missing(token) {
                    MISSING_WORD
                } else if token == "1" {
                    1
                } else {
                    0
                }
            })
            .collect();
        return write_row_record(sink, RowPrefix::discrete(na as u16, 2), &words);
    }

    if labels.len() <= MAX_LEVELS {
        let ordered: Vec<&str> = labels.iter().copied().collect();
        let words: Vec<u32> = cells
            .iter()
            // tokens absent from the label set are exactly the NA spellings
            .map(|token| match ordered.binary_search(&token.as_str()) {
                Ok(rank) => rank as u32,
                Err(_) => MISSING_WORD,
            })
            .collect();
        let written = write_row_record(
            sink,
            RowPrefix::discrete(na as u16, ordered.len() as u8),
            &words,
        )?;

        // Write out the encoding
        meta.factor(row, ordered.len())?;
        for (rank, label) in ordered.iter().enumerate() {
            meta.category(rank, label)?;
        }
        return Ok(written);
    }

    if !allow_implicit_numeric {
        return Err(PrepError::TooManyLevels {
            levels: labels.len(),
        });
    }

    // Too many categories and implicit conversion has been requested, so
    // delegate to the numeric encoder...
    if cells
        .iter()
        .all(|c| is_missing(c) || is_integer_literal(c))
    {
        // ...with the data unchanged, if the labels already are integers...
        let written = write_numeric_row(sink, meta, row, cells, line)?;
        meta.implicit_conversion(row, "natural")?;
        Ok(written)
    } else {
        // ...or recoded to arbitrary integers (sorted rank) otherwise.
        let ordered: Vec<&str> = labels.iter().copied().collect();
        let recoded: Vec<String> = cells
            .iter()
            .map(|token| match ordered.binary_search(&token.as_str()) {
                Ok(rank) => rank.to_string(),
                Err(_) => "NA".to_string(),
            })
            .collect();
        let written = write_numeric_row(sink, meta, row, &recoded, line)?;
        meta.implicit_conversion(row, "arbitrary")?;
        Ok(written)
    }
}

/// Assembles prefix + payload in one buffer and emits the record with a
/// single write.
fn write_row_record<W: Write>(sink: &mut W, prefix: RowPrefix, words: &[u32]) -> Result<usize> {
    let mut record = Vec::with_capacity((words.len() + 1) * 4);
    record.extend_from_slice(&prefix.pack().to_le_bytes());
    for word in words {
        record.extend_from_slice(&word.to_le_bytes());
    }
    sink.write_all(&record)?;
    Ok(words.len())
}

fn parse_float(token: &str, line: usize) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|e| PrepError::InvalidNumericField {
            line,
            token: token.to_string(),
            reason: e.to_string(),
        })
}

/// A non-negative base-10 integer literal, digits only.
fn is_integer_literal(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

//! The metadata side channel.
//!
//! Alongside the binary matrix the converter writes a line-oriented text
//! stream recording per-row facts that are useful for audit and debugging
//! but not required to reconstruct the payload:
//!
//! - `NA\t<row>\t<count>` — missing-value count
//! - `FE\t<row>\t<levelCount>` — a categorical row's level count
//! - `CA\t<rank>\t<label>` — one label of the preceding `FE` row's encoding
//! - `IC\t<row>\t<message>` — an implicit categorical→numeric conversion
//!
//! `<row>` is the 0-based row index in the binary matrix.

use crate::error::Result;
use std::io::Write;

/// Writer for the metadata stream.
pub struct MetadataWriter<W: Write> {
    writer: W,
}

impl<W: Write> MetadataWriter<W> {
    /// Wraps a sink.
    pub fn new(writer: W) -> Self {
        MetadataWriter { writer }
    }

    /// Writes the leading comment tying the stream to its source matrix.
    pub fn preamble(&mut self, input: &str, digest: &str) -> Result<()> {
        writeln!(self.writer, "# for matrix {} with MD5 {}", input, digest)?;
        Ok(())
    }

    /// Records a row's missing-value count.
    pub fn na(&mut self, row: u32, count: usize) -> Result<()> {
        writeln!(self.writer, "NA\t{}\t{}", row, count)?;
        Ok(())
    }

    /// Records a categorical row's level count. Followed by one
    /// [`category`](Self::category) line per label.
    pub fn factor(&mut self, row: u32, levels: usize) -> Result<()> {
        writeln!(self.writer, "FE\t{}\t{}", row, levels)?;
        Ok(())
    }

    /// Records one (rank, label) pair of a categorical encoding.
    pub fn category(&mut self, rank: usize, label: &str) -> Result<()> {
        writeln!(self.writer, "CA\t{}\t{}", rank, label)?;
        Ok(())
    }

    /// Records an implicit categorical→numeric conversion; `order` is
    /// `"natural"` or `"arbitrary"`.
    pub fn implicit_conversion(&mut self, row: u32, order: &str) -> Result<()> {
        writeln!(
            self.writer,
            "IC\t{}\tcategorical -> numeric ({} order)",
            row, order
        )?;
        Ok(())
    }

    /// Flushes the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Returns a reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

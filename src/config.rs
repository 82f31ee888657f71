//! Conversion options.
//!
//! All knobs recognized by the converter live in [`ConvertOptions`], built
//! once at startup (by the CLI or a library caller) and passed into the
//! pipeline. Nothing reads configuration from ambient state.

/// Options controlling a single matrix conversion.
///
/// # Examples
///
/// ```
/// use pairprep::ConvertOptions;
///
/// let options = ConvertOptions {
///     allow_implicit_numeric: true,
///     ..ConvertOptions::default()
/// };
/// assert!(options.include_string_table);
/// assert!(options.expect_header);
/// ```
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Append the row-name string table and row map to the output.
    ///
    /// Excluding row names precludes feature lookup by name.
    pub include_string_table: bool,

    /// Expect (and consume) a header line naming the samples.
    pub expect_header: bool,

    /// Overwrite previously existing matrix/metadata files, if any.
    pub overwrite: bool,

    /// Implicitly convert categorical rows with more than
    /// [`MAX_LEVELS`](crate::io::MAX_LEVELS) levels to numeric.
    pub allow_implicit_numeric: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            include_string_table: true,
            expect_header: true,
            overwrite: false,
            allow_implicit_numeric: false,
        }
    }
}

//! Input format support.
//!
//! The only textual format pairprep understands is the "TCGA format": a
//! tab-delimited feature matrix in which every data line starts with a
//! type-tagged row name. See [`tcga`] for the parser.

pub mod tcga;

pub use tcga::{FeatureRow, RowType, TcgaParser};

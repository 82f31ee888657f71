//! CLI command modules for the pairprep tool
//!
//! This module organizes pairprep's command-line interface:
//!
//! - `convert`: TCGA text matrix -> binary conversion
//! - `dump`: echo a converted binary matrix back as text
//!
//! Each command parses its own arguments and help text; user errors print
//! to stderr and exit nonzero.

pub mod convert;
pub mod dump;

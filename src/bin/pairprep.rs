//! pairprep CLI - feature matrix preprocessor for the pairwise engine
//!
//! Converts tab-delimited "TCGA format" feature matrices into the packed
//! binary form the pairwise statistics executable consumes, and echoes
//! converted matrices back to text for inspection.
//!
//! # Usage
//!
//! ```bash
//! # Convert a matrix (writes expr.bin and expr.cat)
//! pairprep convert expr.tab
//!
//! # Allow wide categorical rows to fall back to numeric
//! pairprep convert --cat2num expr.tab
//!
//! # Inspect a converted matrix
//! pairprep dump --prefixes expr.bin
//! ```

use std::env;
use std::process;

mod cli;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];
    let command_args = &args[2..];

    match command.as_str() {
        "convert" => cli::convert::run(command_args),
        "dump" => cli::dump::run(command_args),

        "help" | "--help" | "-h" => print_help(),
        "version" | "--version" | "-V" => print_version(),

        _ => {
            eprintln!("Error: Unknown command '{}'", command);
            eprintln!();
            eprintln!("Run 'pairprep --help' to see all available commands.");
            eprintln!("Run 'pairprep <COMMAND> --help' for command-specific help.");
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("pairprep {}", env!("CARGO_PKG_VERSION"));
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("USAGE:");
    println!("    pairprep <COMMAND> [OPTIONS] [INPUT]");
    println!();
    println!("COMMANDS:");
    println!("    convert    Convert a TCGA-format text matrix to binary");
    println!("    dump       Echo a converted binary matrix as text");
    println!();
    println!("    help       Show this help message");
    println!("    version    Show version information");
    println!();
    println!("For command-specific help: pairprep <COMMAND> --help");
}

fn print_help() {
    print_usage();
}

fn print_version() {
    println!("pairprep {}", env!("CARGO_PKG_VERSION"));
    println!("License: {}", env!("CARGO_PKG_LICENSE"));
}

//! Matrix conversion command

use pairprep::{convert_file, ConvertOptions};
use std::fs::File;
use std::path::Path;
use std::process;

/// Convert a TCGA-format text matrix to binary
///
/// Usage: pairprep convert [OPTIONS] INPUT
///
/// OPTIONS:
///     -n, --no-names     Do not include row names in the binary file
///     -H, --no-header    Do not expect a header line in the input file
///     -O, --overwrite    Overwrite previous existing matrix/map files
///     -C, --cat2num      Implicitly convert categorical features with too
///                        many levels to numeric
///     --help             Show help message
///
/// INPUT:
///     Matrix file path (`.gz` input is decompressed transparently)
///
/// Outputs `<stem>.bin` (binary matrix) and `<stem>.cat` (metadata) beside
/// the input.
pub fn run(args: &[String]) {
    let mut input = None;
    let mut options = ConvertOptions::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--no-names" | "-n" => {
                options.include_string_table = false;
                i += 1;
            }
            "--no-header" | "-H" => {
                options.expect_header = false;
                i += 1;
            }
            "--overwrite" | "-O" => {
                options.overwrite = true;
                i += 1;
            }
            "--cat2num" | "-C" => {
                options.allow_implicit_numeric = true;
                i += 1;
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            arg if !arg.starts_with('-') => {
                if input.is_none() {
                    input = Some(arg);
                    i += 1;
                } else {
                    eprintln!("Error: Multiple input files specified");
                    process::exit(1);
                }
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                process::exit(1);
            }
        }
    }

    let input = match input {
        Some(path) => Path::new(path),
        None => {
            eprintln!("Error: No input file specified");
            print_help();
            process::exit(1);
        }
    };

    // Tie the output to its source: the header embeds the input's MD5.
    let digest = match md5_hex(input) {
        Ok(digest) => digest,
        Err(e) => {
            eprintln!("Error reading '{}': {}", input.display(), e);
            process::exit(1);
        }
    };

    match convert_file(input, &digest, &options) {
        Ok(summary) => {
            println!(
                "Wrote {} rows x {} columns to {}",
                summary.rows,
                summary.columns,
                summary.matrix_path.display()
            );
            println!("Metadata in {}", summary.metadata_path.display());
        }
        Err(e) => {
            eprintln!("Failed processing file {}: {}", input.display(), e);
            process::exit(1);
        }
    }
}

/// Computes the input's MD5 digest as 32 lowercase hex characters.
fn md5_hex(path: &Path) -> std::io::Result<[u8; 32]> {
    use md5::{Digest, Md5};
    use std::io::Read;

    const HEX: &[u8; 16] = b"0123456789abcdef";

    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = hasher.finalize();
    let mut hex = [0u8; 32];
    for (i, byte) in digest.iter().enumerate() {
        hex[i * 2] = HEX[(byte >> 4) as usize];
        hex[i * 2 + 1] = HEX[(byte & 0xF) as usize];
    }
    Ok(hex)
}

fn print_help() {
    println!("pairprep convert - convert a TCGA-format matrix to binary");
    println!();
    println!("USAGE:");
    println!("    pairprep convert [OPTIONS] INPUT");
    println!();
    println!("OPTIONS:");
    println!("    -n, --no-names     Do not include row names in the binary file.");
    println!("                       Excluding row names precludes feature lookup by name.");
    println!("    -H, --no-header    Do not expect a header line in the input file");
    println!("    -O, --overwrite    Overwrite previous existing matrix/map files (if any)");
    println!("    -C, --cat2num      Implicitly convert categorical features with >32");
    println!("                       levels to numeric");
    println!("    -h, --help         Show this help message");
    println!();
    println!("OUTPUT:");
    println!("    <stem>.bin  binary matrix (header, row records, optional string");
    println!("                table and row map)");
    println!("    <stem>.cat  metadata side channel (NA counts, category encodings,");
    println!("                conversion notices)");
}

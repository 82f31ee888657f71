//! Binary matrix echo command

use pairprep::MatrixFile;
use std::process;

/// Echo a converted binary matrix back as tab-delimited text
///
/// Usage: pairprep dump [OPTIONS] INPUT.bin
///
/// OPTIONS:
///     --prefixes    Include a per-row prefix summary column
///     --no-names    Suppress row names even when the file carries them
///     --help        Show help message
///
/// Missing values print as `NA`. Discrete rows print their integer codes,
/// numeric rows their float values. The prefix summary has the form
/// `<F|I>:<!|->:<categories>:<missing>` (float/integer payload, degenerate
/// marker, category count, NA count).
pub fn run(args: &[String]) {
    let mut input = None;
    let mut show_prefixes = false;
    let mut show_names = true;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--prefixes" => {
                show_prefixes = true;
                i += 1;
            }
            "--no-names" => {
                show_names = false;
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
        Some(path) => path,
        None => {
            eprintln!("Error: No input file specified");
            print_help();
            process::exit(1);
        }
    };

    let matrix = match MatrixFile::open(input) {
        Ok(matrix) => matrix,
        Err(e) => {
            eprintln!("Error opening '{}': {}", input, e);
            process::exit(1);
        }
    };

    let names = if show_names {
        matrix.names_by_row()
    } else {
        None
    };

    for index in 0..matrix.rows() {
        let row = match matrix.row(index) {
            Some(row) => row,
            None => break,
        };
        let prefix = row.prefix();

        let mut line = String::new();
        if let Some(names) = &names {
            line.push_str(&names[index as usize]);
            line.push('\t');
        }
        if show_prefixes {
            line.push_str(&format!(
                "{}:{}:{}:{}\t",
                if prefix.is_discrete() { 'I' } else { 'F' },
                if prefix.is_degenerate() { '!' } else { '-' },
                prefix.category_count(),
                prefix.na_count()
            ));
        }

        for col in 0..row.columns() {
            if col > 0 {
                line.push('\t');
            }
            if prefix.is_discrete() {
                match row.code(col) {
                    Some(code) => line.push_str(&code.to_string()),
                    None => line.push_str("NA"),
                }
            } else {
                match row.value(col) {
                    Some(value) => line.push_str(&value.to_string()),
                    None => line.push_str("NA"),
                }
            }
        }

        println!("{}", line);
    }
}

fn print_help() {
    println!("pairprep dump - echo a converted binary matrix as text");
    println!();
    println!("USAGE:");
    println!("    pairprep dump [OPTIONS] INPUT.bin");
    println!();
    println!("OPTIONS:");
    println!("    --prefixes    Include a per-row prefix summary column");
    println!("    --no-names    Suppress row names even when the file carries them");
    println!("    -h, --help    Show this help message");
}

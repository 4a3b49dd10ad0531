//! fidi lint entry point.
//!
//! Reads one request document from a file or standard input, checks it
//! the way a server instance would, and writes a dot(1) graph of the call
//! cascade to standard output. Diagnostics go to standard error; any
//! syntax error or validation warning makes the exit status nonzero.

mod graph;

use clap::{ArgAction, Parser};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Check a fidi request document and emit its call graph.
#[derive(Debug, Parser)]
#[command(name = "fidi-lint", version, disable_version_flag = true)]
struct LintArgs {
    /// Input file; standard input when absent or "-".
    input: Option<PathBuf>,

    /// Display the version number.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,
}

fn main() -> ExitCode {
    let args = LintArgs::parse();

    let source = match read_input(args.input.as_deref()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage:");
            eprintln!("    fidi-lint input.txt");
            eprintln!("    cat input.txt | fidi-lint");
            return ExitCode::FAILURE;
        }
    };

    let report = graph::lint(&source);

    if report.parse_errors > 0 {
        eprintln!(
            "Parse failed with {} errors.\n{}",
            report.parse_errors, report.error_messages
        );
        eprintln!("Proceeding despite failures. The graph is likely inaccurate.");
    }
    if report.warnings > 0 {
        eprintln!(
            "Found {} non-syntax errors in the input.\n{}",
            report.warnings, report.warning_messages
        );
    }

    print!("{}", report.dot);

    if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn read_input(path: Option<&Path>) -> Result<String, String> {
    match path {
        None => read_stdin(),
        Some(path) if path == Path::new("-") => read_stdin(),
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Could not read from input file {}: {}", path.display(), e)),
    }
}

fn read_stdin() -> Result<String, String> {
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .map_err(|e| format!("Could not read from standard input: {}", e))?;
    Ok(source)
}

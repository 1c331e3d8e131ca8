//! elision CLI entry point
//!
//! Parses arguments and dispatches to the CLI module; errors are reported
//! as JSON on stdout and the process exits non-zero.

use elision::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

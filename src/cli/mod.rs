//! CLI module
//!
//! Provides command-line access to the registry and construction pipeline:
//! - check: load and register a directory of schema definitions
//! - construct: build one record from a JSON object on stdin

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, configure_logging, construct, construct_record, run, run_command, summarize};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};

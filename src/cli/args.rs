//! CLI argument definitions using clap
//!
//! Commands:
//! - elision check --schemas <dir>
//! - elision construct --schemas <dir> --schema <name>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Schema-driven field elision for structured records
#[derive(Parser, Debug)]
#[command(name = "elision")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log per-record events (TRACE) instead of warnings only
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and register every schema definition in a directory
    Check {
        /// Directory of `*.json` schema definitions
        #[arg(long, default_value = "./schemas")]
        schemas: PathBuf,
    },

    /// Construct one record from a JSON object read on stdin
    Construct {
        /// Directory of `*.json` schema definitions
        #[arg(long, default_value = "./schemas")]
        schemas: PathBuf,

        /// Name of the record type to construct
        #[arg(long)]
        schema: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

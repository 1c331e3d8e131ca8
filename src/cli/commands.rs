//! CLI command implementations

use std::path::Path;

use serde_json::{json, Value};

use super::args::{Cli, Command};
use super::errors::CliResult;
use super::io::{read_request, write_error, write_response};
use crate::observability::{Logger, Severity};
use crate::record::RecordInstance;
use crate::schema::SchemaRegistry;

/// Main entry point for the CLI
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    configure_logging(cli.verbose);

    if let Err(err) = run_command(cli.command) {
        write_error(err.code_str(), err.message())?;
        return Err(err);
    }
    Ok(())
}

/// Log lines go to stderr so stdout carries only the response envelope.
pub fn configure_logging(verbose: bool) {
    Logger::route_all_to_stderr(true);
    Logger::set_min_severity(if verbose { Severity::Trace } else { Severity::Warn });
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Check { schemas } => check(&schemas),
        Command::Construct { schemas, schema } => construct(&schemas, &schema),
    }
}

/// Load every definition and report what was registered
pub fn check(schemas: &Path) -> CliResult<()> {
    let registry = load_registry(schemas)?;
    write_response(summarize(&registry))
}

/// Construct one record of `schema` from stdin
pub fn construct(schemas: &Path, schema: &str) -> CliResult<()> {
    let registry = load_registry(schemas)?;
    let input = read_request()?;
    write_response(construct_record(&registry, schema, input)?)
}

/// Registered schemas as `{"schemas": [{name, version, fields}]}`
pub fn summarize(registry: &SchemaRegistry) -> Value {
    let schemas: Vec<Value> = registry
        .schemas()
        .map(|schema| {
            json!({
                "name": schema.name(),
                "version": schema.version(),
                "fields": schema.field_count(),
            })
        })
        .collect();
    json!({ "schemas": schemas })
}

/// Constructs a record and returns its map form
pub fn construct_record(registry: &SchemaRegistry, schema: &str, input: Value) -> CliResult<Value> {
    let schema = registry.require(schema)?;
    let record = RecordInstance::from_json(&schema, input)?;
    Ok(record.to_json())
}

fn load_registry(dir: &Path) -> CliResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    registry.load_all(dir)?;
    Ok(registry)
}

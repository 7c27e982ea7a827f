//! CLI command implementations
//!
//! Each command computes one JSON payload; [`run_command`] prints it as the
//! single `ok` response. Failures are reported by [`report`].

use std::path::Path;

use serde_json::{json, Value as Json};

use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::schema::{validate, EngineConfig, SchemaLoader};
use crate::value::Value;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_document, write_error, write_invalid, write_response};

/// Engine flags given on the command line; each one only ever switches an
/// option on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigFlags {
    pub cast_from_string: bool,
    pub allow_not_finite: bool,
    pub strict_types: bool,
}

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a command and print its response
pub fn run_command(cmd: Command) -> CliResult<()> {
    let data = execute(cmd)?;
    write_response(data)
}

/// Run a command and return its response payload
pub fn execute(cmd: Command) -> CliResult<Json> {
    match cmd {
        Command::Validate {
            schema,
            data,
            config,
            cast_from_string,
            allow_not_finite,
            strict_types,
            verbose,
        } => {
            set_verbosity(verbose);
            let flags = ConfigFlags {
                cast_from_string,
                allow_not_finite,
                strict_types,
            };
            let config = resolve_config(config.as_deref(), flags)?;
            validate_document(&schema, data.as_deref(), config)
        }
        Command::Check { schema, verbose } => {
            set_verbosity(verbose);
            check(&schema)
        }
    }
}

/// Print a failed run: `invalid` with the error tree for rejected documents,
/// `error` for everything else.
pub fn report(err: &CliError) -> CliResult<()> {
    match err {
        CliError::Invalid(e) => write_invalid(e.errors().to_json()),
        other => write_error(other.code(), &other.message()),
    }
}

/// Validate one document and return its coerced form
pub fn validate_document(
    schema_path: &Path,
    data_path: Option<&Path>,
    config: EngineConfig,
) -> CliResult<Json> {
    let schema = SchemaLoader::new().load_file(schema_path)?;
    let document = read_document(data_path)?;

    let coerced = validate(&schema, &Value::from(&document), config)?;
    Ok(coerced.to_json())
}

/// Compile a schema without validating anything
pub fn check(schema_path: &Path) -> CliResult<Json> {
    let schema = SchemaLoader::new().load_file(schema_path)?;
    Ok(json!({"fields": schema.field_count()}))
}

/// Load the optional config file and switch on the flags given.
pub fn resolve_config(path: Option<&Path>, flags: ConfigFlags) -> CliResult<EngineConfig> {
    let mut config = match path {
        Some(path) => {
            let loaded = EngineConfig::load(path)?;
            log_event_with_fields(
                Event::ConfigLoaded,
                &[("path", path.display().to_string().as_str())],
            );
            loaded
        }
        None => EngineConfig::default(),
    };

    config.cast_from_string |= flags.cast_from_string;
    config.allow_not_finite |= flags.allow_not_finite;
    config.strict_types |= flags.strict_types;

    Ok(config.normalized())
}

fn set_verbosity(verbose: bool) {
    if verbose {
        Logger::set_min_severity(Severity::Trace);
    }
}

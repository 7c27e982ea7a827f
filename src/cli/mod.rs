//! CLI module for okschema
//!
//! Provides command-line interface for:
//! - validate: Validate one document against a schema file
//! - check: Compile a schema file only

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    check, execute, report, resolve_config, run, run_command, validate_document, ConfigFlags,
};
pub use errors::{CliError, CliResult, EXIT_FAILURE, EXIT_INVALID};
pub use io::{read_document, write_error, write_invalid, write_response};

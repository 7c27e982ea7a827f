//! CLI-specific error types

use std::io;

use thiserror::Error;

use crate::schema::{ConfigError, SchemaError, ValidationError};

/// Exit status for documents that fail validation
pub const EXIT_INVALID: i32 = 2;

/// Exit status for every other failure
pub const EXIT_FAILURE: i32 = 1;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error (files, stdin, stdout)
    #[error("{0}")]
    Io(String),

    /// Schema could not be compiled
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Document failed validation
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl CliError {
    pub fn io_error(msg: impl Into<String>) -> Self {
        CliError::Io(msg.into())
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "CLI_CONFIG_ERROR",
            CliError::Io(_) => "CLI_IO_ERROR",
            CliError::Schema(e) => e.code().name(),
            CliError::Invalid(_) => "INVALID_DOCUMENT",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            CliError::Schema(e) => format!("{} at '{}'", e.message(), e.path()),
            other => other.to_string(),
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Invalid(_) => EXIT_INVALID,
            _ => EXIT_FAILURE,
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

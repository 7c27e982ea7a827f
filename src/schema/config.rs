//! Engine configuration
//!
//! One configuration per validation run. It is read-only for the whole run
//! and never changes during recursion.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to load an [`EngineConfig`] from disk
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Invalid config JSON '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Coercion policy for a validation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Parse ints, floats and bools out of strings.
    pub cast_from_string: bool,
    /// Accept infinite and NaN decimals.
    pub allow_not_finite: bool,
    /// Require values that already have the declared type (for validating
    /// generated data). Ignored when `cast_from_string` is set.
    pub strict_types: bool,
}

impl EngineConfig {
    /// Creates a configuration; `cast_from_string` overrides `strict_types`.
    pub fn new(cast_from_string: bool, allow_not_finite: bool, strict_types: bool) -> Self {
        Self {
            cast_from_string,
            allow_not_finite,
            strict_types,
        }
        .normalized()
    }

    /// Configuration for form-style input where scalars arrive as strings.
    pub fn lenient() -> Self {
        Self::new(true, false, false)
    }

    /// Configuration for data that must already carry its declared types.
    pub fn strict() -> Self {
        Self::new(false, false, true)
    }

    /// Applies the `cast_from_string` ⇒ `!strict_types` rule.
    pub fn normalized(mut self) -> Self {
        if self.cast_from_string {
            self.strict_types = false;
        }
        self
    }

    /// Reads a configuration from a JSON file. Missing keys default to `false`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: EngineConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(config.normalized())
    }
}

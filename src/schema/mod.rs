//! Schema validation subsystem
//!
//! Validates JSON-like documents against a recursive schema, returning either
//! a coerced copy of the document or an error tree shaped like the input.
//!
//! # Design Principles
//!
//! - Schemas are checked once, before any data is seen; schema defects are
//!   fatal and never mixed with data errors
//! - Results, not exceptions: sibling fields and list items never
//!   short-circuit each other
//! - Validation never mutates its input
//! - Deterministic validation
//!
//! # Usage
//!
//! ```ignore
//! use okschema::schema::{validate_json, EngineConfig};
//! use serde_json::json;
//!
//! let schema = json!({"name": "string", "age": {"@t": "int", "@gteq": 0}});
//! let data = json!({"name": "Ada", "age": 36});
//! let coerced = validate_json(&schema, &data, EngineConfig::default())?;
//! ```

mod cast;
mod chain;
mod config;
mod errors;
mod loader;
mod types;
mod validator;
mod verify;

pub use cast::cast;
pub use chain::{Validator, ValidatorChain, ValidatorError, ValidatorFn, ValidatorRegistry};
pub use config::{ConfigError, EngineConfig};
pub use errors::{
    Error, ErrorCode, ErrorTree, LeafError, SchemaError, SchemaErrorCode, SchemaResult,
    ValidationCode, ValidationError,
};
pub use loader::SchemaLoader;
pub use types::{
    Comparison, Constraint, DefaultFn, DefaultValue, Enumeration, Options, Pattern, Schema,
    SchemaNode, TypeTag, OPTION_PREFIX,
};
pub use validator::Engine;
pub use verify::verify;

use crate::value::Value;

/// Validates `data` against a checked schema.
///
/// # Errors
///
/// Returns a `ValidationError` carrying the error tree and the schema.
pub fn validate(
    schema: &Schema,
    data: &Value,
    config: EngineConfig,
) -> Result<Value, ValidationError> {
    Engine::new(config).validate(schema, data)
}

/// Compiles a JSON schema with the helper validators and validates JSON data.
///
/// # Errors
///
/// `Error::Schema` for schema defects, `Error::Validation` for data errors.
pub fn validate_json(
    schema: &serde_json::Value,
    data: &serde_json::Value,
    config: EngineConfig,
) -> Result<Value, Error> {
    let schema = SchemaLoader::new().compile(schema)?;
    Ok(validate(&schema, &Value::from(data), config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_json_ok() {
        let out = validate_json(
            &json!({"name": "string", "age": {"@t": "int", "@gteq": 0}}),
            &json!({"name": "Ada", "age": 36, "extra": 1}),
            EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(out.to_json(), json!({"name": "Ada", "age": 36}));
    }

    #[test]
    fn test_validate_json_separates_error_universes() {
        let err = validate_json(&json!({"a": "integer"}), &json!({}), EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert!(err.errors().is_none());

        let err = validate_json(&json!({"a": "int"}), &json!({}), EngineConfig::default())
            .unwrap_err();
        assert_eq!(err.errors().map(ErrorTree::to_json), Some(json!({"a": {"code": 4}})));
    }
}

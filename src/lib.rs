//! okschema - recursive schema validation for JSON-like documents
//!
//! A schema describes the expected shape of a document: typed scalars with
//! options, objects with declared fields, and lists. Validation returns a
//! coerced copy of the document or an error tree shaped like the input.

pub mod cli;
pub mod helpers;
pub mod observability;
pub mod schema;
pub mod value;

pub use schema::{
    validate, validate_json, EngineConfig, Error, ErrorTree, Schema, SchemaError, SchemaLoader,
    SchemaNode, ValidationError,
};
pub use value::Value;

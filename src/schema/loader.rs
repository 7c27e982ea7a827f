//! Schema loader: compiles JSON schema documents into [`Schema`] trees
//!
//! Accepted node shapes:
//! - `"int"`: bare type tag (first comma segment counts), no options
//! - `{"@t": "int", "@gt": 0, ...}`: typed node with options
//! - `{"name": <node>, ...}`: object (`@t` absent or `"dict"`)
//! - `[<node>]` or `[<node>, {<list options>}]`: list
//!
//! Every defect is reported here, before any data is seen. A schema that
//! compiles never raises a schema error during validation.

use std::fs;
use std::path::Path;

use serde_json::Value as Json;

use super::chain::{Validator, ValidatorChain, ValidatorRegistry};
use super::errors::{SchemaError, SchemaResult};
use super::types::{
    make_path, Comparison, Constraint, DefaultValue, Options, Pattern, Schema, SchemaNode,
    TypeTag, OPTION_PREFIX,
};
use crate::observability::{log_event_with_fields, Event};
use crate::value::Value;

/// Compiles JSON schemas, resolving `@val` names against a registry.
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    registry: ValidatorRegistry,
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLoader {
    /// Creates a loader that knows the built-in helper validators.
    pub fn new() -> Self {
        Self {
            registry: ValidatorRegistry::with_helpers(),
        }
    }

    /// Creates a loader over a caller-supplied registry.
    pub fn with_registry(registry: ValidatorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Registry for adding application validators.
    pub fn registry_mut(&mut self) -> &mut ValidatorRegistry {
        &mut self.registry
    }

    /// Compiles a JSON schema document.
    ///
    /// # Errors
    ///
    /// - `UNKNOWN_TYPE` for unrecognized type tags
    /// - `ILLEGAL_COMPARISON` for comparisons on non-comparable types
    /// - `VAL_NOT_CALLABLE` for `@val` entries that are not registered names
    /// - `BAD_REGEXP` for non-string or malformed `@regexp`
    /// - `BAD_SCHEMA` for malformed nodes and option values
    pub fn compile(&self, schema: &Json) -> SchemaResult<Schema> {
        let result = self.node(schema, "$").and_then(Schema::new);

        match &result {
            Ok(compiled) => {
                let fields = compiled.field_count().to_string();
                log_event_with_fields(Event::SchemaCompiled, &[("fields", fields.as_str())]);
            }
            Err(err) => {
                log_event_with_fields(
                    Event::SchemaRejected,
                    &[
                        ("code", err.code().name()),
                        ("path", err.path()),
                        ("message", err.message()),
                    ],
                );
            }
        }

        result
    }

    /// Reads and compiles a schema file.
    pub fn load_file(&self, path: &Path) -> SchemaResult<Schema> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::bad_schema(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        let json: Json = serde_json::from_str(&content).map_err(|e| {
            SchemaError::bad_schema(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        self.compile(&json)
    }

    fn node(&self, json: &Json, path: &str) -> SchemaResult<SchemaNode> {
        match json {
            Json::String(tag) => TypeTag::parse_shorthand(tag)
                .map(SchemaNode::scalar)
                .ok_or_else(|| SchemaError::unknown_type(path, tag)),
            Json::Array(items) => self.list(items, path),
            Json::Object(map) => self.mapping(map, path),
            other => Err(SchemaError::bad_schema(
                path,
                format!("expected a type tag, mapping or list, found {}", json_kind(other)),
            )),
        }
    }

    fn list(&self, items: &[Json], path: &str) -> SchemaResult<SchemaNode> {
        let item_path = format!("{}[]", path);
        match items {
            [item] => Ok(SchemaNode::list(self.node(item, &item_path)?)),
            [item, Json::Object(opts)] => {
                let item = self.node(item, &item_path)?;
                let options = self.options(opts, path)?;
                Ok(SchemaNode::list(item).with_options(options))
            }
            _ => Err(SchemaError::bad_schema(
                path,
                "list schema must be [item] or [item, {options}]",
            )),
        }
    }

    fn mapping(&self, map: &serde_json::Map<String, Json>, path: &str) -> SchemaResult<SchemaNode> {
        let ty = match map.get("@t") {
            None => TypeTag::Dict,
            Some(Json::String(tag)) => {
                TypeTag::parse(tag).ok_or_else(|| SchemaError::unknown_type(path, tag))?
            }
            Some(other) => {
                return Err(SchemaError::bad_schema(
                    path,
                    format!("'@t' must be a string, found {}", json_kind(other)),
                ))
            }
        };

        let options = self.options(map, path)?;

        if ty != TypeTag::Dict {
            // Field keys on a typed scalar node carry no meaning.
            return Ok(SchemaNode::scalar_with(ty, options));
        }

        let mut node = SchemaNode::object().with_options(options);
        for (name, field) in map {
            if name.starts_with(OPTION_PREFIX) {
                continue;
            }
            let field_node = self.node(field, &make_path(path, name))?;
            node = node.field(name.clone(), field_node);
        }
        Ok(node)
    }

    fn options(&self, map: &serde_json::Map<String, Json>, path: &str) -> SchemaResult<Options> {
        let mut options = Options::new();

        for (key, value) in map {
            let Some(name) = key.strip_prefix(OPTION_PREFIX) else {
                continue;
            };

            match name {
                "t" => {}
                "optional" => options.optional = expect_bool(key, value, path)?,
                "null" => options.null = expect_bool(key, value, path)?,
                "blank" => options.blank = expect_bool(key, value, path)?,
                "default" => options.default = Some(DefaultValue::Literal(Value::from(value))),
                "regexp" => {
                    let source = value.as_str().ok_or_else(|| {
                        SchemaError::bad_regexp(path, "'@regexp' must be a string")
                    })?;
                    let pattern = Pattern::new(source)
                        .map_err(|e| SchemaError::bad_regexp(path, e.to_string()))?;
                    options.regexp = Some(pattern);
                }
                "in" => {
                    let allowed = value.as_array().ok_or_else(|| {
                        SchemaError::bad_schema(path, "'@in' must be a list of values")
                    })?;
                    options
                        .constraints
                        .push(Constraint::In(allowed.iter().map(Value::from).collect()));
                }
                "val" => {
                    let chain = self.validator_chain(value, path)?;
                    options.constraints.push(Constraint::Val(chain));
                }
                other => {
                    if let Some(comparison) = Comparison::parse(other) {
                        options
                            .constraints
                            .push(Constraint::Compare(comparison, Value::from(value)));
                    }
                    // Unknown option keys are ignored.
                }
            }
        }

        Ok(options)
    }

    fn validator_chain(&self, value: &Json, path: &str) -> SchemaResult<ValidatorChain> {
        match value {
            Json::Array(entries) => entries
                .iter()
                .map(|entry| self.resolve_validator(entry, path))
                .collect::<SchemaResult<Vec<_>>>()
                .map(ValidatorChain::Sequence),
            single => self.resolve_validator(single, path).map(ValidatorChain::Single),
        }
    }

    fn resolve_validator(&self, entry: &Json, path: &str) -> SchemaResult<Validator> {
        entry
            .as_str()
            .and_then(|name| self.registry.get(name))
            .cloned()
            .ok_or_else(|| SchemaError::val_not_callable(path, entry))
    }
}

fn expect_bool(key: &str, value: &Json, path: &str) -> SchemaResult<bool> {
    value.as_bool().ok_or_else(|| {
        SchemaError::bad_schema(
            path,
            format!("'{}' must be a boolean, found {}", key, json_kind(value)),
        )
    })
}

/// Returns the JSON type name for error messages.
fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

//! Structural validation of documents against a [`Schema`]
//!
//! Validation semantics:
//! - Absent values resolve through `optional`/`default`, never validated
//! - Null is accepted only where `null` is set, and is not cast or verified
//! - Objects validate every declared field; undeclared input keys are dropped
//! - Lists validate every item
//! - Sibling fields and items never short-circuit each other, so the error
//!   tree reports every failing position
//!
//! The engine does not mutate its input and holds no state besides its
//! configuration. Validation is deterministic.

use std::collections::BTreeMap;

use super::cast::{cast, expect_list, expect_map};
use super::config::EngineConfig;
use super::errors::{ErrorTree, LeafError, ValidationCode, ValidationError};
use super::types::{Options, Schema, SchemaNode, TypeTag};
use super::verify::verify;
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::value::{Map, Value};

/// Result of validating one node: `Ok(None)` means the value stays absent
type NodeResult = Result<Option<Value>, ErrorTree>;

/// Validation engine bound to one configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine; the configuration is normalized first.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates a supplied document and returns the coerced value.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` carrying the error tree and the schema.
    pub fn validate(&self, schema: &Schema, data: &Value) -> Result<Value, ValidationError> {
        let coerced = self.validate_supplied(schema, Some(data))?;
        // A supplied document never resolves to absent.
        Ok(coerced.unwrap_or(Value::Null))
    }

    /// Validates a possibly absent document.
    ///
    /// `None` in means "nothing supplied"; `None` out means the document is
    /// optional, has no default, and stays absent.
    pub fn validate_supplied(
        &self,
        schema: &Schema,
        data: Option<&Value>,
    ) -> Result<Option<Value>, ValidationError> {
        match self.node(schema.root(), data) {
            Ok(coerced) => {
                if Logger::enabled(Event::ValidationPassed.severity()) {
                    let fields = schema.field_count().to_string();
                    log_event_with_fields(Event::ValidationPassed, &[("fields", fields.as_str())]);
                }
                Ok(coerced)
            }
            Err(errors) => {
                if Logger::enabled(Event::ValidationRejected.severity()) {
                    let failures = errors.failure_count().to_string();
                    log_event_with_fields(
                        Event::ValidationRejected,
                        &[("failures", failures.as_str())],
                    );
                }
                Err(ValidationError::new(errors, schema.clone()))
            }
        }
    }

    fn node(&self, node: &SchemaNode, value: Option<&Value>) -> NodeResult {
        match node {
            SchemaNode::Scalar { ty, options } => self.scalar(*ty, options.as_ref(), value),
            SchemaNode::Object { fields, options } => self.object(fields, options, value),
            SchemaNode::List { item, options } => self.list(item, options, value),
        }
    }

    fn scalar(&self, ty: TypeTag, options: Option<&Options>, value: Option<&Value>) -> NodeResult {
        let value = match value {
            None => return resolve_absent(options),
            Some(v) => v,
        };

        if value.is_null() {
            return match options {
                Some(opts) if opts.null => Ok(Some(Value::Null)),
                _ => Err(ValidationCode::Null.into()),
            };
        }

        let casted = cast(ty, value, &self.config)?;
        match options {
            Some(opts) => Ok(Some(verify(opts, ty, casted)?)),
            None => Ok(Some(casted)),
        }
    }

    fn object(
        &self,
        fields: &[(String, SchemaNode)],
        options: &Options,
        value: Option<&Value>,
    ) -> NodeResult {
        let value = match value {
            None => return resolve_absent(Some(options)),
            Some(v) => v,
        };

        if value.is_null() {
            return if options.null {
                Ok(Some(Value::Null))
            } else {
                Err(ValidationCode::Null.into())
            };
        }

        let input = expect_map(value)?;

        let mut out = Map::new();
        let mut errors = BTreeMap::new();
        for (name, field) in fields {
            match self.node(field, input.get(name)) {
                Ok(Some(coerced)) => {
                    out.insert(name.clone(), coerced);
                }
                Ok(None) => {}
                Err(tree) => {
                    errors.insert(name.clone(), tree);
                }
            }
        }

        if !errors.is_empty() {
            return Err(ErrorTree::Object(errors));
        }

        let mut assembled = Value::Map(out);
        for chain in options.validators() {
            assembled = chain.run(assembled)?;
        }
        Ok(Some(assembled))
    }

    fn list(&self, item: &SchemaNode, options: &Options, value: Option<&Value>) -> NodeResult {
        let value = match value {
            None => return resolve_absent(Some(options)),
            Some(v) => v,
        };

        // Null is not a sequence.
        let items = expect_list(value)?;

        let mut out = Vec::with_capacity(items.len());
        let mut errors = Vec::with_capacity(items.len());
        let mut failed = false;
        for raw in items {
            match self.node(item, Some(raw)) {
                Ok(coerced) => {
                    out.push(coerced.unwrap_or(Value::Null));
                    errors.push(None);
                }
                Err(tree) => {
                    failed = true;
                    errors.push(Some(tree));
                }
            }
        }

        if failed {
            Err(ErrorTree::List(errors))
        } else {
            Ok(Some(Value::List(out)))
        }
    }
}

/// Applies the optional/default rule to an absent value.
fn resolve_absent(options: Option<&Options>) -> NodeResult {
    match options {
        Some(opts) if opts.optional => Ok(opts.default.as_ref().map(|d| d.produce())),
        _ => Err(LeafError::new(ValidationCode::Missing).into()),
    }
}

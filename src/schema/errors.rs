//! Error types for schema validation
//!
//! Two disjoint universes:
//! - Data errors: caused by the validated document, reported as an
//!   [`ErrorTree`] shaped like the input. Codes live in an open integer
//!   space so applications can add their own.
//! - Schema errors: defects in the schema itself. Always fatal, never part
//!   of an error tree.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

use super::types::Schema;
use crate::value::Value;

/// An error code in the open integer code space.
///
/// Codes `0..1000` carry data errors, `1000..` schema errors. Application
/// codes are free to use anything not claimed by [`ValidationCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ErrorCode(i64);

impl ErrorCode {
    pub const fn new(code: i64) -> Self {
        Self(code)
    }

    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match ValidationCode::from_code(self.0) {
            Some(known) => write!(f, "{}", known.name()),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        Self(code)
    }
}

/// Data error codes reserved by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationCode {
    General,
    /// Value has the wrong type or could not be cast
    BadType,
    /// Value is not in the allowed set
    NotIn,
    /// Null supplied where null is not allowed
    Null,
    /// Required value not supplied
    Missing,
    /// For use by validators
    OutOfBounds,
    /// Regular expression did not match
    Regexp,
    /// Several validators failed for one field
    ManyErrors,
    NotGt,
    NotGteq,
    NotLt,
    NotLteq,
    NotNeq,
    NotEq,
}

impl ValidationCode {
    const ALL: [ValidationCode; 14] = [
        ValidationCode::General,
        ValidationCode::BadType,
        ValidationCode::NotIn,
        ValidationCode::Null,
        ValidationCode::Missing,
        ValidationCode::OutOfBounds,
        ValidationCode::Regexp,
        ValidationCode::ManyErrors,
        ValidationCode::NotGt,
        ValidationCode::NotGteq,
        ValidationCode::NotLt,
        ValidationCode::NotLteq,
        ValidationCode::NotNeq,
        ValidationCode::NotEq,
    ];

    /// Returns the integer code
    pub fn code(&self) -> i64 {
        match self {
            ValidationCode::General => 0,
            ValidationCode::BadType => 1,
            ValidationCode::NotIn => 2,
            ValidationCode::Null => 3,
            ValidationCode::Missing => 4,
            ValidationCode::OutOfBounds => 5,
            ValidationCode::Regexp => 6,
            ValidationCode::ManyErrors => 8,
            ValidationCode::NotGt => 9,
            ValidationCode::NotGteq => 10,
            ValidationCode::NotLt => 11,
            ValidationCode::NotLteq => 12,
            ValidationCode::NotNeq => 13,
            ValidationCode::NotEq => 14,
        }
    }

    /// Returns the symbolic name
    pub fn name(&self) -> &'static str {
        match self {
            ValidationCode::General => "GENERAL",
            ValidationCode::BadType => "BAD_TYPE",
            ValidationCode::NotIn => "NOT_IN",
            ValidationCode::Null => "NULL",
            ValidationCode::Missing => "MISSING",
            ValidationCode::OutOfBounds => "OUT_OF_BOUNDS",
            ValidationCode::Regexp => "REGEXP",
            ValidationCode::ManyErrors => "MANY_ERRORS",
            ValidationCode::NotGt => "NOT_GT",
            ValidationCode::NotGteq => "NOT_GTEQ",
            ValidationCode::NotLt => "NOT_LT",
            ValidationCode::NotLteq => "NOT_LTEQ",
            ValidationCode::NotNeq => "NOT_NEQ",
            ValidationCode::NotEq => "NOT_EQ",
        }
    }

    /// Looks up a reserved code by its integer value
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }
}

impl From<ValidationCode> for ErrorCode {
    fn from(code: ValidationCode) -> Self {
        ErrorCode(code.code())
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafError {
    code: ErrorCode,
    details: Option<Value>,
}

impl LeafError {
    pub fn new(code: impl Into<ErrorCode>) -> Self {
        Self {
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(code: impl Into<ErrorCode>, details: impl Into<Value>) -> Self {
        Self {
            code: code.into(),
            details: Some(details.into()),
        }
    }

    /// Folds several failures of one field into a `MANY_ERRORS` leaf.
    ///
    /// Details keep the order of `errors`.
    pub fn many(errors: Vec<LeafError>) -> Self {
        let details = errors.iter().map(LeafError::to_value).collect::<Vec<_>>();
        Self::with_details(ValidationCode::ManyErrors, details)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Returns the `{code, details?}` representation as a value.
    pub fn to_value(&self) -> Value {
        let mut map = BTreeMap::new();
        map.insert("code".to_string(), Value::from(self.code.value()));
        if let Some(details) = &self.details {
            map.insert("details".to_string(), details.clone());
        }
        Value::Map(map)
    }
}

impl From<ValidationCode> for LeafError {
    fn from(code: ValidationCode) -> Self {
        LeafError::new(code)
    }
}

impl fmt::Display for LeafError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{} ({})", self.code, details),
            None => write!(f, "{}", self.code),
        }
    }
}

impl Serialize for LeafError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.details.is_some() { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("code", &self.code.value())?;
        if let Some(details) = &self.details {
            map.serialize_entry("details", details)?;
        }
        map.end()
    }
}

/// Error value shaped like the validated input.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorTree {
    /// Failure of a single value
    Leaf(LeafError),
    /// Failed fields of an object, keyed by field name
    Object(BTreeMap<String, ErrorTree>),
    /// One entry per input item, `None` where the item passed
    List(Vec<Option<ErrorTree>>),
}

impl ErrorTree {
    pub fn as_leaf(&self) -> Option<&LeafError> {
        match self {
            ErrorTree::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Code of a leaf error
    pub fn code(&self) -> Option<ErrorCode> {
        self.as_leaf().map(LeafError::code)
    }

    /// Error of an object field
    pub fn field(&self, name: &str) -> Option<&ErrorTree> {
        match self {
            ErrorTree::Object(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Error of a list item; `None` for passing items and non-list trees
    pub fn item(&self, index: usize) -> Option<&ErrorTree> {
        match self {
            ErrorTree::List(items) => items.get(index).and_then(Option::as_ref),
            _ => None,
        }
    }

    /// Number of failing fields or items at this level
    pub fn failure_count(&self) -> usize {
        match self {
            ErrorTree::Leaf(_) => 1,
            ErrorTree::Object(fields) => fields.len(),
            ErrorTree::List(items) => items.iter().filter(|i| i.is_some()).count(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl From<LeafError> for ErrorTree {
    fn from(leaf: LeafError) -> Self {
        ErrorTree::Leaf(leaf)
    }
}

impl From<ValidationCode> for ErrorTree {
    fn from(code: ValidationCode) -> Self {
        ErrorTree::Leaf(LeafError::new(code))
    }
}

impl Serialize for ErrorTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ErrorTree::Leaf(leaf) => leaf.serialize(serializer),
            ErrorTree::Object(fields) => serializer.collect_map(fields),
            ErrorTree::List(items) => serializer.collect_seq(items),
        }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// The document did not satisfy the schema.
#[derive(Debug, Clone)]
pub struct ValidationError {
    errors: ErrorTree,
    schema: Schema,
}

impl ValidationError {
    pub fn new(errors: ErrorTree, schema: Schema) -> Self {
        Self { errors, schema }
    }

    /// Returns the error tree
    pub fn errors(&self) -> &ErrorTree {
        &self.errors
    }

    /// Returns the schema the document was validated against
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn into_errors(self) -> ErrorTree {
        self.errors
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "document validation failed: {}", self.errors)
    }
}

impl std::error::Error for ValidationError {}

/// Schema defect codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Type tag is not one of the known types
    UnknownType,
    /// Comparison option on a type that cannot be compared
    IllegalComparison,
    /// `@val` entry does not resolve to a validator
    ValNotCallable,
    /// `@regexp` is not a valid pattern
    BadRegexp,
    /// Schema node or option value has the wrong shape
    BadSchema,
}

impl SchemaErrorCode {
    /// Returns the integer code
    pub fn code(&self) -> i64 {
        match self {
            SchemaErrorCode::UnknownType => 1000,
            SchemaErrorCode::IllegalComparison => 1001,
            SchemaErrorCode::ValNotCallable => 1002,
            SchemaErrorCode::BadRegexp => 1003,
            SchemaErrorCode::BadSchema => 1004,
        }
    }

    /// Returns the symbolic name
    pub fn name(&self) -> &'static str {
        match self {
            SchemaErrorCode::UnknownType => "UNKNOWN_TYPE",
            SchemaErrorCode::IllegalComparison => "ILLEGAL_COMPARISON",
            SchemaErrorCode::ValNotCallable => "VAL_NOT_CALLABLE",
            SchemaErrorCode::BadRegexp => "BAD_REGEXP",
            SchemaErrorCode::BadSchema => "BAD_SCHEMA",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A defect in the schema itself
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    code: SchemaErrorCode,
    /// Location of the offending node, e.g. `user.tags[]`
    path: String,
    message: String,
}

impl SchemaError {
    pub fn new(code: SchemaErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unknown_type(path: impl Into<String>, tag: &str) -> Self {
        Self::new(
            SchemaErrorCode::UnknownType,
            path,
            format!("unknown type tag '{}'", tag),
        )
    }

    pub fn illegal_comparison(path: impl Into<String>, option: &str, type_name: &str) -> Self {
        Self::new(
            SchemaErrorCode::IllegalComparison,
            path,
            format!("option '{}' cannot be applied to type '{}'", option, type_name),
        )
    }

    pub fn val_not_callable(path: impl Into<String>, entry: impl fmt::Display) -> Self {
        Self::new(
            SchemaErrorCode::ValNotCallable,
            path,
            format!("validator entry {} is not a registered validator", entry),
        )
    }

    pub fn bad_regexp(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(SchemaErrorCode::BadRegexp, path, reason)
    }

    pub fn bad_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(SchemaErrorCode::BadSchema, path, reason)
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Schema errors always abort validation
    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FATAL] {} at '{}': {}", self.code, self.path, self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Any failure of a validation call.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl Error {
    /// Returns the error tree for data errors
    pub fn errors(&self) -> Option<&ErrorTree> {
        match self {
            Error::Validation(e) => Some(e.errors()),
            Error::Schema(_) => None,
        }
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

//! Validator chains
//!
//! A validator is a function `(&Value) -> Result<Value, ValidatorError>`.
//! Its output replaces the value. Validators attach to a schema node either
//! singly or as an ordered sequence:
//!
//! - Single: run once, any failure is the field's error.
//! - Sequence: run left to right, threading outputs. A recoverable failure
//!   is remembered and the next validator receives the same input; a fatal
//!   failure stops the chain. One failure is reported as is, several are
//!   folded into `MANY_ERRORS`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::errors::{ErrorCode, LeafError};
use crate::value::Value;

/// Failure raised by a validator
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatorError {
    /// Stops the chain
    Fatal(LeafError),
    /// Recorded; the chain continues with the same input
    Recoverable(LeafError),
}

impl ValidatorError {
    pub fn fatal(code: impl Into<ErrorCode>) -> Self {
        ValidatorError::Fatal(LeafError::new(code))
    }

    pub fn fatal_with(code: impl Into<ErrorCode>, details: impl Into<Value>) -> Self {
        ValidatorError::Fatal(LeafError::with_details(code, details))
    }

    pub fn recoverable(code: impl Into<ErrorCode>) -> Self {
        ValidatorError::Recoverable(LeafError::new(code))
    }

    pub fn recoverable_with(code: impl Into<ErrorCode>, details: impl Into<Value>) -> Self {
        ValidatorError::Recoverable(LeafError::with_details(code, details))
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, ValidatorError::Recoverable(_))
    }

    pub fn leaf(&self) -> &LeafError {
        match self {
            ValidatorError::Fatal(leaf) | ValidatorError::Recoverable(leaf) => leaf,
        }
    }

    pub fn into_leaf(self) -> LeafError {
        match self {
            ValidatorError::Fatal(leaf) | ValidatorError::Recoverable(leaf) => leaf,
        }
    }
}

impl From<LeafError> for ValidatorError {
    fn from(leaf: LeafError) -> Self {
        ValidatorError::Fatal(leaf)
    }
}

impl fmt::Display for ValidatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidatorError::Fatal(leaf) => write!(f, "{}", leaf),
            ValidatorError::Recoverable(leaf) => write!(f, "{} (recoverable)", leaf),
        }
    }
}

impl std::error::Error for ValidatorError {}

/// Signature of a validator function
pub type ValidatorFn = dyn Fn(&Value) -> Result<Value, ValidatorError> + Send + Sync;

/// A named validator function
#[derive(Clone)]
pub struct Validator {
    name: String,
    func: Arc<ValidatorFn>,
}

impl Validator {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ValidatorError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, value: &Value) -> Result<Value, ValidatorError> {
        (self.func)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator").field("name", &self.name).finish()
    }
}

/// Validators attached to one schema node
#[derive(Debug, Clone)]
pub enum ValidatorChain {
    Single(Validator),
    Sequence(Vec<Validator>),
}

impl ValidatorChain {
    pub fn len(&self) -> usize {
        match self {
            ValidatorChain::Single(_) => 1,
            ValidatorChain::Sequence(validators) => validators.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs the chain over `value`.
    ///
    /// # Errors
    ///
    /// Returns the single recorded failure, or a `MANY_ERRORS` leaf listing
    /// every failure in validator order.
    pub fn run(&self, value: Value) -> Result<Value, LeafError> {
        match self {
            ValidatorChain::Single(validator) => {
                validator.call(&value).map_err(ValidatorError::into_leaf)
            }
            ValidatorChain::Sequence(validators) => run_sequence(validators, value),
        }
    }
}

fn run_sequence(validators: &[Validator], value: Value) -> Result<Value, LeafError> {
    let mut failures = Vec::new();
    let mut current = value;

    for validator in validators {
        match validator.call(&current) {
            Ok(next) => current = next,
            Err(ValidatorError::Recoverable(leaf)) => failures.push(leaf),
            Err(ValidatorError::Fatal(leaf)) => {
                failures.push(leaf);
                break;
            }
        }
    }

    if failures.len() > 1 {
        return Err(LeafError::many(failures));
    }
    match failures.pop() {
        Some(only) => Err(only),
        None => Ok(current),
    }
}

/// Named validators that JSON schemas refer to from `@val`
#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Validator>,
}

impl ValidatorRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a validator under its own name, replacing any previous one.
    pub fn register(&mut self, validator: Validator) -> &mut Self {
        self.validators
            .insert(validator.name().to_string(), validator);
        self
    }

    /// Registers a function under `name`.
    pub fn register_fn<F>(&mut self, name: &str, func: F) -> &mut Self
    where
        F: Fn(&Value) -> Result<Value, ValidatorError> + Send + Sync + 'static,
    {
        self.register(Validator::new(name, func))
    }

    pub fn get(&self, name: &str) -> Option<&Validator> {
        self.validators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::ValidationCode;
    use serde_json::json;

    fn double() -> Validator {
        Validator::new("double", |v| match v {
            Value::Int(i) => Ok(Value::Int(i * 2)),
            _ => Err(ValidatorError::fatal(ValidationCode::BadType)),
        })
    }

    fn increment() -> Validator {
        Validator::new("increment", |v| match v {
            Value::Int(i) => Ok(Value::Int(i + 1)),
            _ => Err(ValidatorError::fatal(ValidationCode::BadType)),
        })
    }

    fn soft(details: i64) -> Validator {
        Validator::new("soft", move |_| {
            Err(ValidatorError::recoverable_with(ErrorCode::new(50), details))
        })
    }

    fn hard() -> Validator {
        Validator::new("hard", |_| Err(ValidatorError::fatal(ErrorCode::new(50))))
    }

    #[test]
    fn test_sequence_threads_outputs() {
        let chain = ValidatorChain::Sequence(vec![double(), increment()]);
        assert_eq!(chain.run(Value::Int(12)), Ok(Value::Int(25)));
    }

    #[test]
    fn test_single_failure_is_raised_unwrapped() {
        let chain = ValidatorChain::Sequence(vec![soft(1), increment()]);
        let err = chain.run(Value::Int(1)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::new(50));
        assert_eq!(err.details(), Some(&Value::Int(1)));
    }

    #[test]
    fn test_recoverable_failure_passes_same_input_on() {
        let seen = Validator::new("seen", |v| {
            Err(ValidatorError::recoverable_with(ErrorCode::new(51), v.clone()))
        });
        let chain = ValidatorChain::Sequence(vec![soft(1), seen]);
        let err = chain.run(Value::Int(7)).unwrap_err();
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"code": 8, "details": [
                {"code": 50, "details": 1},
                {"code": 51, "details": 7}
            ]})
        );
    }

    #[test]
    fn test_fatal_failure_stops_chain_and_joins_many_errors() {
        let chain = ValidatorChain::Sequence(vec![soft(1), soft(5), hard(), soft(9)]);
        let err = chain.run(Value::Int(12)).unwrap_err();
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"code": 8, "details": [
                {"code": 50, "details": 1},
                {"code": 50, "details": 5},
                {"code": 50}
            ]})
        );
    }

    #[test]
    fn test_single_recoverable_reported_as_leaf() {
        let chain = ValidatorChain::Single(soft(3));
        let err = chain.run(Value::Null).unwrap_err();
        assert_eq!(err, LeafError::with_details(ErrorCode::new(50), 3));
    }

    #[test]
    fn test_empty_sequence_is_identity() {
        let chain = ValidatorChain::Sequence(Vec::new());
        assert!(chain.is_empty());
        assert_eq!(chain.run(Value::from("x")), Ok(Value::from("x")));
    }

    #[test]
    fn test_registry_names_sorted() {
        let mut registry = ValidatorRegistry::new();
        registry.register(increment()).register(double());
        assert_eq!(registry.names(), vec!["double", "increment"]);
        assert!(registry.contains("double"));
        assert!(registry.get("missing").is_none());
    }
}

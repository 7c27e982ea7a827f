//! Option verification for scalar values
//!
//! Order of checks, first failure wins:
//! 1. `regexp`
//! 2. blank-string rule (string types only)
//! 3. `in`, comparisons and `val`, in declaration order

use super::errors::{LeafError, ValidationCode};
use super::types::{Constraint, Options, TypeTag};
use crate::value::Value;

/// Checks a casted value against the node's options.
///
/// Validator chains may replace the value; later constraints see the
/// replacement.
pub fn verify(options: &Options, ty: TypeTag, value: Value) -> Result<Value, LeafError> {
    if let Some(pattern) = &options.regexp {
        let matched = value.as_str().is_some_and(|s| pattern.is_match(s));
        if !matched {
            return Err(LeafError::new(ValidationCode::Regexp));
        }
    }

    // A string's length must be > 0 unless blanks are allowed.
    if ty.is_string() && !options.blank && value.as_str().is_some_and(str::is_empty) {
        return Err(LeafError::with_details(ValidationCode::NotGt, 0));
    }

    let mut value = value;
    for constraint in &options.constraints {
        match constraint {
            Constraint::In(allowed) => {
                if !allowed.iter().any(|candidate| candidate.loose_eq(&value)) {
                    return Err(LeafError::new(ValidationCode::NotIn));
                }
            }
            Constraint::Compare(comparison, bound) => {
                let subject = match (&value, ty) {
                    (Value::String(s), TypeTag::String) => Value::from(s.chars().count()),
                    _ => value.clone(),
                };
                if !comparison.holds(&subject, bound) {
                    return Err(LeafError::with_details(
                        comparison.failure_code(),
                        bound.clone(),
                    ));
                }
            }
            Constraint::Val(chain) => {
                value = chain.run(value)?;
            }
        }
    }

    Ok(value)
}

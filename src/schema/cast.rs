//! Type casting
//!
//! Coerces a raw value to the declared type of a node or fails with
//! `BAD_TYPE`. Which coercions are allowed depends on [`EngineConfig`].

use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;

use super::config::EngineConfig;
use super::errors::{LeafError, ValidationCode};
use super::types::TypeTag;
use crate::value::{DecimalValue, Map, Value};

fn bad_type() -> LeafError {
    LeafError::new(ValidationCode::BadType)
}

/// Requires a mapping; no coercion.
pub fn expect_map(value: &Value) -> Result<&Map, LeafError> {
    value.as_map().ok_or_else(bad_type)
}

/// Requires a sequence; no coercion.
pub fn expect_list(value: &Value) -> Result<&[Value], LeafError> {
    value.as_list().map(Vec::as_slice).ok_or_else(bad_type)
}

/// Casts `value` to `ty`.
///
/// # Errors
///
/// `BAD_TYPE` when the value has the wrong type and no allowed coercion
/// applies; `BAD_TYPE` with details `"infinite decimal"` for non-finite
/// decimals unless `allow_not_finite` is set.
pub fn cast(ty: TypeTag, value: &Value, config: &EngineConfig) -> Result<Value, LeafError> {
    match ty {
        TypeTag::Dict => expect_map(value).map(|map| Value::Map(map.clone())),
        TypeTag::String => match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            _ => Err(bad_type()),
        },
        TypeTag::Decimal => cast_decimal(value, config),
        TypeTag::Float => cast_float(value, config),
        TypeTag::Bool => cast_bool(value, config),
        TypeTag::Int => cast_int(value, config),
    }
}

fn cast_decimal(value: &Value, config: &EngineConfig) -> Result<Value, LeafError> {
    let decimal = match value {
        Value::Decimal(d) => d.clone(),
        _ if config.strict_types => return Err(bad_type()),
        Value::Int(i) => DecimalValue::Finite(BigDecimal::new(BigInt::from(*i), 0)),
        Value::Float(f) => DecimalValue::from_f64(*f),
        // Strings are always accepted for decimals.
        Value::String(s) => s.parse::<DecimalValue>().map_err(|_| bad_type())?,
        _ => return Err(bad_type()),
    };

    if !config.allow_not_finite && !decimal.is_finite() {
        return Err(LeafError::with_details(
            ValidationCode::BadType,
            "infinite decimal",
        ));
    }

    Ok(Value::Decimal(decimal))
}

fn cast_float(value: &Value, config: &EngineConfig) -> Result<Value, LeafError> {
    match value {
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Int(i) if !config.strict_types => Ok(Value::Float(*i as f64)),
        Value::String(s) if config.cast_from_string => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| bad_type()),
        _ => Err(bad_type()),
    }
}

fn cast_bool(value: &Value, config: &EngineConfig) -> Result<Value, LeafError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::String(s) if config.cast_from_string && !config.strict_types => {
            if s.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if s.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(bad_type())
            }
        }
        _ => Err(bad_type()),
    }
}

fn cast_int(value: &Value, config: &EngineConfig) -> Result<Value, LeafError> {
    match value {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::String(s) if config.cast_from_string => s
            .trim()
            .parse::<i128>()
            .map(Value::Int)
            .map_err(|_| bad_type()),
        _ => Err(bad_type()),
    }
}

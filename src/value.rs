//! JSON-like value model
//!
//! Input documents arrive as `serde_json::Value` and are converted into
//! [`Value`]. Coerced output uses the same type, which can additionally carry
//! decimals and the typed results of value validators (dates, datetimes,
//! uuids).
//!
//! Mappings are ordered by key so serialized output is deterministic.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, ParseBigDecimalError, ToPrimitive};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Output format for date values
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Output format for datetime values
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// String-keyed mapping
pub type Map = BTreeMap<String, Value>;

/// A JSON-like value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i128),
    Float(f64),
    Decimal(DecimalValue),
    String(String),
    List(Vec<Value>),
    Map(Map),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a key in a mapping value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Orders two values numerically.
    ///
    /// Integers, floats and decimals compare with each other; any other
    /// pairing, or a NaN on either side, is unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self.numeric()?, other.numeric()?) {
            (Numeric::Exact(a), Numeric::Exact(b)) => Some(a.cmp(&b)),
            (a, b) => a.to_f64().partial_cmp(&b.to_f64()),
        }
    }

    /// Equality that treats numbers of different representations as equal
    /// when their values match (`1 == 1.0`).
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self.numeric(), other.numeric()) {
            (Some(_), Some(_)) => self.compare(other) == Some(Ordering::Equal),
            _ => self == other,
        }
    }

    fn numeric(&self) -> Option<Numeric> {
        match self {
            Value::Int(i) => Some(Numeric::Exact(BigDecimal::new(BigInt::from(*i), 0))),
            Value::Float(f) => Some(Numeric::Approx(*f)),
            Value::Decimal(DecimalValue::Finite(d)) => Some(Numeric::Exact(d.clone())),
            Value::Decimal(d) => Some(Numeric::Approx(d.to_f64())),
            _ => None,
        }
    }

    /// Converts into a `serde_json::Value`.
    ///
    /// Decimals, dates, datetimes and uuids become strings; non-finite
    /// floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(self)
    }
}

enum Numeric {
    Exact(BigDecimal),
    Approx(f64),
}

impl Numeric {
    fn to_f64(&self) -> f64 {
        match self {
            Numeric::Exact(d) => d.to_f64().unwrap_or(f64::NAN),
            Numeric::Approx(f) => *f,
        }
    }
}

/// An arbitrary-precision decimal that may also be non-finite.
///
/// `BigDecimal` has no infinities or NaN, so those are carried explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum DecimalValue {
    Finite(BigDecimal),
    Infinite { negative: bool },
    NaN,
}

impl DecimalValue {
    pub fn is_finite(&self) -> bool {
        matches!(self, DecimalValue::Finite(_))
    }

    /// Converts a float through its shortest round-trip representation, so
    /// `0.1` becomes `0.1` rather than the binary expansion.
    pub fn from_f64(f: f64) -> Self {
        if f.is_nan() {
            DecimalValue::NaN
        } else if f.is_infinite() {
            DecimalValue::Infinite {
                negative: f.is_sign_negative(),
            }
        } else {
            // Rust prints finite floats as plain decimal digits.
            BigDecimal::from_str(&f.to_string())
                .map(DecimalValue::Finite)
                .unwrap_or(DecimalValue::NaN)
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            DecimalValue::Finite(d) => d.to_f64().unwrap_or(f64::NAN),
            DecimalValue::Infinite { negative: true } => f64::NEG_INFINITY,
            DecimalValue::Infinite { negative: false } => f64::INFINITY,
            DecimalValue::NaN => f64::NAN,
        }
    }
}

impl From<BigDecimal> for DecimalValue {
    fn from(d: BigDecimal) -> Self {
        DecimalValue::Finite(d)
    }
}

impl FromStr for DecimalValue {
    type Err = ParseBigDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        match unsigned.to_ascii_lowercase().as_str() {
            "inf" | "infinity" => return Ok(DecimalValue::Infinite { negative }),
            "nan" | "snan" => return Ok(DecimalValue::NaN),
            _ => {}
        }

        BigDecimal::from_str(trimmed).map(DecimalValue::Finite)
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecimalValue::Finite(d) => write!(f, "{}", d),
            DecimalValue::Infinite { negative: true } => write!(f, "-Infinity"),
            DecimalValue::Infinite { negative: false } => write!(f, "Infinity"),
            DecimalValue::NaN => write!(f, "NaN"),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                match n.as_i64().map(i128::from).or_else(|| n.as_u64().map(i128::from)) {
                    Some(i) => Value::Int(i),
                    None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from(json.clone())
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => int_to_json(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Decimal(d) => serde_json::Value::String(d.to_string()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
            Value::Date(d) => serde_json::Value::String(d.format(DATE_FORMAT).to_string()),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.format(DATETIME_FORMAT).to_string())
            }
            Value::Uuid(u) => serde_json::Value::String(u.hyphenated().to_string()),
        }
    }
}

/// JSON numbers without `arbitrary_precision` stop at the 64-bit ranges.
fn int_to_json(i: i128) -> serde_json::Value {
    if let Ok(small) = i64::try_from(i) {
        serde_json::Value::from(small)
    } else if let Ok(unsigned) = u64::try_from(i) {
        serde_json::Value::from(unsigned)
    } else {
        serde_json::Number::from_f64(i as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i128(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Decimal(d) => serializer.collect_str(d),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => serializer.collect_seq(items),
            Value::Map(map) => serializer.collect_map(map),
            Value::Date(d) => serializer.collect_str(&d.format(DATE_FORMAT)),
            Value::DateTime(dt) => serializer.collect_str(&dt.format(DATETIME_FORMAT)),
            Value::Uuid(u) => serializer.collect_str(&u.hyphenated()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i128> for Value {
    fn from(i: i128) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i128::from(i))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Int(i128::from(n))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i128::from(i))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        i128::try_from(n).map_or(Value::Float(n as f64), Value::Int)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Value::Decimal(DecimalValue::Finite(d))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

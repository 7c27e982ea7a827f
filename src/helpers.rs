//! Ready-made validators, patterns and application error codes
//!
//! The validators parse string input into typed values (dates, datetimes,
//! uuids) and replace the field's value with the result. They fail with
//! `BAD_TYPE` and a short description.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::schema::{ErrorCode, ValidationCode, Validator, ValidatorError, ValidatorRegistry};
use crate::value::{Value, DATE_FORMAT};

/// Canonical hyphenated uuid, for use with `@regexp`
pub const FMT_UUID: &str =
    "[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}";

/// Short language code, for use with `@regexp`
pub const FMT_LANG: &str = "[A-Za-z]{1,3}";

/// Accepted naive datetime layout; fractional seconds are optional
const DATETIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn bad_type(details: &str) -> ValidatorError {
    ValidatorError::fatal_with(ValidationCode::BadType, details)
}

/// Parses a `YYYY-MM-DD` string into a date.
pub fn val_date(value: &Value) -> Result<Value, ValidatorError> {
    value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
        .map(Value::Date)
        .ok_or_else(|| bad_type("bad date format"))
}

/// Parses `YYYY-MM-DDTHH:MM:SS[.ffffff]` into a datetime.
///
/// A trailing `Z` or UTC offset is accepted; the result is normalized to
/// UTC and stored without zone.
pub fn val_datetime(value: &Value) -> Result<Value, ValidatorError> {
    let s = value.as_str().ok_or_else(|| bad_type("bad datetime format"))?;

    if let Ok(zoned) = DateTime::parse_from_rfc3339(s) {
        return Ok(Value::DateTime(zoned.naive_utc()));
    }

    NaiveDateTime::parse_from_str(s, DATETIME_INPUT_FORMAT)
        .map(Value::DateTime)
        .map_err(|_| bad_type("bad datetime format"))
}

/// Parses a hyphenated uuid string.
pub fn val_uuid(value: &Value) -> Result<Value, ValidatorError> {
    value
        .as_str()
        .filter(|s| s.len() == 36)
        .and_then(|s| Uuid::parse_str(s).ok())
        .map(Value::Uuid)
        .ok_or_else(|| bad_type("bad uuid format"))
}

/// Requires a finite number; passes the value through unchanged.
pub fn val_isfinite(value: &Value) -> Result<Value, ValidatorError> {
    let finite = match value {
        Value::Int(_) => true,
        Value::Float(f) => f.is_finite(),
        Value::Decimal(d) => d.is_finite(),
        _ => return Err(ValidatorError::fatal(ValidationCode::BadType)),
    };

    if finite {
        Ok(value.clone())
    } else {
        Err(bad_type("not finite"))
    }
}

impl ValidatorRegistry {
    /// Registry preloaded with `date`, `datetime`, `uuid` and `isfinite`
    pub fn with_helpers() -> Self {
        let mut registry = Self::new();
        registry
            .register(Validator::new("date", val_date))
            .register(Validator::new("datetime", val_datetime))
            .register(Validator::new("uuid", val_uuid))
            .register(Validator::new("isfinite", val_isfinite));
        registry
    }
}

/// Error codes for application-level validators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppValidationCode {
    /// Value rejected by a business rule, e.g. a weak password
    BadValue,
    /// Duplicate of an existing record
    Duplicate,
    /// Referenced record does not exist
    NotFound,
    /// Too few entries
    NotEnough,
}

impl AppValidationCode {
    pub fn code(&self) -> i64 {
        match self {
            AppValidationCode::BadValue => 50,
            AppValidationCode::Duplicate => 51,
            AppValidationCode::NotFound => 52,
            AppValidationCode::NotEnough => 53,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AppValidationCode::BadValue => "BAD_VALUE",
            AppValidationCode::Duplicate => "DUPLICATE",
            AppValidationCode::NotFound => "NOT_FOUND",
            AppValidationCode::NotEnough => "NOT_ENOUGH",
        }
    }
}

impl From<AppValidationCode> for ErrorCode {
    fn from(code: AppValidationCode) -> Self {
        ErrorCode::new(code.code())
    }
}

impl fmt::Display for AppValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

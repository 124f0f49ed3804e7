//! Normalization of untyped JSON payloads into typed records.
//!
//! Course validation fails hard on malformed input. Settings validation
//! falls back to defaults for most fields and only rejects an inverted
//! day range.

pub mod course;
pub mod settings;

pub use course::{check_time_range, validate_course_patch, validate_new_course};
pub use settings::validate_settings;

use chrono::NaiveTime;
use serde_json::{Map, Value};
use thiserror::Error;

pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    InvalidRange(String),

    #[error("{0}")]
    InvalidWeeks(String),

    #[error("{0}")]
    InvalidPayload(String),
}

pub(crate) fn as_object<'a>(
    payload: &'a Value,
    what: &str,
) -> Result<&'a Map<String, Value>, ValidationError> {
    payload
        .as_object()
        .ok_or_else(|| ValidationError::InvalidPayload(format!("{} must be a JSON object", what)))
}

/// Looks up a key, treating JSON `null` the same as an absent key.
pub(crate) fn field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

/// Renders a scalar as text. Strings are taken verbatim, anything else
/// uses its JSON representation.
pub(crate) fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn trimmed_text(value: &Value) -> String {
    as_text(value).trim().to_string()
}

/// Coerces integers, floats (truncated) and integer strings.
pub(crate) fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub(crate) fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).ok()
}

/// True when both values parse as `HH:MM` and `start` is strictly earlier.
pub fn valid_time_range(start: &str, end: &str) -> bool {
    match (parse_time(start), parse_time(end)) {
        (Some(start), Some(end)) => start < end,
        _ => false,
    }
}

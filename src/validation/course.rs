use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::{ValidationError, as_object, coerce_int, field, parse_time, trimmed_text, valid_time_range};
use crate::models::course::DEFAULT_COLOR;
use crate::models::{CoursePatch, NewCourse};

const REQUIRED_FIELDS: [&str; 5] = ["title", "weekday", "start_time", "end_time", "weeks"];

/// Validates a full course payload as sent to `POST /api/courses` or in an import.
pub fn validate_new_course(payload: &Value) -> Result<NewCourse, ValidationError> {
    let map = as_object(payload, "course")?;
    for key in REQUIRED_FIELDS {
        if field(map, key).is_none() {
            return Err(ValidationError::MissingField(key));
        }
    }

    let weekday = parse_weekday(required(map, "weekday")?)?;
    let start_time = time_text(required(map, "start_time")?);
    let end_time = time_text(required(map, "end_time")?);
    check_time_range(&start_time, &end_time)?;
    let weeks = parse_weeks(required(map, "weeks")?)?;

    Ok(NewCourse {
        title: trimmed_text(required(map, "title")?),
        teacher: optional_text(map, "teacher"),
        location: optional_text(map, "location"),
        remark: optional_text(map, "remark"),
        weekday,
        start_time,
        end_time,
        weeks,
        color: field(map, "color").map(parse_color).unwrap_or_else(|| DEFAULT_COLOR.to_string()),
    })
}

/// Validates the fields present in a partial update.
///
/// When only one end of the time range is present it is checked for format
/// here; the caller re-checks the order once the patch is merged.
pub fn validate_course_patch(payload: &Value) -> Result<CoursePatch, ValidationError> {
    let map = as_object(payload, "course")?;

    let start_time = field(map, "start_time").map(time_text);
    let end_time = field(map, "end_time").map(time_text);
    match (&start_time, &end_time) {
        (Some(start), Some(end)) => check_time_range(start, end)?,
        (Some(time), None) | (None, Some(time)) => {
            if parse_time(time).is_none() {
                return Err(invalid_time_range());
            }
        }
        (None, None) => {}
    }

    Ok(CoursePatch {
        title: field(map, "title").map(trimmed_text),
        teacher: field(map, "teacher").map(trimmed_text),
        location: field(map, "location").map(trimmed_text),
        remark: field(map, "remark").map(trimmed_text),
        weekday: field(map, "weekday").map(parse_weekday).transpose()?,
        start_time,
        end_time,
        weeks: field(map, "weeks").map(parse_weeks).transpose()?,
        color: field(map, "color").map(parse_color),
    })
}

pub fn check_time_range(start: &str, end: &str) -> Result<(), ValidationError> {
    if valid_time_range(start, end) {
        Ok(())
    } else {
        Err(invalid_time_range())
    }
}

fn invalid_time_range() -> ValidationError {
    ValidationError::InvalidRange("Invalid time range".to_string())
}

fn required<'a>(map: &'a Map<String, Value>, key: &'static str) -> Result<&'a Value, ValidationError> {
    field(map, key).ok_or(ValidationError::MissingField(key))
}

fn optional_text(map: &Map<String, Value>, key: &str) -> String {
    field(map, key).map(trimmed_text).unwrap_or_default()
}

// Times are stored exactly as sent.
fn time_text(value: &Value) -> String {
    super::as_text(value)
}

fn parse_weekday(value: &Value) -> Result<u8, ValidationError> {
    match coerce_int(value) {
        Some(day @ 1..=7) => Ok(day as u8),
        _ => Err(ValidationError::InvalidRange(
            "weekday must be between 1 and 7".to_string(),
        )),
    }
}

fn parse_weeks(value: &Value) -> Result<Vec<u32>, ValidationError> {
    let items = match value.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => {
            return Err(ValidationError::InvalidWeeks(
                "weeks must be a non-empty list".to_string(),
            ));
        }
    };

    let mut weeks = BTreeSet::new();
    for item in items {
        let week = coerce_int(item).ok_or_else(|| {
            ValidationError::InvalidWeeks("weeks must contain integers".to_string())
        })?;
        match u32::try_from(week) {
            Ok(week) if week > 0 => {
                weeks.insert(week);
            }
            _ => {}
        }
    }

    if weeks.is_empty() {
        return Err(ValidationError::InvalidWeeks(
            "weeks must contain at least one positive week".to_string(),
        ));
    }
    Ok(weeks.into_iter().collect())
}

fn parse_color(value: &Value) -> String {
    let color = trimmed_text(value);
    if color.is_empty() {
        DEFAULT_COLOR.to_string()
    } else {
        color
    }
}

use chrono::NaiveDate;
use serde_json::Value;

use super::{ValidationError, as_object, as_text, coerce_int, field, trimmed_text, valid_time_range};
use crate::models::Settings;
use crate::models::settings::{
    ALLOWED_SLOT_INTERVALS, DATE_FORMAT, DEFAULT_DAY_END, DEFAULT_DAY_START,
    DEFAULT_SEMESTER_NAME, DEFAULT_SLOT_INTERVAL,
};

/// Normalizes a settings payload.
///
/// Bad `first_monday` becomes `today`, bad `slot_interval` becomes 30 and a
/// blank name becomes the placeholder. Only an inverted day range is an error.
pub fn validate_settings(payload: &Value, today: NaiveDate) -> Result<Settings, ValidationError> {
    let map = as_object(payload, "settings")?;

    let semester_name = field(map, "semester_name")
        .map(trimmed_text)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_SEMESTER_NAME.to_string());

    let first_monday = field(map, "first_monday")
        .map(as_text)
        .filter(|date| NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok())
        .unwrap_or_else(|| today.format(DATE_FORMAT).to_string());

    let day_start = field(map, "day_start")
        .map(as_text)
        .unwrap_or_else(|| DEFAULT_DAY_START.to_string());
    let day_end = field(map, "day_end")
        .map(as_text)
        .unwrap_or_else(|| DEFAULT_DAY_END.to_string());
    if !valid_time_range(&day_start, &day_end) {
        return Err(ValidationError::InvalidRange(
            "Invalid day time range".to_string(),
        ));
    }

    let slot_interval = field(map, "slot_interval")
        .and_then(coerce_int)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| ALLOWED_SLOT_INTERVALS.contains(n))
        .unwrap_or(DEFAULT_SLOT_INTERVAL);

    Ok(Settings {
        semester_name,
        first_monday,
        day_start,
        day_end,
        slot_interval,
    })
}

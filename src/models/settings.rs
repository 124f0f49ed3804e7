use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEMESTER_NAME: &str = "示例学期";
pub const DEFAULT_DAY_START: &str = "08:00";
pub const DEFAULT_DAY_END: &str = "20:00";
pub const DEFAULT_SLOT_INTERVAL: u32 = 30;
pub const ALLOWED_SLOT_INTERVALS: [u32; 5] = [15, 20, 30, 45, 60];

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Semester-wide settings. Stored as a single JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_semester_name")]
    pub semester_name: String,
    #[serde(default = "default_first_monday")]
    pub first_monday: String,
    #[serde(default = "default_day_start")]
    pub day_start: String,
    #[serde(default = "default_day_end")]
    pub day_end: String,
    #[serde(default = "default_slot_interval")]
    pub slot_interval: u32,
}

fn default_semester_name() -> String {
    DEFAULT_SEMESTER_NAME.to_string()
}

fn default_first_monday() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}

fn default_day_start() -> String {
    DEFAULT_DAY_START.to_string()
}

fn default_day_end() -> String {
    DEFAULT_DAY_END.to_string()
}

fn default_slot_interval() -> u32 {
    DEFAULT_SLOT_INTERVAL
}

impl Settings {
    /// Default settings with the semester starting on `today`.
    pub fn default_for(today: NaiveDate) -> Self {
        Self {
            semester_name: DEFAULT_SEMESTER_NAME.to_string(),
            first_monday: today.format(DATE_FORMAT).to_string(),
            day_start: DEFAULT_DAY_START.to_string(),
            day_end: DEFAULT_DAY_END.to_string(),
            slot_interval: DEFAULT_SLOT_INTERVAL,
        }
    }

    pub fn first_monday_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.first_monday, DATE_FORMAT).ok()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::default_for(Local::now().date_naive())
    }
}

/// Import/export envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleExport {
    pub courses: Vec<super::Course>,
    pub settings: Settings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_stored_fields() {
        let json = r#"{"first_monday":"2020-01-06","semester_name":"x","day_start":"08:00","day_end":"20:00"}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.first_monday, "2020-01-06");
        assert_eq!(settings.semester_name, "x");
        assert_eq!(settings.slot_interval, DEFAULT_SLOT_INTERVAL);
    }
}

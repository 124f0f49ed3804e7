use serde::{Deserialize, Serialize};

pub const DEFAULT_COLOR: &str = "#4f8cff";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub teacher: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub remark: String,
    pub weekday: u8,
    pub start_time: String,
    pub end_time: String,
    pub weeks: Vec<u32>,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// A fully validated course that has not been given an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub title: String,
    pub teacher: String,
    pub location: String,
    pub remark: String,
    pub weekday: u8,
    pub start_time: String,
    pub end_time: String,
    pub weeks: Vec<u32>,
    pub color: String,
}

impl NewCourse {
    pub fn with_id(self, id: u64) -> Course {
        Course {
            id,
            title: self.title,
            teacher: self.teacher,
            location: self.location,
            remark: self.remark,
            weekday: self.weekday,
            start_time: self.start_time,
            end_time: self.end_time,
            weeks: self.weeks,
            color: self.color,
        }
    }
}

/// Fields of a partial update that were present and valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub teacher: Option<String>,
    pub location: Option<String>,
    pub remark: Option<String>,
    pub weekday: Option<u8>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub weeks: Option<Vec<u32>>,
    pub color: Option<String>,
}

impl Course {
    /// Returns a copy of `self` with every present field of `patch` applied.
    pub fn patched(&self, patch: CoursePatch) -> Course {
        let mut next = self.clone();
        if let Some(title) = patch.title {
            next.title = title;
        }
        if let Some(teacher) = patch.teacher {
            next.teacher = teacher;
        }
        if let Some(location) = patch.location {
            next.location = location;
        }
        if let Some(remark) = patch.remark {
            next.remark = remark;
        }
        if let Some(weekday) = patch.weekday {
            next.weekday = weekday;
        }
        if let Some(start_time) = patch.start_time {
            next.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            next.end_time = end_time;
        }
        if let Some(weeks) = patch.weeks {
            next.weeks = weeks;
        }
        if let Some(color) = patch.color {
            next.color = color;
        }
        next
    }

    pub fn runs_in_week(&self, week: i64) -> bool {
        self.weeks.iter().any(|&w| i64::from(w) == week)
    }
}

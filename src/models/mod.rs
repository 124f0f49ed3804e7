pub mod course;
pub mod settings;

pub use course::{Course, CoursePatch, NewCourse};
pub use settings::{ScheduleExport, Settings};

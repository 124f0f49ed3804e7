pub mod schedule_service;
pub mod week;

pub use schedule_service::ScheduleService;

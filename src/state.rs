use std::sync::Arc;

use crate::config::Config;
use crate::services::ScheduleService;

#[derive(Clone)]
pub struct AppState {
    pub schedule: ScheduleService,
    pub config: Arc<Config>,
}

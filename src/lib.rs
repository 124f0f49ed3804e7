pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod validation;

use std::sync::Arc;

use axum::Router;

use crate::config::Config;
use crate::db::{DataFiles, Repository, RepositoryError};
use crate::services::ScheduleService;
use crate::state::AppState;

/// Prepares the data directory and builds the application router.
pub async fn build_app(config: Config) -> Result<Router, RepositoryError> {
    let repo = Repository::new(DataFiles::in_dir(&config.data_dir));
    repo.ensure_initialized().await?;

    let state = AppState {
        schedule: ScheduleService::new(repo),
        config: Arc::new(config),
    };
    Ok(api::router(state))
}

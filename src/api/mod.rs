use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query};
use axum::routing::{post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

#[derive(Deserialize)]
struct ScheduleQueryParams {
    week: Option<String>,
}

#[derive(Serialize)]
struct CurrentWeekResponse {
    current_week: u32,
}

#[derive(Serialize)]
struct ImportResponse {
    status: &'static str,
    courses: usize,
}

pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(health))
        .route("/api/settings", get(get_settings).put(replace_settings))
        .route("/api/current_week", get(current_week))
        .route("/api/courses", get(list_courses).post(create_course))
        .route("/api/courses/{id}", put(update_course).delete(delete_course))
        .route("/api/schedule", get(schedule))
        .route("/api/export", get(export))
        .route("/api/import", post(import))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// Bodies are parsed as JSON whatever the Content-Type says.
fn json_body(body: &Bytes) -> Result<Value, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))
}

fn course_id(raw: &str) -> Result<u64, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid course id: {}", raw)))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.schedule.settings().await)
}

async fn replace_settings(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Settings>, AppError> {
    let payload = json_body(&body)?;
    let settings = state.schedule.replace_settings(&payload, today()).await?;
    Ok(Json(settings))
}

async fn current_week(State(state): State<AppState>) -> Json<CurrentWeekResponse> {
    let current_week = state.schedule.current_week(today()).await;
    Json(CurrentWeekResponse { current_week })
}

async fn list_courses(State(state): State<AppState>) -> Json<Vec<Course>> {
    Json(state.schedule.list_courses().await)
}

async fn create_course(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let payload = json_body(&body)?;
    let course = state.schedule.create_course(&payload).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Course>, AppError> {
    let id = course_id(&id)?;
    // Unknown ids are reported before the body is looked at.
    state.schedule.course(id).await?;
    let payload = json_body(&body)?;
    let course = state.schedule.update_course(id, &payload).await?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = course_id(&id)?;
    state.schedule.delete_course(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn schedule(
    State(state): State<AppState>,
    Query(params): Query<ScheduleQueryParams>,
) -> Json<Vec<Course>> {
    let week = params
        .week
        .and_then(|w| w.trim().parse::<i64>().ok())
        .unwrap_or(1);
    Json(state.schedule.schedule_for_week(week).await)
}

async fn export(State(state): State<AppState>) -> Json<ScheduleExport> {
    Json(state.schedule.export().await)
}

async fn import(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ImportResponse>, AppError> {
    let payload = json_body(&body)?;
    let courses = state.schedule.import(&payload, today()).await?;
    Ok(Json(ImportResponse {
        status: "ok",
        courses,
    }))
}

//! Campus handlers.
//!
//! - `GET /campus` - Configured campus from the public object API
//! - `GET /campus/courses` - Courses of the configured campus

use crate::errors::ApiError;
use crate::models::{CampusResponse, Course};
use crate::routes::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /campus
///
/// # Response
///
/// - 200 OK: `{id, name, type}`
/// - 404 Not Found: The configured campus does not exist on the platform
/// - 502/503: Platform failure
#[instrument(skip_all, name = "manager.campus.get")]
pub async fn get_campus(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CampusResponse>, ApiError> {
    let campus = state
        .campus_client
        .fetch(&state.platform.campus_name)
        .await?;

    Ok(Json(CampusResponse::from(campus)))
}

/// Handler for GET /campus/courses
#[instrument(skip_all, name = "manager.campus.courses")]
pub async fn get_campus_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.courses.campus_courses().await?))
}

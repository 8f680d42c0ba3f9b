//! Root and health check handlers.

use crate::models::{HealthResponse, WELCOME_MESSAGE};
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /
///
/// Returns the welcome message as a JSON string.
pub async fn root() -> Json<&'static str> {
    Json(WELCOME_MESSAGE)
}

/// Liveness probe handler.
///
/// Does not call the platform; a slow platform must not get the service
/// restarted.
///
/// ## Example Response
///
/// ```json
/// {
///   "status": "healthy",
///   "domain": "platform.example.com",
///   "campus": "rouen"
/// }
/// ```
#[instrument(skip_all, name = "manager.health.check")]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        domain: state.platform.domain.clone(),
        campus: state.platform.campus_name.clone(),
    })
}

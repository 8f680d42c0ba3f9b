//! Course registration handlers.
//!
//! - `POST /campus/courses/register` - Register the caller to a course
//! - `POST /campus/courses/unregister` - Remove the caller from a course
//!
//! Both take `{"courseId": <int>}` and act on the user named by `x-token`.

use crate::auth::HasuraClaims;
use crate::errors::ApiError;
use crate::models::{CourseRegistrationRequest, MessageResponse};
use crate::routes::AppState;
use axum::{body::Bytes, extract::State, Extension, Json};
use std::sync::Arc;
use tracing::instrument;

/// Parse the request body.
///
/// Deserialized by hand to return 400 (not Axum's default 415/422).
fn parse_registration(body: &Bytes) -> Result<CourseRegistrationRequest, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "manager.handlers.courses", error = %e, "Invalid request body");
        ApiError::BadRequest(format!("Invalid request body: {e}"))
    })
}

/// Handler for POST /campus/courses/register
///
/// # Response
///
/// - 200 OK: `{"message": "User registered to the course"}`
/// - 400 Bad Request: Missing/invalid token or body
/// - 502 Bad Gateway: The platform refused the registration
#[instrument(skip_all, name = "manager.courses.register")]
pub async fn register_course(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HasuraClaims>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = claims.user_id()?;
    let request = parse_registration(&body)?;

    state.courses.register(user_id, request.course_id).await?;

    Ok(Json(MessageResponse {
        message: "User registered to the course".to_string(),
    }))
}

/// Handler for POST /campus/courses/unregister
#[instrument(skip_all, name = "manager.courses.unregister")]
pub async fn unregister_course(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HasuraClaims>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = claims.user_id()?;
    let request = parse_registration(&body)?;

    state.courses.unregister(user_id, request.course_id).await?;

    Ok(Json(MessageResponse {
        message: "User unregistered from the course".to_string(),
    }))
}

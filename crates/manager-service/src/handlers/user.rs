//! User handlers.
//!
//! All routes here sit behind `require_user_token`; the caller's Hasura
//! claims are available as a request extension.
//!
//! - `GET /user/name` - First and last name
//! - `GET /user/roles` - Allowed roles from the token
//! - `GET /user/extractId` - User id from the token
//! - `GET /user/courses` - Courses the user is registered to
//! - `GET /user/availableCourses` - Campus courses the user is not registered to

use crate::auth::HasuraClaims;
use crate::errors::ApiError;
use crate::models::{Course, RolesResponse, UserIdResponse, UserNameResponse};
use crate::routes::AppState;
use axum::{extract::State, Extension, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /user/name
#[instrument(skip_all, name = "manager.user.name")]
pub async fn get_user_name(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HasuraClaims>,
) -> Result<Json<UserNameResponse>, ApiError> {
    let user_id = claims.user_id()?;
    Ok(Json(state.users.name(user_id).await?))
}

/// Handler for GET /user/roles
///
/// Answered from the token alone; the platform is not called.
#[instrument(skip_all, name = "manager.user.roles")]
pub async fn get_user_roles(
    Extension(claims): Extension<HasuraClaims>,
) -> Result<Json<RolesResponse>, ApiError> {
    let roles = claims.allowed_roles()?.to_vec();
    Ok(Json(RolesResponse { roles }))
}

/// Handler for GET /user/extractId
#[instrument(skip_all, name = "manager.user.extract_id")]
pub async fn get_user_id(
    Extension(claims): Extension<HasuraClaims>,
) -> Result<Json<UserIdResponse>, ApiError> {
    Ok(Json(UserIdResponse {
        id: claims.user_id()?,
    }))
}

/// Handler for GET /user/courses
///
/// Always a JSON array, empty when the user has no course.
#[instrument(skip_all, name = "manager.user.courses")]
pub async fn get_user_courses(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HasuraClaims>,
) -> Result<Json<Vec<Course>>, ApiError> {
    let user_id = claims.user_id()?;
    Ok(Json(state.courses.user_courses(user_id).await?))
}

/// Handler for GET /user/availableCourses
#[instrument(skip_all, name = "manager.user.available_courses")]
pub async fn get_available_courses(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<HasuraClaims>,
) -> Result<Json<Vec<Course>>, ApiError> {
    let user_id = claims.user_id()?;
    Ok(Json(state.courses.available_courses(user_id).await?))
}

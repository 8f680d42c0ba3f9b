//! Manager service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. Failures
//! of the platform itself are logged server-side and reported to clients with
//! a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use platform_client::{ClientError, TokenError};
use serde::Serialize;
use thiserror::Error;

/// Manager service error type.
///
/// Maps to HTTP status codes:
/// - MissingToken, InvalidToken, BadRequest: 400 Bad Request
/// - NotFound: 404 Not Found
/// - Upstream: 502 Bad Gateway
/// - ServiceUnavailable: 503 Service Unavailable
/// - Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("x-token header is missing")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The platform answered, but with an error or with data of the wrong shape.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The platform could not be reached or the service token is unusable.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::MissingToken | ApiError::InvalidToken(_) | ApiError::BadRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Upstream(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::Internal(_) => 500,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::MissingToken => (
                StatusCode::BAD_REQUEST,
                "MISSING_TOKEN",
                "x-token header is missing".to_string(),
            ),
            ApiError::InvalidToken(reason) => {
                (StatusCode::BAD_REQUEST, "INVALID_TOKEN", reason.clone())
            }
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone()),
            ApiError::NotFound(resource) => (StatusCode::NOT_FOUND, "NOT_FOUND", resource.clone()),
            ApiError::Upstream(reason) => {
                tracing::warn!(target: "manager.platform", reason = %reason, "Platform returned an error");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", reason.clone())
            }
            ApiError::ServiceUnavailable(reason) => {
                // Log actual reason server-side
                tracing::warn!(target: "manager.availability", reason = %reason, "Platform unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Platform temporarily unavailable".to_string(),
                )
            }
            ApiError::Internal(reason) => {
                tracing::error!(target: "manager.internal", reason = %reason, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}

/// Convert user-token decoding errors to ApiError
impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::InvalidToken(err.to_string())
    }
}

/// Convert platform client errors to ApiError
///
/// Errors about the service's own token are availability problems, not
/// problems with the caller's request.
impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::GraphqlRequestFailed(message) => ApiError::Upstream(message),
            ClientError::InvalidResponse(reason) => ApiError::Upstream(reason),
            ClientError::MalformedToken(_)
            | ClientError::TokenNotFound
            | ClientError::RefreshFailed { .. }
            | ClientError::GraphqlTransportFailed { .. } => {
                ApiError::ServiceUnavailable(err.to_string())
            }
            ClientError::InvalidRequest(_)
            | ClientError::Storage(_)
            | ClientError::Configuration(_) => ApiError::Internal(err.to_string()),
        }
    }
}

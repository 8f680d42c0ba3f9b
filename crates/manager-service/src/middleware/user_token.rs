//! User token middleware for user-scoped routes.
//!
//! Reads the platform token the browser sends in the `x-token` header,
//! decodes its payload and injects the Hasura claims into request extensions.
//! The signature is not checked here; the token is only used to learn which
//! user the request is about, and the platform enforces its own permissions
//! on every GraphQL call.

use crate::auth::HasuraClaims;
use crate::errors::ApiError;
use axum::{extract::Request, middleware::Next, response::IntoResponse};
use tracing::instrument;

/// Header carrying the caller's platform token.
pub const USER_TOKEN_HEADER: &str = "x-token";

/// Extract the raw token from the `x-token` header.
fn extract_user_token(req: &Request) -> Result<&str, ApiError> {
    let token = req
        .headers()
        .get(USER_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    if token.is_empty() {
        tracing::debug!(target: "manager.middleware.user_token", "Missing x-token header");
        return Err(ApiError::MissingToken);
    }

    Ok(token)
}

/// Middleware for user-scoped routes.
///
/// # Response
///
/// - Returns 400 Bad Request if the header is missing or the token is undecodable
/// - Continues to next handler with `HasuraClaims` in extensions otherwise
#[instrument(skip_all, name = "manager.middleware.user_token")]
pub async fn require_user_token(
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_user_token(&req)?;

    let claims = HasuraClaims::from_token(token).map_err(|e| {
        tracing::debug!(target: "manager.middleware.user_token", error = %e, "Undecodable user token");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

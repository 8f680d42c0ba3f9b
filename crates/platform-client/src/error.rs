//! Error types for the platform client.

use crate::jwt::TokenError;
use thiserror::Error;

/// Errors returned by [`crate::PlatformClient`] and the token stores.
///
/// None of these are retried inside the client; the caller decides.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The cached or refreshed token could not be decoded.
    #[error("Malformed token: {0}")]
    MalformedToken(#[from] TokenError),

    /// No token is available (empty cache or empty bootstrap store).
    #[error("Token not found")]
    TokenNotFound,

    /// The refresh round-trip failed.
    ///
    /// `status` is set when the platform answered with a non-2xx status and
    /// is `None` for transport errors.
    #[error("Token refresh failed: {message}")]
    RefreshFailed {
        /// HTTP status of a rejected refresh; `None` when the endpoint was
        /// unreachable or returned an unusable token.
        status: Option<u16>,
        /// Human-readable reason.
        message: String,
    },

    /// The GraphQL endpoint answered with a non-2xx status or was unreachable.
    #[error("GraphQL transport failed: {message}")]
    GraphqlTransportFailed {
        /// HTTP status returned by the GraphQL endpoint.
        status: Option<u16>,
        /// Status text or transport error.
        message: String,
    },

    /// The GraphQL response carried a non-empty `errors` array.
    ///
    /// Holds the first error message only.
    #[error("{0}")]
    GraphqlRequestFailed(String),

    /// The GraphQL request body could not be encoded.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A 2xx response body could not be parsed into the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Reading or writing the persisted token failed.
    #[error("Token storage error: {0}")]
    Storage(String),

    /// The client could not be configured.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// HTTP status carried by the error, if the platform returned one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RefreshFailed { status, .. } | Self::GraphqlTransportFailed { status, .. } => {
                *status
            }
            _ => None,
        }
    }
}

/// Result type alias using `ClientError`
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_graphql_request_failed_is_bare_message() {
        let err = ClientError::GraphqlRequestFailed("field 'x' not found".to_string());
        assert_eq!(err.to_string(), "field 'x' not found");
    }

    #[test]
    fn test_display_refresh_failed() {
        let err = ClientError::RefreshFailed {
            status: Some(401),
            message: "401 Unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "Token refresh failed: 401 Unauthorized");
    }

    #[test]
    fn test_token_error_conversion() {
        let err: ClientError = TokenError::Malformed("missing payload segment").into();
        assert!(matches!(err, ClientError::MalformedToken(_)));
        assert!(err.to_string().contains("missing payload segment"));
    }

    #[test]
    fn test_status() {
        let transport = ClientError::GraphqlTransportFailed {
            status: Some(500),
            message: "500 Internal Server Error".to_string(),
        };
        assert_eq!(transport.status(), Some(500));
        assert_eq!(ClientError::TokenNotFound.status(), None);
    }
}

//! GraphQL wire types.

use crate::error::ClientError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a GraphQL POST.
#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a> {
    /// Query or mutation document.
    pub query: &'a str,

    /// Operation variables.
    pub variables: &'a Value,
}

/// Body returned by the GraphQL endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct GraphqlResponse {
    /// Operation result. `null` when the operation failed.
    #[serde(default)]
    pub data: Option<Map<String, Value>>,

    /// Errors reported by the engine, in order.
    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

/// One entry of the `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    /// Error message.
    pub message: String,
}

impl GraphqlResponse {
    /// First error message, if the response carries any error.
    #[must_use]
    pub fn first_error(&self) -> Option<&str> {
        self.errors
            .as_deref()
            .and_then(<[GraphqlError]>::first)
            .map(|e| e.message.as_str())
    }

    /// Consume the response, returning `data` or the first error message.
    ///
    /// A non-empty `errors` array wins over any `data` present. Missing `data`
    /// without errors yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns the first error message when `errors` is non-empty.
    pub fn into_result(self) -> Result<Map<String, Value>, String> {
        if let Some(message) = self.first_error() {
            return Err(message.to_string());
        }
        Ok(self.data.unwrap_or_default())
    }
}

/// Deserialize the `data` of a successful operation into a typed value.
///
/// # Errors
///
/// Returns `ClientError::InvalidResponse` if `data` does not match `T`.
pub fn decode_data<T: DeserializeOwned>(data: Map<String, Value>) -> Result<T, ClientError> {
    serde_json::from_value(Value::Object(data)).map_err(|e| {
        tracing::debug!(target: "platform.graphql", error = %e, "GraphQL data has unexpected shape");
        ClientError::InvalidResponse(format!("unexpected GraphQL data: {e}"))
    })
}

//! Typed GraphQL execution with metrics.

use crate::errors::ApiError;
use crate::observability::metrics;
use platform_client::graphql::decode_data;
use platform_client::GraphqlExecutor;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Instant;

/// Run `query` through `executor` and decode its data into `T`.
///
/// `operation` labels the `manager_platform_*` metrics and must come from a
/// fixed set of names.
pub async fn run_typed<T: DeserializeOwned>(
    executor: &dyn GraphqlExecutor,
    operation: &'static str,
    query: &str,
    variables: &Value,
) -> Result<T, ApiError> {
    let start = Instant::now();

    let result = match executor.run(query, variables).await {
        Ok(data) => decode_data(data),
        Err(e) => Err(e),
    };

    let status = if result.is_ok() { "success" } else { "error" };
    metrics::record_platform_query(operation, status, start.elapsed());

    result.map_err(|e| {
        tracing::debug!(target: "manager.services.platform", operation, error = %e, "Platform query failed");
        ApiError::from(e)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use platform_client::ClientError;
    use serde::Deserialize;
    use serde_json::{json, Map};

    struct FixedExecutor(Result<Value, String>);

    #[async_trait]
    impl GraphqlExecutor for FixedExecutor {
        async fn run(
            &self,
            _query: &str,
            _variables: &Value,
        ) -> platform_client::Result<Map<String, Value>> {
            match &self.0 {
                Ok(value) => Ok(value.as_object().cloned().unwrap_or_default()),
                Err(message) => Err(ClientError::GraphqlRequestFailed(message.clone())),
            }
        }
    }

    #[derive(Debug, Deserialize)]
    struct Ids {
        ids: Vec<i64>,
    }

    #[tokio::test]
    async fn test_query_decodes_data() {
        let executor = FixedExecutor(Ok(json!({"ids": [1, 2]})));

        let ids: Ids = run_typed(&executor, "test", "query { ids }", &json!({}))
            .await
            .unwrap();
        assert_eq!(ids.ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_query_shape_mismatch_is_upstream() {
        let executor = FixedExecutor(Ok(json!({"ids": "nope"})));

        let result: Result<Ids, _> = run_typed(&executor, "test", "query { ids }", &json!({})).await;
        assert!(matches!(result, Err(ApiError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_query_graphql_error_is_upstream() {
        let executor = FixedExecutor(Err("permission denied".to_string()));

        let result: Result<Ids, _> = run_typed(&executor, "test", "query { ids }", &json!({})).await;
        assert!(matches!(result, Err(ApiError::Upstream(msg)) if msg == "permission denied"));
    }
}

//! Mocked learning platform
//!
//! Wraps a wiremock server exposing the three platform surfaces the manager
//! talks to: token refresh, GraphQL and the public object API.

use crate::token_builders::TestTokenBuilder;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Refresh endpoint path.
pub const REFRESH_PATH: &str = "/api/auth/refresh";

/// GraphQL endpoint path.
pub const GRAPHQL_PATH: &str = "/api/graphql-engine/v1/graphql";

/// Mock platform for integration tests.
///
/// # Example
/// ```rust,ignore
/// let platform = MockPlatform::start().await;
/// platform.mount_refresh(&TestTokenBuilder::service().build()).await;
/// platform
///     .mount_graphql_data("queryCampusEvents", json!({"event": []}))
///     .await;
/// ```
pub struct MockPlatform {
    server: MockServer,
}

impl MockPlatform {
    /// Start an empty mock platform.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of the mock platform.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Underlying wiremock server, for custom mocks.
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Answer refreshes with `token`, quoted as the platform does.
    pub async fn mount_refresh(&self, token: &str) {
        Mock::given(method("GET"))
            .and(path(REFRESH_PATH))
            .and(header_exists("x-jwt-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("\"{token}\"")))
            .mount(&self.server)
            .await;
    }

    /// Answer refreshes with a fresh service token valid for an hour.
    pub async fn mount_service_refresh(&self) -> String {
        let token = TestTokenBuilder::service().expires_in(3600).build();
        self.mount_refresh(&token).await;
        token
    }

    /// Answer refreshes with an error status.
    pub async fn mount_refresh_status(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path(REFRESH_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Answer GraphQL operations whose body contains `operation` with `data`.
    pub async fn mount_graphql_data(&self, operation: &str, data: Value) {
        Mock::given(method("POST"))
            .and(path(GRAPHQL_PATH))
            .and(body_string_contains(operation))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
            .mount(&self.server)
            .await;
    }

    /// Same as [`MockPlatform::mount_graphql_data`], expecting exactly `times` calls.
    pub async fn mount_graphql_data_expect(&self, operation: &str, data: Value, times: u64) {
        Mock::given(method("POST"))
            .and(path(GRAPHQL_PATH))
            .and(body_string_contains(operation))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Answer GraphQL operations whose body contains `operation` with errors.
    pub async fn mount_graphql_errors(&self, operation: &str, messages: &[&str]) {
        let errors: Vec<Value> = messages.iter().map(|m| json!({ "message": m })).collect();
        Mock::given(method("POST"))
            .and(path(GRAPHQL_PATH))
            .and(body_string_contains(operation))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errors": errors })))
            .mount(&self.server)
            .await;
    }

    /// Answer every GraphQL operation with an HTTP error status.
    pub async fn mount_graphql_status(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(GRAPHQL_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Serve `object` from the object API under `name`.
    pub async fn mount_object(&self, name: &str, object: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api/object/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(object))
            .mount(&self.server)
            .await;
    }
}

/// Campus object as the object API returns it.
pub fn campus_object(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "type": "campus",
        "attrs": {"displayName": name},
        "children": {
            "piscine-go": {"id": id + 1, "index": 0},
            "div-01": {"id": id + 2, "index": 1}
        }
    })
}

/// One row of the `event` query result.
pub fn event_row(id: i64, name: &str, campus: &str) -> Value {
    json!({"id": id, "object": {"campus": campus, "name": name}})
}

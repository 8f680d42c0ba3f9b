//! Configuration for the platform client.

use std::time::Duration;

/// Default HTTP request timeout for refresh and GraphQL calls.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout for the HTTP client.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Path of the token refresh endpoint.
pub const REFRESH_PATH: &str = "/api/auth/refresh";

/// Path of the GraphQL endpoint.
pub const GRAPHQL_PATH: &str = "/api/graphql-engine/v1/graphql";

/// Configuration for [`crate::PlatformClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every API path is appended to (e.g. `https://platform.example.com`).
    pub base_url: String,

    /// Request timeout applied to every call.
    pub http_timeout: Duration,

    /// Connection timeout applied to every call.
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for an explicit base URL.
    ///
    /// A trailing `/` is removed. Intended for tests and for platforms served
    /// behind a non-default scheme or port; production code should prefer
    /// [`ClientConfig::for_domain`].
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Create a configuration targeting `https://{domain}`.
    #[must_use]
    pub fn for_domain(domain: &str) -> Self {
        Self::new(format!("https://{domain}"))
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Absolute URL of the refresh endpoint.
    #[must_use]
    pub fn refresh_url(&self) -> String {
        format!("{}{REFRESH_PATH}", self.base_url)
    }

    /// Absolute URL of the GraphQL endpoint.
    #[must_use]
    pub fn graphql_url(&self) -> String {
        format!("{}{GRAPHQL_PATH}", self.base_url)
    }
}

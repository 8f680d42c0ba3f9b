//! Authenticated GraphQL client for the learning platform.
//!
//! Every outbound GraphQL call carries a token that was not expired when the
//! call started. Tokens are refreshed transparently through the platform's
//! refresh endpoint, which accepts an expired-but-well-formed token as the
//! credential for issuing a new one.
//!
//! # Token lifecycle
//!
//! ```text
//! Unset --connect()--> Valid --time--> Expired --get_token()--> Valid --> ...
//! ```
//!
//! `Expired` is never observed by callers: [`PlatformClient::get_token`]
//! resolves it under a guard before returning.
//!
//! # Example
//!
//! ```rust,ignore
//! use platform_client::{ClientConfig, EnvFileTokenStore, PlatformClient, TokenCache};
//! use std::sync::Arc;
//!
//! let client = PlatformClient::connect(
//!     ClientConfig::for_domain("platform.example.com"),
//!     Arc::new(TokenCache::new()),
//!     Arc::new(EnvFileTokenStore::default()),
//! )
//! .await?;
//!
//! let data = client
//!     .run("query { user { id } }", &serde_json::json!({}))
//!     .await?;
//! ```
//!
//! # Security
//!
//! - Tokens are held as `SecretString` and never logged
//! - Signatures are not verified; the platform is the only token issuer
//! - HTTP timeouts bound both the refresh and the GraphQL round-trips

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::graphql::{decode_data, GraphqlRequest, GraphqlResponse};
use crate::jwt::{self, Claims};
use crate::secret::{ExposeSecret, SecretString};
use crate::token_cache::TokenCache;
use crate::token_store::TokenStore;
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Header carrying the current token on refresh requests.
pub const REFRESH_TOKEN_HEADER: &str = "x-jwt-token";

// =============================================================================
// Executor trait
// =============================================================================

/// Executes GraphQL operations against the platform.
///
/// Implemented by [`PlatformClient`]; services depend on this trait so their
/// handlers can be tested against mocks.
#[async_trait]
pub trait GraphqlExecutor: Send + Sync {
    /// Run `query` with `variables`, returning the operation's `data`.
    async fn run(&self, query: &str, variables: &Value) -> Result<Map<String, Value>>;
}

// =============================================================================
// Client
// =============================================================================

/// Authenticated platform client.
///
/// One instance is expected per process; share it behind an `Arc`.
pub struct PlatformClient {
    config: ClientConfig,
    http_client: reqwest::Client,
    cache: Arc<TokenCache>,
    store: Arc<dyn TokenStore>,
    /// Serializes read, expiry check, refresh and write-back of the cache.
    refresh_guard: Mutex<()>,
}

impl std::fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformClient")
            .field("base_url", &self.config.base_url)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl PlatformClient {
    /// Bootstrap a client.
    ///
    /// 1. Loads the bootstrap token from `store`
    /// 2. Refreshes it unconditionally, whatever its expiry
    /// 3. Writes the new token to `cache` and back to `store`
    ///
    /// # Errors
    ///
    /// - `ClientError::TokenNotFound` - the store holds no token
    /// - `ClientError::RefreshFailed` - the platform rejected the refresh
    /// - `ClientError::MalformedToken` - the platform returned an undecodable token
    /// - `ClientError::Storage` - the store could not be read or written
    /// - `ClientError::Configuration` - the HTTP client could not be built
    ///
    /// No partially usable client is ever returned.
    #[instrument(skip_all, fields(base_url = %config.base_url))]
    pub async fn connect(
        config: ClientConfig,
        cache: Arc<TokenCache>,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self> {
        let http_client = build_http_client(&config)?;

        let bootstrap = store.load().await?.ok_or_else(|| {
            warn!(target: "platform.client", "No bootstrap token in token store");
            ClientError::TokenNotFound
        })?;

        let (token, _claims) = refresh_token(&http_client, &config, &bootstrap).await?;
        cache.set(token.clone());
        store.store(&token).await?;

        info!(target: "platform.client", "Platform client bootstrapped");

        Ok(Self {
            config,
            http_client,
            cache,
            store,
            refresh_guard: Mutex::new(()),
        })
    }

    /// Build a client over an already populated cache, without bootstrapping.
    ///
    /// Useful when another component owns the bootstrap, and in tests.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn with_cache(
        config: ClientConfig,
        cache: Arc<TokenCache>,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self> {
        let http_client = build_http_client(&config)?;
        Ok(Self {
            config,
            http_client,
            cache,
            store,
            refresh_guard: Mutex::new(()),
        })
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The token cache shared with this client.
    #[must_use]
    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    /// Get a token that is not expired.
    ///
    /// Holds the guard across the whole read, decode, expiry check, refresh
    /// and write-back sequence. At most one refresh round-trip is in flight;
    /// callers queued behind it read the refreshed token from the cache.
    ///
    /// A refreshed token replaces the cached one and is persisted to the
    /// store. A persistence failure is logged and does not fail the call.
    ///
    /// # Errors
    ///
    /// - `ClientError::TokenNotFound` - the cache was never populated
    /// - `ClientError::MalformedToken` - the cached or refreshed token cannot be decoded
    /// - `ClientError::RefreshFailed` - the refresh round-trip failed
    #[instrument(skip_all)]
    pub async fn get_token(&self) -> Result<SecretString> {
        let _guard = self.refresh_guard.lock().await;

        let token = self.cache.get().ok_or(ClientError::TokenNotFound)?;
        let claims = jwt::decode(token.expose_secret())?;
        if !jwt::is_expired(&claims) {
            return Ok(token);
        }

        debug!(
            target: "platform.client",
            exp = ?jwt::expires_at(&claims),
            "Cached token expired, refreshing"
        );

        let (fresh, _claims) = refresh_token(&self.http_client, &self.config, &token).await?;
        self.cache.set(fresh.clone());

        if let Err(e) = self.store.store(&fresh).await {
            warn!(
                target: "platform.client",
                error = %e,
                "Failed to persist refreshed token"
            );
        }

        Ok(fresh)
    }

    /// Execute a GraphQL query or mutation.
    ///
    /// The token guard is only held while acquiring the token, so several
    /// operations can be in flight at once. Nothing is retried.
    ///
    /// # Errors
    ///
    /// - Any error from [`PlatformClient::get_token`]
    /// - `ClientError::GraphqlTransportFailed` - transport error or non-2xx status
    /// - `ClientError::InvalidResponse` - the body is not a GraphQL response
    /// - `ClientError::GraphqlRequestFailed` - the response carried errors (first message)
    #[instrument(skip_all)]
    pub async fn run(&self, query: &str, variables: &Value) -> Result<Map<String, Value>> {
        let body = serde_json::to_vec(&GraphqlRequest { query, variables })
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;

        let token = self.get_token().await?;

        let response = self
            .http_client
            .post(self.config.graphql_url())
            .bearer_auth(token.expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, body.len())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "platform.client", error = %e, "GraphQL request failed");
                ClientError::GraphqlTransportFailed {
                    status: None,
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                target: "platform.client",
                status = %status,
                "GraphQL endpoint returned error status"
            );
            return Err(ClientError::GraphqlTransportFailed {
                status: Some(status.as_u16()),
                message: status.to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            ClientError::GraphqlTransportFailed {
                status: Some(status.as_u16()),
                message: e.to_string(),
            }
        })?;

        let parsed: GraphqlResponse = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(target: "platform.client", error = %e, "Failed to parse GraphQL response");
            ClientError::InvalidResponse(e.to_string())
        })?;

        parsed.into_result().map_err(|message| {
            debug!(target: "platform.client", message = %message, "GraphQL operation failed");
            ClientError::GraphqlRequestFailed(message)
        })
    }

    /// Execute an operation and deserialize its `data` into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`PlatformClient::run`], plus `ClientError::InvalidResponse`
    /// when `data` does not match `T`.
    pub async fn run_as<T: DeserializeOwned>(&self, query: &str, variables: &Value) -> Result<T> {
        decode_data(self.run(query, variables).await?)
    }
}

#[async_trait]
impl GraphqlExecutor for PlatformClient {
    async fn run(&self, query: &str, variables: &Value) -> Result<Map<String, Value>> {
        PlatformClient::run(self, query, variables).await
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.http_timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|e| ClientError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// Extract the token from a refresh response body.
///
/// The platform answers with a JSON string literal (`"a.b.c"`). A body that
/// is not a JSON string is taken verbatim, minus surrounding whitespace.
fn unquote_token(body: &str) -> String {
    let trimmed = body.trim();
    serde_json::from_str::<String>(trimmed).unwrap_or_else(|_| trimmed.to_string())
}

/// Exchange `token` for a new one.
///
/// Returns the new token with its claims. A new token that is already expired
/// is rejected.
#[instrument(skip_all)]
async fn refresh_token(
    http_client: &reqwest::Client,
    config: &ClientConfig,
    token: &SecretString,
) -> Result<(SecretString, Claims)> {
    debug!(target: "platform.client", url = %config.refresh_url(), "Refreshing token");

    let response = http_client
        .get(config.refresh_url())
        .header(REFRESH_TOKEN_HEADER, token.expose_secret())
        .send()
        .await
        .map_err(|e| {
            warn!(target: "platform.client", error = %e, "Refresh request failed");
            ClientError::RefreshFailed {
                status: None,
                message: e.to_string(),
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        warn!(
            target: "platform.client",
            status = %status,
            "Refresh endpoint rejected token"
        );
        return Err(ClientError::RefreshFailed {
            status: Some(status.as_u16()),
            message: status.to_string(),
        });
    }

    let body = response.text().await.map_err(|e| ClientError::RefreshFailed {
        status: Some(status.as_u16()),
        message: e.to_string(),
    })?;

    let fresh = unquote_token(&body);
    let claims = jwt::decode(&fresh)?;
    if jwt::is_expired(&claims) {
        warn!(target: "platform.client", "Refresh endpoint returned an expired token");
        return Err(ClientError::RefreshFailed {
            status: None,
            message: "refreshed token is already expired".to_string(),
        });
    }

    debug!(
        target: "platform.client",
        exp = ?jwt::expires_at(&claims),
        "Token refreshed"
    );

    Ok((SecretString::from(fresh), claims))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::token_store::InMemoryTokenStore;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Base URL of a port nothing listens on.
    fn refused_uri() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    fn token_expiring_in(secs: i64) -> String {
        let exp = chrono::Utc::now().timestamp() + secs;
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(json!({"exp": exp, "sub": "svc"}).to_string());
        format!("{header}.{payload}.signature")
    }

    fn client_with_cached(base_url: &str, token: &str) -> PlatformClient {
        PlatformClient::with_cache(
            ClientConfig::new(base_url),
            Arc::new(TokenCache::with_token(SecretString::from(token.to_string()))),
            Arc::new(InMemoryTokenStore::new()),
        )
        .unwrap()
    }

    // =========================================================================
    // unquote_token Tests
    // =========================================================================

    #[test]
    fn test_unquote_token_json_string() {
        assert_eq!(unquote_token("\"a.b.c\""), "a.b.c");
    }

    #[test]
    fn test_unquote_token_trailing_newline() {
        assert_eq!(unquote_token("\"a.b.c\"\n"), "a.b.c");
    }

    #[test]
    fn test_unquote_token_raw_body() {
        assert_eq!(unquote_token("a.b.c"), "a.b.c");
    }

    // =========================================================================
    // refresh_token Tests
    // =========================================================================

    #[tokio::test]
    async fn test_refresh_sends_token_header() {
        let mock_server = MockServer::start().await;
        let fresh = token_expiring_in(3600);

        Mock::given(method("GET"))
            .and(path("/api/auth/refresh"))
            .and(header("x-jwt-token", "old-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("\"{fresh}\"")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = ClientConfig::new(mock_server.uri());
        let http_client = build_http_client(&config).unwrap();

        let (token, claims) =
            refresh_token(&http_client, &config, &SecretString::from("old-token"))
                .await
                .unwrap();

        assert_eq!(token.expose_secret(), fresh);
        assert_eq!(claims["sub"], "svc");
    }

    #[tokio::test]
    async fn test_refresh_non_success_carries_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let config = ClientConfig::new(mock_server.uri());
        let http_client = build_http_client(&config).unwrap();

        let result = refresh_token(&http_client, &config, &SecretString::from("t")).await;

        match result {
            Err(ClientError::RefreshFailed { status, message }) => {
                assert_eq!(status, Some(401));
                assert!(message.contains("401"));
            }
            other => unreachable!("expected RefreshFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_rejects_expired_result() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(format!("\"{}\"", token_expiring_in(-10))),
            )
            .mount(&mock_server)
            .await;

        let config = ClientConfig::new(mock_server.uri());
        let http_client = build_http_client(&config).unwrap();

        let result = refresh_token(&http_client, &config, &SecretString::from("t")).await;
        assert!(matches!(
            result,
            Err(ClientError::RefreshFailed { status: None, ref message })
                if message.contains("already expired")
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_malformed_result() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_string("\"garbage\""))
            .mount(&mock_server)
            .await;

        let config = ClientConfig::new(mock_server.uri());
        let http_client = build_http_client(&config).unwrap();

        let result = refresh_token(&http_client, &config, &SecretString::from("t")).await;
        assert!(matches!(result, Err(ClientError::MalformedToken(_))));
    }

    #[tokio::test]
    async fn test_refresh_transport_error_has_no_status() {
        let config = ClientConfig::new(refused_uri());
        let http_client = build_http_client(&config).unwrap();

        let result = refresh_token(&http_client, &config, &SecretString::from("t")).await;
        assert!(matches!(
            result,
            Err(ClientError::RefreshFailed { status: None, .. })
        ));
    }

    // =========================================================================
    // get_token Tests
    // =========================================================================

    #[tokio::test]
    async fn test_get_token_valid_cache_skips_refresh() {
        let mock_server = MockServer::start().await;
        let cached = token_expiring_in(3600);

        Mock::given(method("GET"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = client_with_cached(&mock_server.uri(), &cached);
        let token = client.get_token().await.unwrap();

        assert_eq!(token.expose_secret(), cached);
    }

    #[tokio::test]
    async fn test_get_token_empty_cache() {
        let client = PlatformClient::with_cache(
            ClientConfig::new("http://127.0.0.1:1"),
            Arc::new(TokenCache::new()),
            Arc::new(InMemoryTokenStore::new()),
        )
        .unwrap();

        assert!(matches!(
            client.get_token().await,
            Err(ClientError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_get_token_malformed_cache() {
        let client = client_with_cached("http://127.0.0.1:1", "not-a-jwt");

        assert!(matches!(
            client.get_token().await,
            Err(ClientError::MalformedToken(_))
        ));
    }

    #[tokio::test]
    async fn test_get_token_expired_refreshes_and_writes_back() {
        let mock_server = MockServer::start().await;
        let expired = token_expiring_in(-60);
        let fresh = token_expiring_in(3600);

        Mock::given(method("GET"))
            .and(path("/api/auth/refresh"))
            .and(header("x-jwt-token", expired.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("\"{fresh}\"")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = Arc::new(InMemoryTokenStore::new());
        let cache = Arc::new(TokenCache::with_token(SecretString::from(expired)));
        let client = PlatformClient::with_cache(
            ClientConfig::new(mock_server.uri()),
            Arc::clone(&cache),
            store.clone(),
        )
        .unwrap();

        let first = client.get_token().await.unwrap();
        let second = client.get_token().await.unwrap();

        assert_eq!(first.expose_secret(), fresh);
        assert_eq!(second.expose_secret(), fresh);
        assert_eq!(cache.get().unwrap().expose_secret(), fresh);
        assert_eq!(store.current().unwrap().expose_secret(), fresh);
    }

    #[tokio::test]
    async fn test_get_token_missing_exp_refreshes() {
        let mock_server = MockServer::start().await;
        let fresh = token_expiring_in(3600);
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#);
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"svc"}"#);
        let no_exp = format!("{header}.{payload}.sig");

        Mock::given(method("GET"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("\"{fresh}\"")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_with_cached(&mock_server.uri(), &no_exp);
        assert_eq!(client.get_token().await.unwrap().expose_secret(), fresh);
    }

    #[tokio::test]
    async fn test_get_token_refresh_failure_keeps_cache() {
        let mock_server = MockServer::start().await;
        let expired = token_expiring_in(-60);

        Mock::given(method("GET"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = client_with_cached(&mock_server.uri(), &expired);

        assert!(matches!(
            client.get_token().await,
            Err(ClientError::RefreshFailed { status: Some(503), .. })
        ));
        assert_eq!(client.cache().get().unwrap().expose_secret(), expired);
    }

    #[tokio::test]
    async fn test_debug_redacts_token() {
        let cached = token_expiring_in(3600);
        let client = client_with_cached("http://127.0.0.1:1", &cached);

        let debug_str = format!("{client:?}");
        assert!(debug_str.contains("127.0.0.1"));
        assert!(!debug_str.contains(&cached));
    }
}

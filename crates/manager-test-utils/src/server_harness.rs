//! Test server harness for E2E testing
//!
//! Provides `TestManagerServer` for spawning real manager server instances
//! against a [`MockPlatform`].

use crate::platform_mock::MockPlatform;
use crate::token_builders::TestTokenBuilder;
use manager_service::config::{Config, PlatformConfig};
use manager_service::observability::metrics::init_metrics_recorder;
use manager_service::routes::{self, AppState};
use metrics_exporter_prometheus::PrometheusHandle;
use platform_client::{ClientConfig, InMemoryTokenStore, PlatformClient, TokenCache};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Campus configured on every test server.
pub const TEST_CAMPUS: &str = "rouen";

/// Content of the swagger index served by test servers.
pub const TEST_SWAGGER_INDEX: &str = "<html><body>Track Manager API</body></html>";

/// Global metrics handle for test servers
static TEST_METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics handle shared by every test server in the process.
///
/// Installs the global recorder on first use so `/metrics` reflects requests.
pub fn get_test_metrics_handle() -> PrometheusHandle {
    TEST_METRICS_HANDLE
        .get_or_init(|| {
            init_metrics_recorder().unwrap_or_else(|_| {
                metrics_exporter_prometheus::PrometheusBuilder::new()
                    .build_recorder()
                    .handle()
            })
        })
        .clone()
}

/// Test harness for spawning the manager server in E2E tests.
///
/// The platform client is bootstrapped for real: the harness seeds an
/// in-memory token store with an expired service token and mounts a refresh
/// mock on the platform, so `connect` performs its refresh round-trip.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health() -> Result<()> {
///     let platform = MockPlatform::start().await;
///     let server = TestManagerServer::spawn(&platform).await?;
///
///     let response = reqwest::get(format!("{}/health", server.url())).await?;
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestManagerServer {
    addr: SocketAddr,
    config: Config,
    platform_config: PlatformConfig,
    service_token: String,
    token_store: Arc<InMemoryTokenStore>,
    _swagger_dir: TempDir,
    _handle: JoinHandle<()>,
}

impl TestManagerServer {
    /// Spawn a new test server instance.
    ///
    /// The server will:
    /// - Bootstrap its platform client against `platform`
    /// - Serve a temporary swagger directory
    /// - Bind to a random available port (127.0.0.1:0)
    pub async fn spawn(platform: &MockPlatform) -> Result<Self, anyhow::Error> {
        let service_token = platform.mount_service_refresh().await;

        let swagger_dir = tempfile::tempdir()
            .map_err(|e| anyhow::anyhow!("Failed to create swagger dir: {}", e))?;
        std::fs::write(swagger_dir.path().join("index.html"), TEST_SWAGGER_INDEX)?;

        let vars = HashMap::from([
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            (
                "SWAGGER_DIR".to_string(),
                swagger_dir.path().display().to_string(),
            ),
            ("PLATFORM_HTTP_TIMEOUT_SECONDS".to_string(), "5".to_string()),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let platform_config = PlatformConfig {
            campus_name: TEST_CAMPUS.to_string(),
            domain: "platform.test".to_string(),
            local_start: false,
        };

        let token_store = Arc::new(InMemoryTokenStore::with_token(
            TestTokenBuilder::service().expires_in(-60).build(),
        ));

        let client = PlatformClient::connect(
            ClientConfig::new(platform.uri()),
            Arc::new(TokenCache::new()),
            token_store.clone(),
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bootstrap platform client: {}", e))?;

        let state = Arc::new(
            AppState::new(
                config.clone(),
                platform_config.clone(),
                &platform.uri(),
                Arc::new(client),
            )
            .map_err(|e| anyhow::anyhow!("Failed to build app state: {}", e))?,
        );

        let app = routes::build_routes(state, get_test_metrics_handle());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        // Spawn server in background
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            platform_config,
            service_token,
            token_store,
            _swagger_dir: swagger_dir,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get reference to the platform configuration.
    pub fn platform_config(&self) -> &PlatformConfig {
        &self.platform_config
    }

    /// Service token the platform mock issued during bootstrap.
    pub fn service_token(&self) -> &str {
        &self.service_token
    }

    /// Token store the platform client persists to.
    pub fn token_store(&self) -> &InMemoryTokenStore {
        &self.token_store
    }
}

impl Drop for TestManagerServer {
    fn drop(&mut self) {
        // Abort the HTTP server task so the port is released when the test ends
        self._handle.abort();
    }
}

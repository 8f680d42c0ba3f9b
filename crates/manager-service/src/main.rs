//! Track Manager Service
//!
//! Entry point for the course management API.

use manager_service::config::{Config, PlatformConfig};
use manager_service::observability::metrics::init_metrics_recorder;
use manager_service::routes::{self, AppState};
use platform_client::{ClientConfig, EnvFileTokenStore, PlatformClient, TokenCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "manager_service=debug,platform_client=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Track Manager");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let platform = PlatformConfig::load(&config.platform_config_path).map_err(|e| {
        error!("Failed to load platform configuration: {}", e);
        e
    })?;

    info!(
        campus = %platform.campus_name,
        domain = %platform.domain,
        local_start = platform.local_start,
        "Configuration loaded successfully"
    );

    let bind_address = config.resolve_bind_address(&platform).map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    // Initialize Prometheus metrics recorder
    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    // Bootstrap the platform client; without a valid token nothing works
    let client_config = ClientConfig::for_domain(&platform.domain)
        .with_http_timeout(Duration::from_secs(config.platform_http_timeout_seconds));
    let base_url = client_config.base_url.clone();
    let token_store = EnvFileTokenStore::new(&config.token_store_path)
        .with_key(config.token_store_key.clone());

    let client = PlatformClient::connect(
        client_config,
        Arc::new(TokenCache::new()),
        Arc::new(token_store),
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to the platform: {}", e);
        e
    })?;

    let state = Arc::new(AppState::new(config, platform, &base_url, Arc::new(client))?);

    let app = routes::build_routes(state, metrics_handle);

    info!("Track Manager listening on {}", bind_address);

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Track Manager shutdown complete");

    Ok(())
}

/// Install the global tracing subscriber.
///
/// `LOG_FORMAT=json` switches the fmt layer to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

//! HTTP routes for the manager service.
//!
//! Defines the Axum router and application state.

use crate::config::{Config, PlatformConfig};
use crate::errors::ApiError;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_user_token, USER_TOKEN_HEADER};
use crate::services::{CampusClient, CourseService, UserService};
use axum::{
    http::{header::CONTENT_TYPE, HeaderName, Method},
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use platform_client::GraphqlExecutor;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Platform settings (campus, domain).
    pub platform: PlatformConfig,

    /// Public object API client.
    pub campus_client: CampusClient,

    /// Course operations for the configured campus.
    pub courses: CourseService,

    /// User lookups.
    pub users: UserService,
}

impl AppState {
    /// Wire the services against `base_url` and an authenticated executor.
    pub fn new(
        config: Config,
        platform: PlatformConfig,
        base_url: &str,
        executor: Arc<dyn GraphqlExecutor>,
    ) -> Result<Self, ApiError> {
        let campus_client = CampusClient::new(
            base_url,
            Duration::from_secs(config.platform_http_timeout_seconds),
        )?;
        let courses = CourseService::new(Arc::clone(&executor), platform.campus_name.clone());
        let users = UserService::new(executor);

        Ok(Self {
            config,
            platform,
            campus_client,
            courses,
            users,
        })
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/`, `/health`, `/metrics` - public operational endpoints
/// - `/swagger/*` - static API documentation
/// - `/campus`, `/campus/courses` - public campus endpoints
/// - `/user/*`, `/campus/courses/(un)register` - require the `x-token` header
/// - CORS for any origin
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let swagger_dir = state.config.swagger_dir.clone();

    // Public routes (no user token required)
    let public_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/campus", get(handlers::get_campus))
        .route("/campus/courses", get(handlers::get_campus_courses))
        .with_state(state.clone());

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // User-scoped routes (x-token required)
    let user_routes = Router::new()
        .route("/user/name", get(handlers::get_user_name))
        .route("/user/roles", get(handlers::get_user_roles))
        .route("/user/extractId", get(handlers::get_user_id))
        .route("/user/courses", get(handlers::get_user_courses))
        .route(
            "/user/availableCourses",
            get(handlers::get_available_courses),
        )
        .route("/campus/courses/register", post(handlers::register_course))
        .route(
            "/campus/courses/unregister",
            post(handlers::unregister_course),
        )
        .route_layer(middleware::from_fn(require_user_token))
        .with_state(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([HeaderName::from_static(USER_TOKEN_HEADER), CONTENT_TYPE]);

    // Layer order (innermost first):
    // 1. TraceLayer - Log request details
    // 2. TimeoutLayer - Timeout the request
    // 3. CorsLayer - Answer preflights before any token check
    // 4. http_metrics_middleware - Record ALL responses (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(user_routes)
        .nest_service("/swagger", ServeDir::new(swagger_dir))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors)
        .layer(middleware::from_fn(http_metrics_middleware))
}

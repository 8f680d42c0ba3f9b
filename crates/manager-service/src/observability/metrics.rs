//! Metrics definitions for the manager service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `manager_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: HTTP methods
//! - `endpoint`: the fixed route table, everything else is `/other`
//! - `status`: success, error, timeout
//! - `operation`: bounded by code (campus_courses, user_courses, ...)

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Routes recorded under their own `endpoint` label.
const KNOWN_ENDPOINTS: &[&str] = &[
    "/",
    "/health",
    "/metrics",
    "/campus",
    "/campus/courses",
    "/campus/courses/register",
    "/campus/courses/unregister",
    "/user/name",
    "/user/roles",
    "/user/extractId",
    "/user/courses",
    "/user/availableCourses",
];

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("manager_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Platform round-trips include a possible token refresh
        .set_buckets_for_metric(
            Matcher::Prefix("manager_platform_query".to_string()),
            &[
                0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set platform query buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `manager_http_requests_total`, `manager_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status` / `status_code`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("manager_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("manager_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion
fn normalize_endpoint(path: &str) -> String {
    if KNOWN_ENDPOINTS.contains(&path) {
        return path.to_string();
    }

    if path.starts_with("/swagger/") {
        return "/swagger".to_string();
    }

    "/other".to_string()
}

// ============================================================================
// Platform Query Metrics
// ============================================================================

/// Record a GraphQL or object API round-trip to the platform.
///
/// Metric: `manager_platform_query_duration_seconds`, `manager_platform_queries_total`
/// Labels: `operation`, `status`
///
/// Status: "success", "error"
pub fn record_platform_query(operation: &str, status: &str, duration: Duration) {
    histogram!("manager_platform_query_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("manager_platform_queries_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

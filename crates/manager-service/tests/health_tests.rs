//! Operational endpoint integration tests.
//!
//! Covers `/`, `/health`, `/metrics`, the swagger static files and CORS
//! using the `TestManagerServer` harness.

use manager_test_utils::{MockPlatform, TestManagerServer, TEST_CAMPUS, TEST_SWAGGER_INDEX};
use platform_client::secret::ExposeSecret;

/// Test that / returns the welcome message as a JSON string.
#[tokio::test]
async fn test_root_returns_welcome_message() -> Result<(), anyhow::Error> {
    let platform = MockPlatform::start().await;
    let server = TestManagerServer::spawn(&platform).await?;

    let response = reqwest::get(format!("{}/", server.url())).await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, "Welcome to the Track Manager API");

    Ok(())
}

/// Test that /health reports the configured platform without calling it.
#[tokio::test]
async fn test_health_reports_platform_settings() -> Result<(), anyhow::Error> {
    let platform = MockPlatform::start().await;
    let server = TestManagerServer::spawn(&platform).await?;
    let requests_before = platform
        .server()
        .received_requests()
        .await
        .map(|r| r.len())
        .unwrap_or_default();

    let response = reqwest::get(format!("{}/health", server.url())).await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["campus"], TEST_CAMPUS);
    assert_eq!(body["domain"], "platform.test");

    let requests_after = platform
        .server()
        .received_requests()
        .await
        .map(|r| r.len())
        .unwrap_or_default();
    assert_eq!(requests_before, requests_after, "health must not call the platform");

    Ok(())
}

/// Test that the bootstrap refresh persisted the new service token.
#[tokio::test]
async fn test_bootstrap_persists_service_token() -> Result<(), anyhow::Error> {
    let platform = MockPlatform::start().await;
    let server = TestManagerServer::spawn(&platform).await?;

    let stored = server
        .token_store()
        .current()
        .map(|t| t.expose_secret().to_string());
    assert_eq!(stored.as_deref(), Some(server.service_token()));

    Ok(())
}

/// Test that /metrics exposes request counters after a request.
#[tokio::test]
async fn test_metrics_endpoint_exposes_http_counters() -> Result<(), anyhow::Error> {
    let platform = MockPlatform::start().await;
    let server = TestManagerServer::spawn(&platform).await?;
    let client = reqwest::Client::new();

    client
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    let response = client
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body = response.text().await?;
    assert!(
        body.contains("manager_http_requests_total"),
        "Expected request counter in metrics output, got: {}",
        body
    );
    assert!(body.contains(r#"endpoint="/health""#));

    Ok(())
}

/// Test that the swagger directory is served.
#[tokio::test]
async fn test_swagger_index_is_served() -> Result<(), anyhow::Error> {
    let platform = MockPlatform::start().await;
    let server = TestManagerServer::spawn(&platform).await?;

    let response = reqwest::get(format!("{}/swagger/index.html", server.url())).await?;

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await?, TEST_SWAGGER_INDEX);

    Ok(())
}

/// Test that a missing swagger file is a 404.
#[tokio::test]
async fn test_swagger_missing_file_returns_404() -> Result<(), anyhow::Error> {
    let platform = MockPlatform::start().await;
    let server = TestManagerServer::spawn(&platform).await?;

    let response = reqwest::get(format!("{}/swagger/missing.json", server.url())).await?;

    assert_eq!(response.status(), 404);

    Ok(())
}

/// Test that CORS preflights are answered for any origin.
#[tokio::test]
async fn test_cors_preflight_allows_any_origin() -> Result<(), anyhow::Error> {
    let platform = MockPlatform::start().await;
    let server = TestManagerServer::spawn(&platform).await?;
    let client = reqwest::Client::new();

    let response = client
        .request(
            reqwest::Method::OPTIONS,
            format!("{}/user/name", server.url()),
        )
        .header("origin", "https://tracks.example.com")
        .header("access-control-request-method", "GET")
        .header("access-control-request-headers", "x-token")
        .send()
        .await?;

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let allowed_headers = response
        .headers()
        .get("access-control-allow-headers")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    assert!(allowed_headers.contains("x-token"));

    Ok(())
}

/// Test that non-existent routes return 404.
#[tokio::test]
async fn test_unknown_route_returns_404() -> Result<(), anyhow::Error> {
    let platform = MockPlatform::start().await;
    let server = TestManagerServer::spawn(&platform).await?;

    let response = reqwest::get(format!("{}/nonexistent", server.url())).await?;

    assert_eq!(response.status(), 404);

    Ok(())
}

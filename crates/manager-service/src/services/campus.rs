//! Platform object API client.
//!
//! Campus metadata is public on the platform and fetched without a token
//! from `GET {base}/api/object/{campusName}`.

use crate::errors::ApiError;
use crate::models::Campus;
use crate::observability::metrics;
use reqwest::{Client, StatusCode, Url};
use std::time::{Duration, Instant};
use tracing::{error, instrument, warn};

/// Path segments of the object API, under the platform base URL.
const OBJECT_SEGMENTS: [&str; 2] = ["api", "object"];

/// HTTP client for the platform object API.
#[derive(Clone)]
pub struct CampusClient {
    /// HTTP client with configured timeouts.
    client: Client,

    /// Platform base URL.
    base_url: Url,
}

impl CampusClient {
    /// Create a new object API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the HTTP client cannot be built or
    /// `base_url` is not an absolute URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into();
        let base_url = Url::parse(&base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::Internal(format!("Invalid platform base URL: {base_url}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                error!(target: "manager.services.campus", error = %e, "Failed to build HTTP client");
                ApiError::Internal(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, base_url })
    }

    /// Fetch a campus object by name.
    ///
    /// # Errors
    ///
    /// - `ApiError::NotFound` if the platform has no object with that name
    /// - `ApiError::ServiceUnavailable` if the platform is unreachable or fails
    /// - `ApiError::Upstream` if the object does not look like a campus
    #[instrument(skip(self), fields(campus = %campus_name))]
    pub async fn fetch(&self, campus_name: &str) -> Result<Campus, ApiError> {
        let start = Instant::now();
        let result = self.fetch_inner(campus_name).await;

        let status = if result.is_ok() { "success" } else { "error" };
        metrics::record_platform_query("campus_object", status, start.elapsed());

        result
    }

    async fn fetch_inner(&self, campus_name: &str) -> Result<Campus, ApiError> {
        let url = self.object_url(campus_name)?;

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(target: "manager.services.campus", error = %e, "Object API request failed");
            ApiError::ServiceUnavailable(format!("Object API request failed: {e}"))
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!(
                "Campus '{}' not found, check the platform configuration",
                campus_name
            )));
        }

        if !status.is_success() {
            warn!(target: "manager.services.campus", status = %status, "Object API returned error status");
            return Err(ApiError::ServiceUnavailable(format!(
                "Object API returned {status}"
            )));
        }

        let campus: Campus = response.json().await.map_err(|e| {
            warn!(target: "manager.services.campus", error = %e, "Unexpected campus object");
            ApiError::Upstream(format!("Unexpected campus object: {e}"))
        })?;

        Ok(campus.with_child_names())
    }

    /// URL of the object named `name`, percent-encoded as a single segment.
    fn object_url(&self, name: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Internal("Platform base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(OBJECT_SEGMENTS)
            .push(name);
        Ok(url)
    }
}

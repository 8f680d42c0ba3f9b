//! Manager service configuration.
//!
//! Process settings are loaded from environment variables. Platform settings
//! (campus, domain, local start) live in a JSON file whose path is itself
//! configurable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default platform configuration file.
pub const DEFAULT_PLATFORM_CONFIG_PATH: &str = "config.json";

/// Default directory served under `/swagger/`.
pub const DEFAULT_SWAGGER_DIR: &str = "swagger";

/// Default timeout for platform HTTP calls in seconds.
pub const DEFAULT_PLATFORM_HTTP_TIMEOUT_SECONDS: u64 = 10;

/// Maximum accepted platform HTTP timeout in seconds.
pub const MAX_PLATFORM_HTTP_TIMEOUT_SECONDS: u64 = 120;

/// Bind address used when the platform config requests a local start.
pub const LOCAL_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Manager service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit bind address. Overrides both the local-start and `PORT` rules.
    pub bind_address: Option<String>,

    /// Port to listen on (all IPv6 interfaces) when not starting locally.
    pub port: Option<u16>,

    /// Path of the platform configuration JSON file.
    pub platform_config_path: PathBuf,

    /// Path of the env file persisting the platform token.
    pub token_store_path: PathBuf,

    /// Key of the token inside the env file.
    pub token_store_key: String,

    /// Directory served under `/swagger/`.
    pub swagger_dir: PathBuf,

    /// Timeout applied to every platform HTTP call, in seconds.
    pub platform_http_timeout_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid port configuration: {0}")]
    InvalidPort(String),

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid platform HTTP timeout configuration: {0}")]
    InvalidHttpTimeout(String),

    #[error("Failed to read platform configuration: {0}")]
    PlatformConfigIo(String),

    #[error("Invalid platform configuration: {0}")]
    InvalidPlatformConfig(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars.get("BIND_ADDRESS").cloned();

        let port = match vars.get("PORT") {
            Some(value_str) => Some(value_str.parse::<u16>().map_err(|e| {
                ConfigError::InvalidPort(format!(
                    "PORT must be a valid port number, got '{}': {}",
                    value_str, e
                ))
            })?),
            None => None,
        };

        let platform_config_path = vars
            .get("PLATFORM_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PLATFORM_CONFIG_PATH));

        let token_store_path = vars
            .get("TOKEN_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(platform_client::token_store::DEFAULT_TOKEN_FILE));

        let token_store_key = vars
            .get("TOKEN_STORE_KEY")
            .cloned()
            .unwrap_or_else(|| platform_client::token_store::DEFAULT_TOKEN_KEY.to_string());

        let swagger_dir = vars
            .get("SWAGGER_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SWAGGER_DIR));

        let platform_http_timeout_seconds =
            if let Some(value_str) = vars.get("PLATFORM_HTTP_TIMEOUT_SECONDS") {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidHttpTimeout(format!(
                        "PLATFORM_HTTP_TIMEOUT_SECONDS must be a valid integer, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if value == 0 {
                    return Err(ConfigError::InvalidHttpTimeout(
                        "PLATFORM_HTTP_TIMEOUT_SECONDS must be positive".to_string(),
                    ));
                }

                if value > MAX_PLATFORM_HTTP_TIMEOUT_SECONDS {
                    return Err(ConfigError::InvalidHttpTimeout(format!(
                        "PLATFORM_HTTP_TIMEOUT_SECONDS must not exceed {} seconds, got {}",
                        MAX_PLATFORM_HTTP_TIMEOUT_SECONDS, value
                    )));
                }

                value
            } else {
                DEFAULT_PLATFORM_HTTP_TIMEOUT_SECONDS
            };

        Ok(Config {
            bind_address,
            port,
            platform_config_path,
            token_store_path,
            token_store_key,
            swagger_dir,
            platform_http_timeout_seconds,
        })
    }

    /// Resolve the socket address to listen on.
    ///
    /// `BIND_ADDRESS` wins when set. Otherwise a local start listens on
    /// `0.0.0.0:8080` and a hosted start on `[::]:{PORT}`.
    pub fn resolve_bind_address(&self, platform: &PlatformConfig) -> Result<SocketAddr, ConfigError> {
        let address = match (&self.bind_address, platform.local_start, self.port) {
            (Some(explicit), _, _) => explicit.clone(),
            (None, true, _) => LOCAL_BIND_ADDRESS.to_string(),
            (None, false, Some(port)) => format!("[::]:{port}"),
            (None, false, None) => return Err(ConfigError::MissingEnvVar("PORT".to_string())),
        };

        address
            .parse()
            .map_err(|e| ConfigError::InvalidBindAddress(format!("'{}': {}", address, e)))
    }
}

/// Platform settings read from the JSON configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    /// Campus whose courses are managed.
    pub campus_name: String,

    /// Platform domain, e.g. `platform.example.com`.
    pub domain: String,

    /// Listen on `0.0.0.0:8080` instead of `[::]:{PORT}`.
    #[serde(default)]
    pub local_start: bool,
}

impl PlatformConfig {
    /// Read and validate the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read(path).map_err(|e| {
            ConfigError::PlatformConfigIo(format!("{}: {}", path.display(), e))
        })?;

        let config: PlatformConfig = serde_json::from_slice(&data).map_err(|e| {
            ConfigError::InvalidPlatformConfig(format!("{}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to `path` as JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let data = serde_json::to_vec_pretty(self)
            .map_err(|e| ConfigError::InvalidPlatformConfig(e.to_string()))?;

        std::fs::write(path, data)
            .map_err(|e| ConfigError::PlatformConfigIo(format!("{}: {}", path.display(), e)))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.campus_name.trim().is_empty() {
            return Err(ConfigError::InvalidPlatformConfig(
                "campusName must not be empty".to_string(),
            ));
        }

        if self.domain.trim().is_empty() {
            return Err(ConfigError::InvalidPlatformConfig(
                "domain must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

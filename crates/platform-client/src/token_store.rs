//! Durable token persistence.
//!
//! The client loads its bootstrap token from a [`TokenStore`] and writes every
//! refreshed token back, so a restart resumes from the newest token the
//! platform issued.
//!
//! - [`EnvFileTokenStore`] keeps the token in an env-style `KEY=value` file
//! - [`InMemoryTokenStore`] keeps it in memory (tests, ephemeral deployments)

use crate::error::{ClientError, Result};
use crate::secret::{ExposeSecret, SecretString};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, instrument};

/// Default env file holding the token.
pub const DEFAULT_TOKEN_FILE: &str = ".env";

/// Default key the token is stored under.
pub const DEFAULT_TOKEN_KEY: &str = "TOKEN";

/// Key/value persistence for the platform token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the persisted token.
    ///
    /// Returns `Ok(None)` if nothing has been stored yet.
    async fn load(&self) -> Result<Option<SecretString>>;

    /// Persist `token`, replacing any previous value.
    async fn store(&self, token: &SecretString) -> Result<()>;
}

// =============================================================================
// Env file store
// =============================================================================

/// Token store backed by an env-style file.
///
/// Other entries of the file are preserved when the token is written.
#[derive(Debug, Clone)]
pub struct EnvFileTokenStore {
    path: PathBuf,
    key: String,
}

impl EnvFileTokenStore {
    /// Create a store for `path`, using the key `TOKEN`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }

    /// Use a different key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_contents(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::Storage(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }
}

impl Default for EnvFileTokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_FILE)
    }
}

#[async_trait]
impl TokenStore for EnvFileTokenStore {
    #[instrument(skip_all, fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Option<SecretString>> {
        let Some(contents) = self.read_contents().await? else {
            debug!(target: "platform.token_store", "Token file does not exist");
            return Ok(None);
        };

        for entry in dotenvy::from_read_iter(contents.as_slice()) {
            let (key, value) = entry.map_err(|e| {
                ClientError::Storage(format!("failed to parse {}: {e}", self.path.display()))
            })?;
            if key == self.key {
                if value.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(SecretString::from(value)));
            }
        }

        Ok(None)
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    async fn store(&self, token: &SecretString) -> Result<()> {
        let existing = self.read_contents().await?.unwrap_or_default();
        let existing = String::from_utf8_lossy(&existing);

        let entry = format!("{}={}", self.key, token.expose_secret());
        let prefix = format!("{}=", self.key);
        let export_prefix = format!("export {prefix}");

        let mut replaced = false;
        let mut lines: Vec<String> = Vec::new();
        for line in existing.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with(&prefix) || trimmed.starts_with(&export_prefix) {
                if !replaced {
                    lines.push(entry.clone());
                    replaced = true;
                }
            } else {
                lines.push(line.to_string());
            }
        }
        if !replaced {
            lines.push(entry);
        }

        let mut contents = lines.join("\n");
        contents.push('\n');

        // Write-then-rename so a crash never leaves a truncated file
        let mut tmp_name = self.path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        tokio::fs::write(&tmp_path, contents).await.map_err(|e| {
            ClientError::Storage(format!("failed to write {}: {e}", tmp_path.display()))
        })?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            ClientError::Storage(format!("failed to replace {}: {e}", self.path.display()))
        })?;

        debug!(target: "platform.token_store", "Token persisted");
        Ok(())
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Token store that keeps the token in memory.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<SecretString>>,
}

impl InMemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(SecretString::from(token.into()))),
        }
    }

    /// Current value without going through the async trait.
    #[must_use]
    pub fn current(&self) -> Option<SecretString> {
        match self.token.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self) -> Result<Option<SecretString>> {
        Ok(self.current())
    }

    async fn store(&self, token: &SecretString) -> Result<()> {
        match self.token.lock() {
            Ok(mut guard) => *guard = Some(token.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(token.clone()),
        }
        Ok(())
    }
}

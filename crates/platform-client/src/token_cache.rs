//! In-process token cache.
//!
//! A single slot holding the most recently known-good token. The cache is
//! created by the caller and handed to [`crate::PlatformClient`], so tests and
//! multiple clients never share hidden global state.
//!
//! The cache itself does not serialize refreshes. The client holds its own
//! guard across read, expiry check, refresh and write.

use crate::secret::SecretString;
use std::sync::RwLock;

/// Single-slot token cache.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: RwLock<Option<SecretString>>,
}

impl TokenCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache already holding `token`.
    #[must_use]
    pub fn with_token(token: SecretString) -> Self {
        Self {
            slot: RwLock::new(Some(token)),
        }
    }

    /// Get a copy of the cached token, if any.
    ///
    /// The token is cloned so the lock is never held by callers.
    #[must_use]
    pub fn get(&self) -> Option<SecretString> {
        match self.slot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the cached token.
    pub fn set(&self, token: SecretString) {
        match self.slot.write() {
            Ok(mut guard) => *guard = Some(token),
            Err(poisoned) => *poisoned.into_inner() = Some(token),
        }
    }

    /// Whether the cache has ever been populated.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        match self.slot.read() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }
}

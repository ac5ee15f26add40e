//! The credential token adapter.

use std::sync::Arc;

use super::storage::KeyValueStore;
use crate::targets;

/// Storage key of the credential token.
pub const TOKEN_KEY: &str = "@auth_token";

/// Reads and writes the credential token in a [`KeyValueStore`].
///
/// Storage failures never reach the caller: reads degrade to `None` and
/// writes are logged and dropped.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl CredentialStore {
    /// Create an adapter over `storage` using [`TOKEN_KEY`].
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            key: TOKEN_KEY.to_string(),
        }
    }

    /// Use a different storage key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// The storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the token.
    pub async fn get(&self) -> Option<String> {
        match self.storage.get_item(&self.key).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(target: targets::AUTH, key = %self.key, "Failed to read token: {}", e);
                None
            }
        }
    }

    /// Persist the token.
    pub async fn set(&self, token: &str) {
        if let Err(e) = self.storage.set_item(&self.key, token).await {
            tracing::error!(target: targets::AUTH, key = %self.key, "Failed to store token: {}", e);
        }
    }

    /// Delete the token.
    pub async fn remove(&self) {
        match self.storage.remove_item(&self.key).await {
            Ok(()) => tracing::debug!(target: targets::AUTH, key = %self.key, "Removed token"),
            Err(e) => {
                tracing::error!(target: targets::AUTH, key = %self.key, "Failed to remove token: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

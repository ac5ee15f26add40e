//! Key-value store backends.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{RequestError, Result};
use crate::targets;

/// An async string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Deleting a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<()>;
}

/// An in-process store.
///
/// Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// A store kept as a flat JSON object in a file.
///
/// A missing file reads as an empty store. Every write replaces the file
/// atomically through a temporary file in the same directory.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl JsonFileStore {
    /// Create a store backed by the file at `path`.
    ///
    /// The file is not touched until the first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, e: impl std::fmt::Display) -> RequestError {
        RequestError::Storage(format!("{}: {e}", self.path.display()))
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.storage_error(e)),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| self.storage_error(e))
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(entries).map_err(|e| self.storage_error(e))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.storage_error(e))?;
        }

        let mut temp_name = self.path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = self.path.with_file_name(temp_name);

        tokio::fs::write(&temp_path, content)
            .await
            .map_err(|e| self.storage_error(e))?;
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(self.storage_error(e));
        }

        tracing::trace!(target: targets::AUTH, path = %self.path.display(), "Wrote key-value store");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("k").await.unwrap(), None);

        store.set_item("k", "v").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(store.len(), 1);

        store.remove_item("k").await.unwrap();
        store.remove_item("k").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set_item("k", "v").await.unwrap();
        assert_eq!(other.get_item("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let store = JsonFileStore::new(&path);

        assert_eq!(store.get_item("@auth_token").await.unwrap(), None);
        assert!(!path.exists());

        store.set_item("@auth_token", "abc").await.unwrap();
        store.set_item("other", "1").await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(
            reopened.get_item("@auth_token").await.unwrap(),
            Some("abc".to_string())
        );

        reopened.remove_item("@auth_token").await.unwrap();
        assert_eq!(store.get_item("@auth_token").await.unwrap(), None);
        assert_eq!(store.get_item("other").await.unwrap(), Some("1".to_string()));
        assert!(!dir.path().join("nested").join("store.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_json_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.get_item("k").await.unwrap_err();
        assert!(matches!(err, RequestError::Storage(_)));
    }
}

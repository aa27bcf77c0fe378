//! Persisted preference module for the publish intake
//!
//! This module provides a small key-value store for boolean UI preferences
//! that must survive process restarts, such as the user's choice to
//! optimize video uploads. Writes are last-write-wins.

use crate::error::{PreferenceError, PreferenceResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Storage key for the "optimize and transcode video" checkbox
pub const USER_OPTIMIZE_KEY: &str = "publish-file-user-optimize";

/// Scoped key-value store for boolean preferences
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Get a boolean by key, `None` when it was never set
    async fn get_bool(&self, key: &str) -> PreferenceResult<Option<bool>>;

    /// Set a boolean under a key
    async fn set_bool(&self, key: &str, value: bool) -> PreferenceResult<()>;
}

/// Preference store backed by a JSON object on disk
pub struct FilePreferenceStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FilePreferenceStore {
    /// Open a store at the given path. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("Preference store opened at: {}", path.display());
        FilePreferenceStore {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> PreferenceResult<Map<String, Value>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Map::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn get_bool(&self, key: &str) -> PreferenceResult<Option<bool>> {
        let _guard = self.lock.lock().await;
        let values = self.load().await?;

        match values.get(key) {
            None => Ok(None),
            Some(Value::Bool(value)) => Ok(Some(*value)),
            Some(_) => Err(PreferenceError::NotABoolean {
                key: key.to_string(),
            }),
        }
    }

    async fn set_bool(&self, key: &str, value: bool) -> PreferenceResult<()> {
        let _guard = self.lock.lock().await;
        let mut values = self.load().await?;
        values.insert(key.to_string(), Value::Bool(value));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(&values)?;
        tokio::fs::write(&self.path, bytes).await?;
        debug!("Preference {} set to {}", key, value);
        Ok(())
    }
}

/// In-process preference store, lost when the process exits
#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, bool>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get_bool(&self, key: &str) -> PreferenceResult<Option<bool>> {
        Ok(self.values.lock().await.get(key).copied())
    }

    async fn set_bool(&self, key: &str, value: bool) -> PreferenceResult<()> {
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Read a boolean preference, falling back to `default` when unset
pub async fn get_or(store: &dyn PreferenceStore, key: &str, default: bool) -> PreferenceResult<bool> {
    Ok(store.get_bool(key).await?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_set_get() -> PreferenceResult<()> {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.get_bool(USER_OPTIMIZE_KEY).await?, None);

        store.set_bool(USER_OPTIMIZE_KEY, true).await?;
        assert_eq!(store.get_bool(USER_OPTIMIZE_KEY).await?, Some(true));

        // Last write wins
        store.set_bool(USER_OPTIMIZE_KEY, false).await?;
        assert_eq!(store.get_bool(USER_OPTIMIZE_KEY).await?, Some(false));
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_missing_file_reads_empty() -> PreferenceResult<()> {
        let dir = tempfile::tempdir()?;
        let store = FilePreferenceStore::new(dir.path().join("prefs.json"));
        assert_eq!(store.get_bool(USER_OPTIMIZE_KEY).await?, None);
        assert!(!get_or(&store, USER_OPTIMIZE_KEY, false).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_keeps_other_keys() -> PreferenceResult<()> {
        let dir = tempfile::tempdir()?;
        let store = FilePreferenceStore::new(dir.path().join("nested/prefs.json"));

        store.set_bool("other", true).await?;
        store.set_bool(USER_OPTIMIZE_KEY, true).await?;

        assert_eq!(store.get_bool("other").await?, Some(true));
        assert_eq!(store.get_bool(USER_OPTIMIZE_KEY).await?, Some(true));
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_rejects_non_boolean() -> PreferenceResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"publish-file-user-optimize": "yes"}"#)?;

        let store = FilePreferenceStore::new(&path);
        assert!(matches!(
            store.get_bool(USER_OPTIMIZE_KEY).await,
            Err(PreferenceError::NotABoolean { .. })
        ));
        Ok(())
    }
}

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("corrupt store file {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Flat string-to-string store, the shape of browser local storage.
///
/// No multi-key atomicity: callers do read-modify-write and the last write wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

/// Whole store kept as one JSON object on disk.
///
/// Every write rewrites the file through a sibling temp file and a rename.
/// Separate processes sharing the file are not coordinated.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(source) => {
                    let err = StorageError::Corrupt {
                        path: path.display().to_string(),
                        source,
                    };
                    error!("{}; starting from an empty store", err);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(StorageError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        info!(path = %path.display(), keys = entries.len(), "store opened");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(entries).map_err(|source| StorageError::Encode {
            key: self.path.display().to_string(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        next.insert(key.to_string(), value);
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.lock().await.keys().cloned().collect())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    pub total_keys: usize,
    pub total_bytes: usize,
}

/// Typed JSON access over a [`KeyValueStore`].
///
/// Reads never fail: a missing key, a backend error or a blob that no longer
/// decodes is logged and the caller's default comes back.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.try_get(key).await.unwrap_or(default)
    }

    pub async fn try_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get_raw(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!(key, "failed to read: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(key, "failed to decode: {}", e);
                None
            }
        }
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backend.set_raw(key, raw).await.map_err(|e| {
            error!(key, "failed to write: {}", e);
            e
        })?;
        debug!(key, "stored");
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(key).await?;
        debug!(key, "removed");
        Ok(())
    }

    pub async fn exists(&self, key: &str) -> bool {
        matches!(self.backend.get_raw(key).await, Ok(Some(_)))
    }

    pub async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .backend
            .keys()
            .await?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }

    pub async fn remove_prefix(&self, prefix: &str) -> Result<usize, StorageError> {
        let keys = self.keys_with_prefix(prefix).await?;
        for key in &keys {
            self.backend.remove(key).await?;
        }
        Ok(keys.len())
    }

    /// Every key with its decoded JSON value. Undecodable blobs are skipped.
    pub async fn export(&self) -> Result<BTreeMap<String, serde_json::Value>, StorageError> {
        let mut out = BTreeMap::new();
        for key in self.backend.keys().await? {
            if let Some(value) = self.try_get::<serde_json::Value>(&key).await {
                out.insert(key, value);
            }
        }
        Ok(out)
    }

    pub async fn import(&self, data: &BTreeMap<String, serde_json::Value>) -> Result<usize, StorageError> {
        for (key, value) in data {
            self.set(key, value).await?;
        }
        info!(keys = data.len(), "store imported");
        Ok(data.len())
    }

    pub async fn clear(&self) -> Result<usize, StorageError> {
        self.remove_prefix("").await
    }

    pub async fn stats(&self) -> Result<StorageStats, StorageError> {
        let mut stats = StorageStats::default();
        for key in self.backend.keys().await? {
            if let Some(raw) = self.backend.get_raw(&key).await? {
                stats.total_keys += 1;
                stats.total_bytes += key.len() + raw.len();
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Blob {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn get_returns_default_for_missing_key() {
        let storage = Storage::in_memory();
        let value: Vec<String> = storage.get("clients", vec!["x".to_string()]).await;
        assert_eq!(value, vec!["x".to_string()]);
        assert!(!storage.exists("clients").await);
    }

    #[tokio::test]
    async fn set_then_get_round_trips_json() {
        let storage = Storage::in_memory();
        let blob = Blob {
            name: "ipê".to_string(),
            count: 3,
        };
        storage.set("blob", &blob).await.unwrap();
        assert!(storage.exists("blob").await);
        assert_eq!(storage.try_get::<Blob>("blob").await, Some(blob));
    }

    #[tokio::test]
    async fn undecodable_blob_falls_back_to_default() {
        let backend = Arc::new(MemoryStore::new());
        backend.set_raw("blob", "{not json".to_string()).await.unwrap();
        let storage = Storage::new(backend);
        let value = storage.get("blob", 7u32).await;
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let storage = Storage::in_memory();
        storage.set("k", &1).await.unwrap();
        storage.set("k", &2).await.unwrap();
        assert_eq!(storage.get("k", 0).await, 2);
    }

    #[tokio::test]
    async fn remove_prefix_only_touches_family() {
        let storage = Storage::in_memory();
        storage.set("quotes_a", &1).await.unwrap();
        storage.set("quotes_b", &2).await.unwrap();
        storage.set("species", &3).await.unwrap();
        assert_eq!(storage.remove_prefix("quotes_").await.unwrap(), 2);
        assert!(storage.exists("species").await);
        assert!(!storage.exists("quotes_a").await);
    }

    #[tokio::test]
    async fn export_import_moves_everything() {
        let source = Storage::in_memory();
        source.set("a", &vec![1, 2]).await.unwrap();
        source.set("b", &"x").await.unwrap();
        let dump = source.export().await.unwrap();

        let target = Storage::in_memory();
        assert_eq!(target.import(&dump).await.unwrap(), 2);
        assert_eq!(target.get::<Vec<i32>>("a", vec![]).await, vec![1, 2]);
        assert_eq!(target.stats().await.unwrap().total_keys, 2);
    }

    #[tokio::test]
    async fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let storage = Storage::new(Arc::new(JsonFileStore::open(&path).await.unwrap()));
        storage.set("species", &vec!["Cedro"]).await.unwrap();
        drop(storage);

        let reopened = Storage::new(Arc::new(JsonFileStore::open(&path).await.unwrap()));
        assert_eq!(
            reopened.get::<Vec<String>>("species", vec![]).await,
            vec!["Cedro".to_string()]
        );
    }

    #[tokio::test]
    async fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, "][").await.unwrap();
        let store = JsonFileStore::open(&path).await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        store.set_raw("species", "[]".to_string()).await.unwrap();

        // A directory in the file's place makes the rename fail.
        tokio::fs::remove_file(&path).await.unwrap();
        tokio::fs::create_dir(&path).await.unwrap();

        assert!(store.set_raw("clients", "[]".to_string()).await.is_err());
        assert_eq!(store.get_raw("clients").await.unwrap(), None);
        assert!(store.remove("species").await.is_err());
        assert_eq!(store.get_raw("species").await.unwrap(), Some("[]".to_string()));
    }
}

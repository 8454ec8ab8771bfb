//! File-backed store: a single JSON object on disk.

use crate::{CredentialStore, StorageError, StorageResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Durable credential store backed by a JSON-object file.
///
/// Entries survive process restart. All operations take an internal lock:
/// writes rewrite the file in place, so an unguarded read racing a write
/// could observe a truncated file.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by the given file. The file is created on
    /// first write; a missing file reads as empty.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn read_entries(&self) -> StorageResult<Map<String, Value>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StorageError::Encoding(
                "Credentials file is not a JSON object".to_string(),
            )),
            Err(e) => Err(StorageError::Encoding(e.to_string())),
        }
    }

    async fn write_entries(&self, entries: &Map<String, Value>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(&Value::Object(entries.clone()))
            .map_err(|e| StorageError::Encoding(e.to_string()))?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.write_entries(&entries).await
    }

    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().await;
        let entries = self.read_entries().await?;
        match entries.get(key) {
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(StorageError::Encoding(format!(
                "Entry for {} is not a string",
                key
            ))),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        let existed = entries.remove(key).is_some();
        if existed {
            self.write_entries(&entries).await?;
        }
        Ok(existed)
    }
}

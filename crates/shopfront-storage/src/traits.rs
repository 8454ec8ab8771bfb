//! Storage trait definitions.

use crate::StorageResult;
use async_trait::async_trait;

/// Trait for durable credential storage backends.
///
/// All operations may suspend on I/O. Implementations must be safe to
/// share across tasks.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Store a value
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieve a value
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Delete a value. Returns whether the key existed.
    async fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Check if a key exists
    async fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

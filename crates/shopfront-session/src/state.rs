//! In-memory session authority, synchronized with the credential store.

use crate::AuthUser;
use shopfront_storage::{CredentialStore, StorageKeys, StorageResult};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Shared handle to the process-wide session state.
pub type SessionHandle = Arc<SessionState>;

#[derive(Default)]
struct Cache {
    token: Option<String>,
    user: Option<AuthUser>,
}

/// Single in-memory authority for the current login.
///
/// Token and user are always set and cleared together under one lock;
/// observers can never see one without the other. Racing `save`/`clear`
/// calls resolve last-writer-wins.
pub struct SessionState {
    store: Arc<dyn CredentialStore>,
    cache: Mutex<Cache>,
}

impl SessionState {
    /// Create a session backed by the given credential store.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            cache: Mutex::new(Cache::default()),
        }
    }

    /// Create a shared handle directly.
    pub fn handle(store: Arc<dyn CredentialStore>) -> SessionHandle {
        Arc::new(Self::new(store))
    }

    /// Restore the session from the credential store.
    ///
    /// Returns `true` when both entries are present and the stored user
    /// parses. Storage read failures are treated as "absent", never
    /// surfaced. A partial session (exactly one entry, or an unparseable
    /// user) reads as no session and the leftover entries are removed
    /// best-effort so a later call cannot observe a half-written state.
    ///
    /// Idempotent; intended to run once at startup.
    pub async fn initialize(&self) -> bool {
        let (token, user_json) = tokio::join!(
            self.read_entry(StorageKeys::AUTH_TOKEN),
            self.read_entry(StorageKeys::AUTH_USER),
        );

        match (token, user_json) {
            (Some(token), Some(user_json)) => {
                match serde_json::from_str::<AuthUser>(&user_json) {
                    Ok(user) => {
                        let mut cache = self.cache.lock().unwrap();
                        cache.token = Some(token);
                        cache.user = Some(user);
                        debug!("Session restored from credential store");
                        true
                    }
                    Err(e) => {
                        warn!("Stored user is unreadable, discarding session: {}", e);
                        self.delete_entries().await;
                        false
                    }
                }
            }
            (None, None) => false,
            _ => {
                warn!("Partial credentials found, discarding session");
                self.delete_entries().await;
                false
            }
        }
    }

    /// The in-memory cached user. No I/O; absent before `initialize`
    /// completes or after `clear`.
    pub fn current_user(&self) -> Option<AuthUser> {
        self.cache.lock().unwrap().user.clone()
    }

    /// The current bearer token.
    ///
    /// Returns the cached token when present; otherwise falls back to a
    /// lazy store read. The lazy path restores the whole session only
    /// when both entries are intact — a stored token without a matching
    /// user is returned to the caller but never cached, so the cache
    /// cannot hold a token without a user.
    pub async fn token(&self) -> Option<String> {
        if let Some(token) = self.cache.lock().unwrap().token.clone() {
            return Some(token);
        }

        let token = self.read_entry(StorageKeys::AUTH_TOKEN).await?;

        if let Some(user) = self
            .read_entry(StorageKeys::AUTH_USER)
            .await
            .and_then(|json| serde_json::from_str::<AuthUser>(&json).ok())
        {
            let mut cache = self.cache.lock().unwrap();
            cache.token = Some(token.clone());
            cache.user = Some(user);
        }

        Some(token)
    }

    /// Whether a full session (token and user) is cached.
    pub fn is_authenticated(&self) -> bool {
        let cache = self.cache.lock().unwrap();
        cache.token.is_some() && cache.user.is_some()
    }

    /// Install a new session and persist it.
    ///
    /// The in-memory fields are set first and stay set even when
    /// persistence fails: the running process keeps its session, only the
    /// next restart will miss it. Persistence failure propagates.
    pub async fn save(&self, token: &str, user: &AuthUser) -> StorageResult<()> {
        {
            let mut cache = self.cache.lock().unwrap();
            cache.token = Some(token.to_string());
            cache.user = Some(user.clone());
        }

        let user_json = serde_json::to_string(user)
            .map_err(|e| shopfront_storage::StorageError::Encoding(e.to_string()))?;

        tokio::try_join!(
            self.store.set(StorageKeys::AUTH_TOKEN, token),
            self.store.set(StorageKeys::AUTH_USER, &user_json),
        )?;
        Ok(())
    }

    /// Drop the session.
    ///
    /// The in-memory fields are cleared unconditionally; store deletions
    /// are best-effort and only logged.
    pub async fn clear(&self) {
        {
            let mut cache = self.cache.lock().unwrap();
            cache.token = None;
            cache.user = None;
        }
        self.delete_entries().await;
    }

    async fn read_entry(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {} from credential store: {}", key, e);
                None
            }
        }
    }

    async fn delete_entries(&self) {
        let (token, user) = tokio::join!(
            self.store.delete(StorageKeys::AUTH_TOKEN),
            self.store.delete(StorageKeys::AUTH_USER),
        );
        if let Err(e) = token {
            warn!("Failed to delete stored token: {}", e);
        }
        if let Err(e) = user {
            warn!("Failed to delete stored user: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OAuthProvider;
    use async_trait::async_trait;
    use shopfront_storage::{MemoryStore, StorageError};

    fn sample_user() -> AuthUser {
        AuthUser {
            id: 1,
            username: "u".to_string(),
            email: Some("u@example.com".to_string()),
            avatar_url: None,
            oauth_provider: Some(OAuthProvider::Email),
            openid: None,
        }
    }

    /// Store double whose operations can be made to fail.
    struct FlakyStore {
        inner: MemoryStore,
        fail_reads: bool,
        fail_writes: bool,
        fail_deletes: bool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                fail_reads: false,
                fail_writes: false,
                fail_deletes: false,
            }
        }
    }

    #[async_trait]
    impl CredentialStore for FlakyStore {
        async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            if self.fail_writes {
                return Err(StorageError::Backend("write failed".to_string()));
            }
            self.inner.set(key, value).await
        }

        async fn get(&self, key: &str) -> StorageResult<Option<String>> {
            if self.fail_reads {
                return Err(StorageError::Backend("read failed".to_string()));
            }
            self.inner.get(key).await
        }

        async fn delete(&self, key: &str) -> StorageResult<bool> {
            if self.fail_deletes {
                return Err(StorageError::Backend("delete failed".to_string()));
            }
            self.inner.delete(key).await
        }
    }

    #[tokio::test]
    async fn test_initialize_empty_store() {
        let session = SessionState::new(Arc::new(MemoryStore::new()));

        assert!(!session.initialize().await);
        assert!(session.current_user().is_none());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_initialize_restores_session() {
        let store = Arc::new(MemoryStore::new());
        store.set(StorageKeys::AUTH_TOKEN, "tok").await.unwrap();
        store
            .set(StorageKeys::AUTH_USER, r#"{"id":1,"username":"u"}"#)
            .await
            .unwrap();

        let session = SessionState::new(store);
        assert!(session.initialize().await);
        assert_eq!(session.current_user().unwrap().username, "u");
        assert_eq!(session.token().await.as_deref(), Some("tok"));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_initialize_idempotent() {
        let store = Arc::new(MemoryStore::new());
        store.set(StorageKeys::AUTH_TOKEN, "tok").await.unwrap();
        store
            .set(StorageKeys::AUTH_USER, r#"{"id":1,"username":"u"}"#)
            .await
            .unwrap();

        let session = SessionState::new(store);
        assert!(session.initialize().await);
        assert!(session.initialize().await);
        assert_eq!(session.current_user().unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_initialize_read_failure_is_false_not_error() {
        let mut store = FlakyStore::new();
        store.fail_reads = true;

        let session = SessionState::new(Arc::new(store));
        assert!(!session.initialize().await);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_initialize_partial_state_self_heals() {
        let store = Arc::new(MemoryStore::new());
        store.set(StorageKeys::AUTH_TOKEN, "orphan").await.unwrap();

        let session = SessionState::new(store.clone());
        assert!(!session.initialize().await);

        // Stray entry removed so a later initialize starts clean
        assert_eq!(store.get(StorageKeys::AUTH_TOKEN).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_initialize_corrupt_user_discards_session() {
        let store = Arc::new(MemoryStore::new());
        store.set(StorageKeys::AUTH_TOKEN, "tok").await.unwrap();
        store
            .set(StorageKeys::AUTH_USER, "not json")
            .await
            .unwrap();

        let session = SessionState::new(store.clone());
        assert!(!session.initialize().await);
        assert!(session.current_user().is_none());
        assert_eq!(store.get(StorageKeys::AUTH_TOKEN).await.unwrap(), None);
        assert_eq!(store.get(StorageKeys::AUTH_USER).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_fresh_initialize_roundtrip() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let user = sample_user();

        let session = SessionState::new(store.clone());
        session.save("tok", &user).await.unwrap();

        // Simulated restart: new state over the same store
        let restored = SessionState::new(store);
        assert!(restored.initialize().await);
        assert_eq!(restored.current_user().unwrap(), user);
        assert_eq!(restored.token().await.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_save_failure_keeps_in_memory_session() {
        let mut store = FlakyStore::new();
        store.fail_writes = true;

        let session = SessionState::new(Arc::new(store));
        let result = session.save("tok", &sample_user()).await;

        assert!(result.is_err());
        // In-memory state is authoritative for the running process
        assert!(session.is_authenticated());
        assert_eq!(session.current_user().unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_clear_is_best_effort() {
        let store = Arc::new(MemoryStore::new());
        let session = SessionState::new(store.clone());
        session.save("tok", &sample_user()).await.unwrap();

        session.clear().await;

        assert!(!session.is_authenticated());
        assert!(session.current_user().is_none());
        assert_eq!(store.get(StorageKeys::AUTH_TOKEN).await.unwrap(), None);
        assert_eq!(store.get(StorageKeys::AUTH_USER).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_swallows_delete_failure() {
        let mut store = FlakyStore::new();
        store.fail_deletes = true;
        let store = Arc::new(store);

        let session = SessionState::new(store);
        session.save("tok", &sample_user()).await.unwrap();

        // Does not propagate the delete failure
        session.clear().await;
        assert!(!session.is_authenticated());
        assert!(session.token().await.is_some(), "store still holds the token");
    }

    #[tokio::test]
    async fn test_lazy_token_restores_full_session() {
        let store = Arc::new(MemoryStore::new());
        store.set(StorageKeys::AUTH_TOKEN, "tok").await.unwrap();
        store
            .set(StorageKeys::AUTH_USER, r#"{"id":3,"username":"lazy"}"#)
            .await
            .unwrap();

        // No initialize() call before the token is first needed
        let session = SessionState::new(store);
        assert_eq!(session.token().await.as_deref(), Some("tok"));
        assert!(session.is_authenticated());
        assert_eq!(session.current_user().unwrap().username, "lazy");
    }

    #[tokio::test]
    async fn test_lazy_token_without_user_never_caches() {
        let store = Arc::new(MemoryStore::new());
        store.set(StorageKeys::AUTH_TOKEN, "orphan").await.unwrap();

        let session = SessionState::new(store);
        assert_eq!(session.token().await.as_deref(), Some("orphan"));

        // Token alone must not enter the cache
        assert!(!session.is_authenticated());
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_token_and_user_always_set_together() {
        let session = SessionState::new(Arc::new(MemoryStore::new()));
        let user = sample_user();

        assert!(!session.is_authenticated());

        session.save("tok", &user).await.unwrap();
        assert!(session.is_authenticated());
        assert!(session.current_user().is_some());
        assert!(session.token().await.is_some());

        session.clear().await;
        assert!(!session.is_authenticated());
        assert!(session.current_user().is_none());
        assert!(session.token().await.is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_session() {
        let session = SessionState::new(Arc::new(MemoryStore::new()));

        session.save("tok1", &sample_user()).await.unwrap();

        let other = AuthUser {
            id: 2,
            username: "other".to_string(),
            email: None,
            avatar_url: None,
            oauth_provider: Some(OAuthProvider::Google),
            openid: None,
        };
        session.save("tok2", &other).await.unwrap();

        assert_eq!(session.token().await.as_deref(), Some("tok2"));
        assert_eq!(session.current_user().unwrap().username, "other");
    }
}

//! Shared helpers for API integration tests.

use shopfront_api::ApiClient;
use shopfront_core::Config;
use shopfront_session::{AuthUser, SessionState};
use shopfront_storage::{CredentialStore, MemoryStore, StorageKeys};
use std::sync::Arc;

/// Build a client against the given server URL, backed by a fresh
/// in-memory store. The store is returned so tests can inspect it.
pub fn client_with_store(server_url: &str) -> (ApiClient, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let session = SessionState::handle(store.clone());

    let mut config = Config::default();
    config.server_url = server_url.to_string();

    let client = ApiClient::new(&config, session).expect("client construction");
    (client, store)
}

/// Seed the store with a valid session and restore it into the client.
#[allow(dead_code)]
pub async fn sign_in(client: &ApiClient, store: &MemoryStore, token: &str) {
    store.set(StorageKeys::AUTH_TOKEN, token).await.unwrap();
    store
        .set(StorageKeys::AUTH_USER, r#"{"id":1,"username":"u"}"#)
        .await
        .unwrap();
    assert!(client.session().initialize().await);
}

#[allow(dead_code)]
pub fn sample_user() -> AuthUser {
    serde_json::from_str(r#"{"id":1,"username":"u","email":"u@example.com"}"#).unwrap()
}

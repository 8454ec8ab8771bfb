//! Shared HTTP client with the auth interceptor semantics.

use crate::{AuthError, AuthResult};
use serde::Deserialize;
use shopfront_core::Config;
use shopfront_session::SessionHandle;
use std::time::Duration;
use tracing::{debug, warn};

/// Error body shape the backend uses: `{"message": ...}` or `{"error": ...}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Shared API client.
///
/// Built exactly once per process from the config; both interceptor
/// phases live on the single dispatch path below, so there is no separate
/// registration step that could run twice. Cloning shares the underlying
/// connection pool and session handle.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionHandle,
}

impl ApiClient {
    /// Create the client from configuration.
    ///
    /// The request timeout is fixed at the client level; individual calls
    /// do not override it.
    pub fn new(config: &Config, session: SessionHandle) -> AuthResult<Self> {
        let base_url = config
            .server_url()
            .map_err(|e| AuthError::Config(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            session,
        })
    }

    /// The configured backend base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle to the session this client reads tokens from and clears
    /// on invalidation.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub(crate) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.get(format!("{}{}", self.base_url, path))
    }

    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.post(format!("{}{}", self.base_url, path))
    }

    pub(crate) fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.delete(format!("{}{}", self.base_url, path))
    }

    /// Send a request through both interceptor phases.
    ///
    /// Request phase: the current token (a lazy session lookup that may
    /// suspend) is attached as `Authorization: Bearer <token>` when
    /// present. Each call looks the token up independently; in-flight
    /// requests do not serialize on each other.
    ///
    /// Response phase: a `401` clears the session before the error is
    /// surfaced — the caller still sees the original failure. Error
    /// bodies are reduced to their `message`/`error` string, falling back
    /// to `fallback`.
    pub(crate) async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        fallback: &str,
    ) -> AuthResult<reqwest::Response> {
        let request = match self.session.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            warn!("Backend returned 401, clearing local session");
            self.session.clear().await;
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message.or(body.error))
            .unwrap_or_else(|| fallback.to_string());

        debug!(status = %status, message = %message, "Request rejected by backend");

        Err(AuthError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_session::SessionState;
    use shopfront_storage::MemoryStore;
    use std::sync::Arc;

    fn test_client(server_url: &str) -> ApiClient {
        let mut config = Config::default();
        config.server_url = server_url.to_string();
        let session = SessionState::handle(Arc::new(MemoryStore::new()));
        ApiClient::new(&config, session).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = test_client("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = Config::default();
        config.server_url = "not a url".to_string();
        let session = SessionState::handle(Arc::new(MemoryStore::new()));

        let result = ApiClient::new(&config, session);
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn test_clone_shares_session() {
        let client = test_client("http://localhost:8080");
        let cloned = client.clone();
        assert!(Arc::ptr_eq(client.session(), cloned.session()));
    }
}

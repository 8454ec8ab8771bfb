//! Auth operations against the backend.
//!
//! Each operation is a stateless call over the shared client and the
//! session: the network round trip first, then (where applicable) the
//! session update. OAuth sign-in uses mock authorization codes; real
//! deployments swap in provider SDK output without touching anything
//! else here.

use crate::{ApiClient, AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use shopfront_session::AuthUser;
use tracing::info;

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Email/password sign-in request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// Token + user pair returned by every successful auth endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

/// Process-unique opaque code standing in for a real OAuth SDK result.
fn mock_authorization_code(provider: &str) -> String {
    format!(
        "mock_{}_code_{}",
        provider,
        chrono::Utc::now().timestamp_millis()
    )
}

impl ApiClient {
    /// Register a new account and install the returned session.
    pub async fn register(&self, payload: &RegisterPayload) -> AuthResult<AuthResponse> {
        let response = self
            .execute(
                self.post("/auth/register").json(payload),
                "Unable to create your account",
            )
            .await?;

        let auth: AuthResponse = response.json().await?;
        self.session().save(&auth.token, &auth.user).await?;

        info!(user_id = auth.user.id, "Registered new account");
        Ok(auth)
    }

    /// Email/password sign-in.
    ///
    /// The backend does not expose a login endpoint in this version, so
    /// this fails unconditionally and leaves the session untouched.
    pub async fn login(&self, _payload: &LoginPayload) -> AuthResult<AuthResponse> {
        Err(AuthError::LoginNotAvailable)
    }

    /// Exchange a (mock) Google authorization code for a token + user.
    ///
    /// Does not persist: callers pass the result to
    /// [`ApiClient::sign_in_with_oauth`].
    pub async fn sign_in_with_google(&self) -> AuthResult<AuthResponse> {
        let body = serde_json::json!({
            "code": mock_authorization_code("google"),
            "redirect_uri": format!("{}/auth/google/callback", self.base_url()),
        });

        let response = self
            .execute(
                self.post("/auth/google/token").json(&body),
                "Unable to sign in with Google",
            )
            .await?;

        Ok(response.json().await?)
    }

    /// Exchange a (mock) WeChat authorization code for a token + user.
    ///
    /// Does not persist: callers pass the result to
    /// [`ApiClient::sign_in_with_oauth`].
    pub async fn sign_in_with_wechat(&self) -> AuthResult<AuthResponse> {
        let body = serde_json::json!({
            "code": mock_authorization_code("wechat"),
        });

        let response = self
            .execute(
                self.post("/auth/wechat/mini-program").json(&body),
                "Unable to sign in with WeChat",
            )
            .await?;

        Ok(response.json().await?)
    }

    /// Install an already-obtained OAuth session. Pure persistence, no
    /// network call.
    pub async fn sign_in_with_oauth(&self, token: &str, user: &AuthUser) -> AuthResult<()> {
        self.session().save(token, user).await?;
        Ok(())
    }

    /// Drop the current session. Best-effort; never fails.
    pub async fn logout(&self) {
        self.session().clear().await;
        info!("Logged out");
    }

    /// Whether Google sign-in can be offered. Always true in mock mode.
    pub fn is_google_available(&self) -> bool {
        true
    }

    /// Whether WeChat sign-in can be offered. Always true in mock mode.
    pub fn is_wechat_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_code_shape() {
        let code = mock_authorization_code("google");
        assert!(code.starts_with("mock_google_code_"));

        let suffix = code.strip_prefix("mock_google_code_").unwrap();
        assert!(suffix.parse::<i64>().is_ok());
    }

    #[test]
    fn test_register_payload_omits_absent_username() {
        let payload = RegisterPayload {
            email: "a@b.com".to_string(),
            password: "x".to_string(),
            username: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("username"));
    }
}

//! Observable auth state for the presentation layer.

use crate::{ApiClient, AuthResult, LoginPayload, RegisterPayload};
use shopfront_session::AuthUser;
use tokio::sync::watch;
use tracing::debug;

/// Point-in-time view of the auth state.
#[derive(Debug, Clone, Default)]
pub struct AuthSnapshot {
    /// Current user, when signed in.
    pub user: Option<AuthUser>,
    /// An operation (or startup restore) is in flight.
    pub is_loading: bool,
    /// Last operation's failure message, until cleared.
    pub error: Option<String>,
}

impl AuthSnapshot {
    /// Derived flag: a user is present.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Reactive binder between the session core and the UI layer.
///
/// Mirrors every auth operation's outcome into a watched [`AuthSnapshot`]
/// and still returns the error to the imperative caller, so both a
/// subscribed view and the triggering screen can react.
pub struct AuthContext {
    client: ApiClient,
    state: watch::Sender<AuthSnapshot>,
}

impl AuthContext {
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(AuthSnapshot::default());
        Self { client, state }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    /// Current state, for point reads.
    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    /// The client this context drives.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Restore a persisted session, once, at mount.
    ///
    /// Never fails: an unreadable or absent session simply leaves the
    /// state signed out.
    pub async fn initialize(&self) {
        self.state.send_modify(|s| s.is_loading = true);

        let restored = self.client.session().initialize().await;
        let user = if restored {
            self.client.session().current_user()
        } else {
            None
        };

        debug!(restored, "Auth context initialized");
        self.state.send_modify(|s| {
            s.user = user;
            s.is_loading = false;
        });
    }

    /// Register a new account.
    pub async fn register(&self, payload: RegisterPayload) -> AuthResult<()> {
        self.begin();
        let result = self.client.register(&payload).await.map(|r| r.user);
        self.finish(result)
    }

    /// Email/password sign-in (fails until the backend offers it).
    pub async fn login(&self, payload: LoginPayload) -> AuthResult<()> {
        self.begin();
        let result = self.client.login(&payload).await.map(|r| r.user);
        self.finish(result)
    }

    /// Google OAuth sign-in: exchange, then persist.
    pub async fn login_with_google(&self) -> AuthResult<()> {
        self.begin();
        let result = async {
            let auth = self.client.sign_in_with_google().await?;
            self.client
                .sign_in_with_oauth(&auth.token, &auth.user)
                .await?;
            Ok(auth.user)
        }
        .await;
        self.finish(result)
    }

    /// WeChat OAuth sign-in: exchange, then persist.
    pub async fn login_with_wechat(&self) -> AuthResult<()> {
        self.begin();
        let result = async {
            let auth = self.client.sign_in_with_wechat().await?;
            self.client
                .sign_in_with_oauth(&auth.token, &auth.user)
                .await?;
            Ok(auth.user)
        }
        .await;
        self.finish(result)
    }

    /// Sign out. Best-effort; the state always ends signed out.
    pub async fn logout(&self) {
        self.begin();
        self.client.logout().await;
        self.state.send_modify(|s| {
            s.user = None;
            s.is_loading = false;
        });
    }

    /// Reset the error field. No other side effect.
    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }

    fn begin(&self) {
        self.state.send_modify(|s| {
            s.error = None;
            s.is_loading = true;
        });
    }

    /// Publish an operation's outcome; loading is reset on every path and
    /// the error, if any, is both recorded and handed back.
    fn finish(&self, result: AuthResult<AuthUser>) -> AuthResult<()> {
        match result {
            Ok(user) => {
                self.state.send_modify(|s| {
                    s.user = Some(user);
                    s.error = None;
                    s.is_loading = false;
                });
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.state.send_modify(|s| {
                    s.error = Some(message);
                    s.is_loading = false;
                });
                Err(e)
            }
        }
    }
}

//! Error types for API operations.

use shopfront_storage::StorageError;
use thiserror::Error;

/// Error type for auth and payment operations.
///
/// Every operation surfaces a user-facing message: backend error bodies
/// are translated here, at one boundary, and raw transport errors never
/// reach the UI layer untyped.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The backend rejected the request; message comes from its error body
    /// or a per-operation fallback.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// Email/password sign-in is not offered by this backend version.
    #[error("Unable to sign in at this time. Please create a new account.")]
    LoginNotAvailable,

    /// The operation requires an authenticated session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The backend answered with a body we could not interpret.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client configuration problem (e.g. malformed base URL).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-level failure.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Credential store failure while persisting a session.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// HTTP status of a backend rejection, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for API operations.
pub type AuthResult<T> = Result<T, AuthError>;

//! Session state for the Shopfront client.
//!
//! This crate owns "who is logged in": an in-memory token/user pair kept
//! in sync with the durable credential store. It is constructed once at
//! application start and handed by [`SessionHandle`] to the HTTP client
//! and the reactive auth context.

mod state;
mod user;

pub use state::{SessionHandle, SessionState};
pub use user::{AuthUser, OAuthProvider};

//! Backend API surface for the Shopfront client.
//!
//! One shared HTTP client carries the authentication concerns for every
//! request: the bearer token is attached on the way out, a `401` on the
//! way back invalidates the local session. Auth operations, the payment
//! API, and the reactive auth context all go through it.

mod auth;
mod client;
mod context;
mod error;
pub mod payments;

pub use auth::{AuthResponse, LoginPayload, RegisterPayload};
pub use client::ApiClient;
pub use context::{AuthContext, AuthSnapshot};
pub use error::{AuthError, AuthResult};

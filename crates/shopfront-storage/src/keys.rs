//! Storage key constants.

/// Storage keys used by the client.
///
/// The key names are part of the on-disk layout contract: an installed
/// client upgraded in place must keep reading the same entries.
pub struct StorageKeys;

impl StorageKeys {
    /// Bearer token for the current session (raw string)
    pub const AUTH_TOKEN: &'static str = "@auth_token";

    /// Current user (JSON-serialized)
    pub const AUTH_USER: &'static str = "@auth_user";
}

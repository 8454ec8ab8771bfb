//! User identity as returned by the backend.

use serde::{Deserialize, Serialize};

/// Which provider an account was created through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Email,
    Google,
    WeChat,
}

impl OAuthProvider {
    /// Wire name of the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Email => "email",
            OAuthProvider::Google => "google",
            OAuthProvider::WeChat => "wechat",
        }
    }
}

/// Current user identity.
///
/// `email` is absent for WeChat-only accounts; `openid` is the
/// WeChat-specific external identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_provider: Option<OAuthProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserialize_minimal() {
        let user: AuthUser = serde_json::from_str(r#"{"id":1,"username":"u"}"#).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.username, "u");
        assert!(user.email.is_none());
        assert!(user.oauth_provider.is_none());
    }

    #[test]
    fn test_user_deserialize_wechat() {
        let json = r#"{
            "id": 7,
            "username": "wx_user",
            "oauth_provider": "wechat",
            "openid": "oX12345"
        }"#;
        let user: AuthUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.oauth_provider, Some(OAuthProvider::WeChat));
        assert_eq!(user.openid.as_deref(), Some("oX12345"));
        assert!(user.email.is_none());
    }

    #[test]
    fn test_provider_wire_name_matches_serde() {
        let json = serde_json::to_string(&OAuthProvider::WeChat).unwrap();
        assert_eq!(json, format!("\"{}\"", OAuthProvider::WeChat.as_str()));
    }

    #[test]
    fn test_user_roundtrip_preserves_fields() {
        let user = AuthUser {
            id: 2,
            username: "a".to_string(),
            email: Some("a@b.com".to_string()),
            avatar_url: None,
            oauth_provider: Some(OAuthProvider::Email),
            openid: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        let back: AuthUser = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
        // Absent options are omitted on the wire
        assert!(!json.contains("avatar_url"));
    }
}

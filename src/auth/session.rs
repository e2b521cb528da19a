//! The persisted OAuth2 session
//!
//! A single access/refresh token pair. It is created by the authorization code
//! exchange and replaced wholesale by every successful refresh.

use serde::{Deserialize, Serialize};

/// Monzo OAuth2 token pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token attached to API requests
    pub access_token: String,

    /// Token used to obtain the next access token
    pub refresh_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens must not end up in logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Response body of `POST oauth2/token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    #[serde(default)]
    pub scope: Option<String>,
}

impl From<TokenResponse> for Session {
    fn from(response: TokenResponse) -> Self {
        Session::new(response.access_token, response.refresh_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_tokens() {
        let session = Session::new("secret-access", "secret-refresh");
        let printed = format!("{:?}", session);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_token_response_without_scope() {
        let json = r#"{
            "access_token": "access",
            "token_type": "Bearer",
            "expires_in": 21600,
            "refresh_token": "refresh",
            "user_id": "user_00009237aqC8c5umZmrRdh"
        }"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert!(response.scope.is_none());

        let session = Session::from(response);
        assert_eq!(session, Session::new("access", "refresh"));
    }
}

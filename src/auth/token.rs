//! Client for Monzo's `oauth2/token` endpoint
//!
//! Handles both grants the app uses:
//! - `authorization_code`, exchanging the code from the login redirect
//! - `refresh_token`, replacing an expired access token
//!
//! Token requests go through their own `reqwest::Client`, which never carries
//! a bearer token.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use url::Url;
use crate::error::AuthError;
use super::session::{Session, TokenResponse};

/// OAuth client registration
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Token exchange request
#[derive(Debug, Serialize)]
struct CodeExchangeRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    code: &'a str,
}

/// Token refresh request
#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
}

pub struct TokenEndpoint {
    http: Client,
    url: Url,
    credentials: ClientCredentials,
}

impl TokenEndpoint {
    /// Token endpoint at `{api_url}/oauth2/token`
    pub fn new(api_url: &Url, credentials: ClientCredentials) -> crate::Result<Self> {
        Ok(Self {
            http: Client::new(),
            url: api_url.join("oauth2/token")?,
            credentials,
        })
    }

    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// Exchange an authorization code for a token pair
    pub async fn exchange_code(&self, code: &str) -> Result<Session, AuthError> {
        let request = CodeExchangeRequest {
            grant_type: "authorization_code",
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
            redirect_uri: &self.credentials.redirect_uri,
            code,
        };
        self.request_token(&request).await
    }

    /// Obtain a new token pair from a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let request = RefreshRequest {
            grant_type: "refresh_token",
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
            refresh_token,
        };
        self.request_token(&request).await
    }

    async fn request_token<T: Serialize>(&self, form: &T) -> Result<Session, AuthError> {
        let response = self.http
            .post(self.url.clone())
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AuthError::Network {
                status: status.as_u16(),
                body,
            });
        }

        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("Unreadable token response ({}): {}", status, e);
            AuthError::EmptyResponseBody
        })?;

        Ok(token_response.into())
    }
}

/// Whether a refresh failure means the refresh token itself was rejected
///
/// A rejected token cannot succeed on retry and needs a new login; transport
/// errors and server errors may clear up on their own.
pub fn is_refresh_rejected(err: &AuthError) -> bool {
    match err {
        AuthError::Network { status, .. } => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            status.is_client_error()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> ClientCredentials {
        ClientCredentials {
            client_id: "oauth2client_123".to_string(),
            client_secret: "mnzconf.secret".to_string(),
            redirect_uri: "http://127.0.0.1:8085/callback".to_string(),
        }
    }

    #[test]
    fn test_token_url() {
        let api = Url::parse("https://api.monzo.com/").unwrap();
        let endpoint = TokenEndpoint::new(&api, credentials()).unwrap();
        assert_eq!(endpoint.url.as_str(), "https://api.monzo.com/oauth2/token");
    }

    #[test]
    fn test_refresh_form_encoding() {
        let request = RefreshRequest {
            grant_type: "refresh_token",
            client_id: "id",
            client_secret: "secret",
            refresh_token: "r/1",
        };
        let encoded = form_body(&request);
        assert!(encoded.contains("grant_type=refresh_token"));
        assert!(encoded.contains("refresh_token=r%2F1"));
    }

    fn form_body<T: Serialize>(value: &T) -> String {
        let request = Client::new()
            .post("https://api.monzo.com/oauth2/token")
            .form(value)
            .build()
            .unwrap();
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[test]
    fn test_rejected_refresh_classification() {
        let rejected = AuthError::Network {
            status: 401,
            body: "invalid_grant".to_string(),
        };
        assert!(is_refresh_rejected(&rejected));

        let server = AuthError::Network {
            status: 503,
            body: String::new(),
        };
        assert!(!is_refresh_rejected(&server));
        assert!(!is_refresh_rejected(&AuthError::Transport("timeout".to_string())));
    }
}

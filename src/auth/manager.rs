//! SessionManager - Monzo OAuth2 login flow
//!
//! Implements the three steps of https://docs.monzo.com/#acquire-an-access-token:
//! 1. Redirect the user to Monzo with a fresh `state` token
//! 2. Receive the redirect carrying `code` and `state`
//! 3. Exchange the code for an access/refresh token pair
//!
//! A session is only fully usable once the user has also approved access in
//! the Monzo app (strong customer authentication), which
//! [`test_authentication`](SessionManager::test_authentication) checks.

use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;
use crate::Result;
use crate::api::ApiClient;
use crate::error::AuthError;
use super::callback_server::RedirectParams;
use super::session::Session;
use super::state_token::generate_state_token;
use super::storage::SessionStore;
use super::token::TokenEndpoint;

/// Where to send the user's browser
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: Url,
    pub state: String,
}

/// Login status as presented to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    /// `has_session` distinguishes "never logged in" from "approval pending in the app"
    RequiresAuth { has_session: bool },
    Error(String),
    Authenticated,
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    tokens: Arc<TokenEndpoint>,
    client: Arc<ApiClient>,
    auth_url: Url,
    // Check-and-clear of the pending state must not interleave
    completion_lock: Mutex<()>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        tokens: Arc<TokenEndpoint>,
        client: Arc<ApiClient>,
        auth_url: Url,
    ) -> Self {
        Self {
            store,
            tokens,
            client,
            auth_url,
            completion_lock: Mutex::new(()),
        }
    }

    /// Step 1: issue a new state token and build the authorization URL
    ///
    /// The token is persisted before returning, so any earlier pending
    /// authorization can no longer complete.
    pub async fn begin_authorization(&self) -> Result<AuthorizationRequest> {
        let state = generate_state_token();
        self.store.set_state_token(Some(&state)).await?;

        let credentials = self.tokens.credentials();
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &credentials.client_id)
            .append_pair("redirect_uri", &credentials.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("state", &state);

        tracing::debug!("Authorization started");
        Ok(AuthorizationRequest { url, state })
    }

    /// Steps 2 and 3: validate the returned state and exchange the code
    ///
    /// The pending state is cleared whatever the outcome, so a callback can
    /// never be replayed. The session is only written on a successful exchange.
    pub async fn complete_authorization(
        &self,
        code: &str,
        returned_state: Option<&str>,
    ) -> std::result::Result<Session, AuthError> {
        {
            let _guard = self.completion_lock.lock().await;
            // Clear before looking at the read result so a corrupt record is dropped too
            let pending = self.store.state_token().await;
            self.store.set_state_token(None).await?;
            let pending = pending.unwrap_or_else(|e| {
                tracing::warn!("Unreadable pending authorization state: {}", e);
                None
            });

            let valid = matches!(
                (pending.as_deref(), returned_state),
                (Some(expected), Some(returned)) if !expected.is_empty() && expected == returned
            );
            if !valid {
                tracing::warn!("Rejected authorization callback with invalid state");
                return Err(AuthError::StateMismatch);
            }
        }

        let session = self.tokens.exchange_code(code).await?;
        self.store.save_session(&session).await?;
        tracing::info!("Authorization code exchanged, session stored");
        Ok(session)
    }

    /// Handle a redirect; without a `code` this does nothing
    pub async fn handle_redirect(&self, params: &RedirectParams) -> Result<Option<Session>> {
        if let Some(err) = params.provider_error() {
            self.store.set_state_token(None).await?;
            return Err(err);
        }

        let Some(code) = params.code.as_deref() else {
            return Ok(None);
        };

        let session = self.complete_authorization(code, params.state.as_deref()).await?;
        Ok(Some(session))
    }

    pub async fn get_session(&self) -> Result<Option<Session>> {
        self.store.session().await
    }

    /// Check that the session has passed strong customer authentication
    ///
    /// `/accounts` always requires SCA, unlike `/ping/whoami` which succeeds
    /// with any valid token.
    pub async fn test_authentication(&self) -> std::result::Result<(), AuthError> {
        let response = self.client.get("accounts", &[]).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            tracing::debug!("SCA check returned {}", response.status());
            Err(AuthError::RequiresStrongAuth)
        }
    }

    /// Complete a login and verify it, mapped to the state shown to the user
    pub async fn login(&self, code: &str, returned_state: Option<&str>) -> AuthState {
        match self.complete_authorization(code, returned_state).await {
            Ok(_) => self.check_authenticated().await,
            Err(AuthError::StateMismatch) => AuthState::Error(AuthError::StateMismatch.to_string()),
            Err(e) => AuthState::Error(format!("Failed to exchange code for token: {}", e)),
        }
    }

    /// Current login status
    pub async fn auth_state(&self) -> AuthState {
        match self.get_session().await {
            Ok(None) => AuthState::RequiresAuth { has_session: false },
            Ok(Some(_)) => self.check_authenticated().await,
            Err(e) => AuthState::Error(e.to_string()),
        }
    }

    async fn check_authenticated(&self) -> AuthState {
        match self.test_authentication().await {
            Ok(()) => AuthState::Authenticated,
            Err(AuthError::RequiresStrongAuth) => AuthState::RequiresAuth { has_session: true },
            Err(e) => AuthState::Error(e.to_string()),
        }
    }

    /// Forget the session and any pending authorization
    pub async fn logout(&self) -> Result<()> {
        self.store.clear_session().await?;
        self.store.set_state_token(None).await?;
        tracing::info!("Session cleared");
        Ok(())
    }
}

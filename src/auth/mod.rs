//! Authentication module for the Monzo OAuth2 flow
//!
//! This module provides:
//! - State token generation for CSRF protection
//! - Session and pending-state storage
//! - The `oauth2/token` endpoint client
//! - A one-shot callback server for the login redirect
//! - SessionManager, which drives the authorization code grant

mod callback_server;
mod manager;
mod session;
mod state_token;
pub(crate) mod storage;
mod token;

pub use callback_server::{accept_redirect, bind_callback, RedirectParams};
pub use manager::{AuthState, AuthorizationRequest, SessionManager};
pub use session::{Session, TokenResponse};
pub use state_token::generate_state_token;
pub use storage::{FileSessionStore, MemorySessionStore, SessionStore};
pub use token::{is_refresh_rejected, ClientCredentials, TokenEndpoint};

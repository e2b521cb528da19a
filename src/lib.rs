//! monzo-widget - Monzo account and pot balances
//!
//! This library provides the OAuth2 session handling, an authenticating API
//! client with transparent token refresh, and a local cache of account data
//! ready for display.

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod sync;
pub mod ui;
pub mod widget;

pub use context::AppContext;
pub use error::{AuthError, Error, Result};

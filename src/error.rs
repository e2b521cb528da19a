//! Error types for monzo-widget

use thiserror::Error;

/// Result type alias for monzo-widget operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the OAuth2 login flow and session checks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The callback's `state` did not match the pending state token
    #[error("Invalid state token")]
    StateMismatch,

    /// The token endpoint answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Network { status: u16, body: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Empty response body")]
    EmptyResponseBody,

    /// The token is valid but the user has not approved access in the Monzo app
    #[error("Strong customer authentication required")]
    RequiresStrongAuth,

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Transport(err.to_string())
    }
}

/// Errors that can occur in monzo-widget
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Callback error: {0}")]
    Callback(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<Error> for AuthError {
    fn from(err: Error) -> Self {
        match err {
            Error::Auth(auth) => auth,
            Error::Http(e) => AuthError::Transport(e.to_string()),
            other => AuthError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_message() {
        let err = AuthError::Network {
            status: 400,
            body: "bad_request".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 400: bad_request");
    }

    #[test]
    fn test_auth_error_unwraps_from_crate_error() {
        let err: AuthError = Error::Auth(AuthError::StateMismatch).into();
        assert_eq!(err, AuthError::StateMismatch);

        let err: AuthError = Error::Config("missing".to_string()).into();
        assert!(matches!(err, AuthError::Storage(_)));
    }
}

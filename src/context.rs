//! Wiring of the session manager, API client and repository
//!
//! Built once per process and passed to whatever needs it.

use std::sync::Arc;
use crate::Result;
use crate::api::{parse_base_url, ApiClient, MonzoApi};
use crate::auth::{ClientCredentials, FileSessionStore, SessionManager, SessionStore, TokenEndpoint};
use crate::config::Config;
use crate::sync::{CacheStore, JsonCache, MonzoRepository};

pub struct AppContext {
    pub config: Config,
    pub sessions: SessionManager,
    pub client: Arc<ApiClient>,
    pub repository: MonzoRepository,
}

impl AppContext {
    /// Context with the given stores
    ///
    /// The manager and the client share `store`, so a refresh done by the
    /// client is what the manager reads next.
    pub fn new(
        config: Config,
        store: Arc<dyn SessionStore>,
        cache: Arc<dyn CacheStore>,
    ) -> Result<Self> {
        let api_url = parse_base_url(&config.api_url)?;
        let auth_url = parse_base_url(&config.auth_url)?;

        let credentials = ClientCredentials {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        };
        let tokens = Arc::new(TokenEndpoint::new(&api_url, credentials)?);
        let client = Arc::new(ApiClient::new(api_url, store.clone(), tokens.clone()));
        let sessions = SessionManager::new(store, tokens, client.clone(), auth_url);
        let repository = MonzoRepository::new(MonzoApi::new(client.clone()), cache);

        Ok(Self {
            config,
            sessions,
            client,
            repository,
        })
    }

    /// Context backed by files in `~/.monzo-widget/`
    pub fn from_config(config: Config) -> Result<Self> {
        let store = Arc::new(FileSessionStore::in_config_dir());
        let cache = Arc::new(JsonCache::open_default()?);
        Self::new(config, store, cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemorySessionStore, Session};

    fn config(api_url: &str) -> Config {
        Config {
            client_id: "oauth2client_test".to_string(),
            client_secret: "secret".to_string(),
            api_url: api_url.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_manager_and_client_share_store() {
        let store = Arc::new(MemorySessionStore::new());
        let ctx = AppContext::new(config("http://127.0.0.1:9"), store.clone(), Arc::new(JsonCache::in_memory())).unwrap();

        tokio_test::block_on(async {
            store.save_session(&Session::new("access", "refresh")).await.unwrap();
            assert_eq!(
                ctx.sessions.get_session().await.unwrap(),
                Some(Session::new("access", "refresh"))
            );
        });
        assert_eq!(ctx.client.base_url().as_str(), "http://127.0.0.1:9/");
    }

    #[test]
    fn test_invalid_api_url() {
        let result = AppContext::new(
            config("not a url"),
            Arc::new(MemorySessionStore::new()),
            Arc::new(JsonCache::in_memory()),
        );
        assert!(result.is_err());
    }
}

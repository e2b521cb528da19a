//! Shared helpers for the wiremock integration tests

#![allow(dead_code)]

use std::sync::Arc;

use monzo_widget::auth::{MemorySessionStore, Session};
use monzo_widget::config::Config;
use monzo_widget::sync::JsonCache;
use monzo_widget::AppContext;

/// Context pointing at a mock server, with in-memory stores
pub fn context(server_uri: &str, session: Option<Session>) -> (AppContext, Arc<MemorySessionStore>) {
    let store = Arc::new(match session {
        Some(session) => MemorySessionStore::with_session(session),
        None => MemorySessionStore::new(),
    });
    let config = Config {
        client_id: "oauth2client_test".to_string(),
        client_secret: "mnzconf.test".to_string(),
        api_url: server_uri.to_string(),
        ..Config::default()
    };
    let ctx = AppContext::new(config, store.clone(), Arc::new(JsonCache::in_memory()))
        .expect("valid test context");
    (ctx, store)
}

/// A token endpoint response body
pub fn token_body(access: &str, refresh: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": access,
        "client_id": "oauth2client_test",
        "expires_in": 21600,
        "refresh_token": refresh,
        "token_type": "Bearer",
        "user_id": "user_00009238aMBIIrS5Rdncq9"
    })
}

pub fn accounts_body() -> serde_json::Value {
    serde_json::json!({
        "accounts": [
            {
                "id": "acc_open",
                "closed": false,
                "created": "2019-01-01T00:00:00.000Z",
                "product_type": "standard",
                "owner_type": "personal",
                "country_code": "GB"
            },
            {
                "id": "acc_joint",
                "closed": false,
                "created": "2020-01-01T00:00:00.000Z",
                "product_type": "standard",
                "owner_type": "joint",
                "country_code": "GB"
            },
            {
                "id": "acc_closed",
                "closed": true,
                "created": "2016-01-01T00:00:00.000Z",
                "product_type": "standard",
                "owner_type": "personal",
                "country_code": "GB"
            }
        ]
    })
}

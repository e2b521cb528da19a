//! Authenticating client behaviour on 401 responses
//!
//! Verifies the refresh-and-retry path, that a failed refresh leaves the
//! session untouched and surfaces the original 401, and that concurrent 401s
//! share a single refresh.

mod common;

use std::sync::Arc;

use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use monzo_widget::api::ApiClient;
use monzo_widget::auth::{ClientCredentials, MemorySessionStore, Session, SessionStore, TokenEndpoint};

async fn mount_accounts(server: &MockServer, token: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .and(header("Authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_json(common::accounts_body()))
        .mount(server)
        .await;
}

/// The token endpoint must never see a bearer token
async fn forbid_authenticated_token_calls(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_attaches_bearer_token() {
    let server = MockServer::start().await;
    mount_accounts(&server, "access_1", 200).await;
    let (ctx, _store) = common::context(&server.uri(), Some(Session::new("access_1", "refresh_1")));

    let response = ctx.client.get("accounts", &[]).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_without_session_sends_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::token_body("a", "r")))
        .expect(0)
        .mount(&server)
        .await;
    let (ctx, _store) = common::context(&server.uri(), None);

    let response = ctx.client.get("accounts", &[]).await.unwrap();
    assert_eq!(response.status(), 401);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_refreshes_and_retries_on_401() {
    let server = MockServer::start().await;
    forbid_authenticated_token_calls(&server).await;
    mount_accounts(&server, "stale_access", 401).await;
    mount_accounts(&server, "new_access", 200).await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::token_body("new_access", "refresh_2")))
        .expect(1)
        .mount(&server)
        .await;
    let (ctx, store) = common::context(&server.uri(), Some(Session::new("stale_access", "refresh_1")));

    let response = ctx.client.get("accounts", &[]).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        store.session().await.unwrap(),
        Some(Session::new("new_access", "refresh_2"))
    );
}

#[tokio::test]
async fn test_failed_refresh_returns_original_401() {
    let server = MockServer::start().await;
    mount_accounts(&server, "stale_access", 401).await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": "unauthorized.bad_refresh_token"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let original = Session::new("stale_access", "refresh_1");
    let (ctx, store) = common::context(&server.uri(), Some(original.clone()));

    let response = ctx.client.get("accounts", &[]).await.unwrap();
    assert_eq!(response.status(), 401);
    assert_eq!(store.session().await.unwrap(), Some(original));
}

#[tokio::test]
async fn test_refresh_server_error_keeps_session() {
    let server = MockServer::start().await;
    mount_accounts(&server, "stale_access", 401).await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let original = Session::new("stale_access", "refresh_1");
    let (ctx, store) = common::context(&server.uri(), Some(original.clone()));

    let response = ctx.client.get("accounts", &[]).await.unwrap();
    assert_eq!(response.status(), 401);
    assert_eq!(store.session().await.unwrap(), Some(original));
}

#[tokio::test]
async fn test_unreadable_refresh_body_keeps_session() {
    let server = MockServer::start().await;
    mount_accounts(&server, "stale_access", 401).await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;
    let original = Session::new("stale_access", "refresh_1");
    let (ctx, store) = common::context(&server.uri(), Some(original.clone()));

    let response = ctx.client.get("accounts", &[]).await.unwrap();
    assert_eq!(response.status(), 401);
    assert_eq!(store.session().await.unwrap(), Some(original));
}

#[tokio::test]
async fn test_unreachable_token_endpoint_keeps_session() {
    let server = MockServer::start().await;
    mount_accounts(&server, "stale_access", 401).await;

    // Reserve and release a port so nothing listens on it
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let token_base = url::Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();
    let credentials = ClientCredentials {
        client_id: "oauth2client_test".to_string(),
        client_secret: "mnzconf.test".to_string(),
        redirect_uri: "http://127.0.0.1:8085/callback".to_string(),
    };
    let tokens = Arc::new(TokenEndpoint::new(&token_base, credentials).unwrap());

    let original = Session::new("stale_access", "refresh_1");
    let store = Arc::new(MemorySessionStore::with_session(original.clone()));
    let api_base = url::Url::parse(&format!("{}/", server.uri())).unwrap();
    let client = ApiClient::new(api_base, store.clone(), tokens);

    let response = client.get("accounts", &[]).await.unwrap();
    assert_eq!(response.status(), 401);
    assert_eq!(store.session().await.unwrap(), Some(original));
}

#[tokio::test]
async fn test_retry_is_attempted_only_once() {
    let server = MockServer::start().await;
    mount_accounts(&server, "stale_access", 401).await;
    mount_accounts(&server, "new_access", 401).await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::token_body("new_access", "refresh_2")))
        .expect(1)
        .mount(&server)
        .await;
    let (ctx, _store) = common::context(&server.uri(), Some(Session::new("stale_access", "refresh_1")));

    let response = ctx.client.get("accounts", &[]).await.unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_concurrent_401s_refresh_once() {
    let server = MockServer::start().await;
    forbid_authenticated_token_calls(&server).await;
    mount_accounts(&server, "stale_access", 401).await;
    mount_accounts(&server, "new_access", 200).await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::token_body("new_access", "refresh_2"))
                .set_delay(std::time::Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;
    let (ctx, store) = common::context(&server.uri(), Some(Session::new("stale_access", "refresh_1")));
    let client = ctx.client.clone();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.get("accounts", &[]).await.map(|r| r.status()) })
        })
        .collect();

    for task in tasks {
        let status = task.await.unwrap().unwrap();
        assert_eq!(status, 200);
    }
    assert_eq!(
        store.session().await.unwrap(),
        Some(Session::new("new_access", "refresh_2"))
    );
}

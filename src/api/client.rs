//! Authenticating HTTP client for the Monzo API
//!
//! Every request carries `Authorization: Bearer <access_token>` from the stored
//! session. A 401 triggers one refresh of the token pair followed by one retry
//! of the original request. The refresh is single-flight: concurrent requests
//! that fail together wait on `refresh_lock`, and all but the first find the
//! session already replaced and simply retry with the new token.

use std::sync::Arc;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, Request, RequestBuilder, Response, StatusCode};
use tokio::sync::Mutex;
use url::Url;
use crate::Result;
use crate::error::Error;
use crate::auth::{is_refresh_rejected, SessionStore, TokenEndpoint};

pub struct ApiClient {
    http: Client,
    base_url: Url,
    store: Arc<dyn SessionStore>,
    tokens: Arc<TokenEndpoint>,
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    pub fn new(base_url: Url, store: Arc<dyn SessionStore>, tokens: Arc<TokenEndpoint>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            store,
            tokens,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Start a request for a path relative to the API base URL
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        Ok(self.http.request(method, url))
    }

    /// `GET {path}?{query}` through [`send`](Self::send)
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        let request = self.request(Method::GET, path)?.query(query).build()?;
        self.send(request).await
    }

    /// Send a request with the current bearer token
    ///
    /// Without a stored session the request goes out unauthenticated and the
    /// caller sees whatever the API answers. A 401 is retried once after a
    /// refresh; if the refresh fails the original 401 is returned.
    pub async fn send(&self, mut request: Request) -> Result<Response> {
        set_json_accept(&mut request);
        // Streaming bodies cannot be replayed, so those requests are never retried
        let retry = request.try_clone();

        let sent_token = self.store.session().await?.map(|s| s.access_token);
        if let Some(token) = &sent_token {
            set_bearer(&mut request, token)?;
        }

        let response = self.http.execute(request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(retry) = retry else {
            tracing::debug!("401 on a request that cannot be replayed");
            return Ok(response);
        };

        match self.refresh_and_retry(retry, sent_token.as_deref()).await {
            Some(retried) => Ok(retried),
            None => Ok(response),
        }
    }

    /// Returns the retried response, or `None` to surface the original 401
    async fn refresh_and_retry(&self, mut request: Request, sent_token: Option<&str>) -> Option<Response> {
        let token = {
            let _guard = self.refresh_lock.lock().await;

            let session = match self.store.session().await {
                Ok(Some(session)) => session,
                Ok(None) => {
                    tracing::debug!("Got 401 without a session, nothing to refresh");
                    return None;
                }
                Err(e) => {
                    tracing::warn!("Failed to read session for refresh: {}", e);
                    return None;
                }
            };

            if sent_token != Some(session.access_token.as_str()) {
                // Replaced while this request was in flight
                tracing::debug!("Session already refreshed, retrying with current token");
                session.access_token
            } else {
                tracing::info!("Access token rejected, refreshing session");
                match self.tokens.refresh(&session.refresh_token).await {
                    Ok(refreshed) => {
                        if let Err(e) = self.store.save_session(&refreshed).await {
                            tracing::error!("Failed to save refreshed session: {}", e);
                            return None;
                        }
                        refreshed.access_token
                    }
                    Err(e) => {
                        if is_refresh_rejected(&e) {
                            tracing::warn!("Refresh token rejected, login required: {}", e);
                        } else {
                            tracing::info!("Token refresh failed, will try again on the next 401: {}", e);
                        }
                        return None;
                    }
                }
            }
        };

        if let Err(e) = set_bearer(&mut request, &token) {
            tracing::error!("Failed to attach refreshed token: {}", e);
            return None;
        }

        match self.http.execute(request).await {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::error!("Retry after refresh failed: {}", e);
                None
            }
        }
    }
}

fn set_bearer(request: &mut Request, token: &str) -> Result<()> {
    let value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| Error::Other(format!("Invalid access token: {}", e)))?;
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}

fn set_json_accept(request: &mut Request) {
    request
        .headers_mut()
        .insert(ACCEPT, HeaderValue::from_static("application/json"));
}

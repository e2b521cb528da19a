//! Typed Monzo API endpoints
//!
//! Response models keep only the fields the cache needs; unknown fields in
//! the JSON are ignored.

use std::sync::Arc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use crate::Result;
use crate::error::Error;
use super::client::ApiClient;

#[derive(Debug, Clone, Deserialize)]
pub struct AccountsResponse {
    pub accounts: Vec<ApiAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAccount {
    pub id: String,
    pub closed: bool,
    pub product_type: String,
    pub owner_type: String,
    pub country_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiBalance {
    /// Minor currency units
    pub balance: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PotsResponse {
    #[serde(default)]
    pub pots: Vec<ApiPot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPot {
    pub id: String,
    pub name: String,
    /// Minor currency units
    pub balance: i64,
    pub currency: String,
    pub deleted: bool,
}

/// Monzo data endpoints on top of the authenticating client
#[derive(Clone)]
pub struct MonzoApi {
    client: Arc<ApiClient>,
}

impl MonzoApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `GET /accounts`
    pub async fn accounts(&self) -> Result<AccountsResponse> {
        self.get_json("accounts", &[]).await
    }

    /// `GET /balance?account_id=`
    pub async fn balance(&self, account_id: &str) -> Result<ApiBalance> {
        self.get_json("balance", &[("account_id", account_id)]).await
    }

    /// `GET /pots?current_account_id=`
    pub async fn pots(&self, account_id: &str) -> Result<PotsResponse> {
        self.get_json("pots", &[("current_account_id", account_id)]).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self.client.get(path, query).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("GET {} failed with {}", path, status);
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

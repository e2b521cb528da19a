//! Local mirror of account, balance and pot data
//!
//! Rows are upserted by id, the way the API responses arrive. [`JsonCache`]
//! keeps everything in one snapshot, optionally persisted to `cache.json`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use crate::Result;
use crate::auth::storage::write_private_json;
use super::models::{CachedAccount, CachedBalance, CachedPot};

/// Storage for cached Monzo data
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn save_accounts(&self, accounts: &[CachedAccount]) -> Result<()>;
    async fn save_balance(&self, balance: &CachedBalance) -> Result<()>;
    async fn save_pots(&self, pots: &[CachedPot]) -> Result<()>;
    async fn mark_synced(&self, at: DateTime<Utc>) -> Result<()>;

    async fn accounts(&self) -> Result<Vec<CachedAccount>>;
    async fn balances(&self) -> Result<Vec<CachedBalance>>;
    async fn pots(&self) -> Result<Vec<CachedPot>>;
    async fn last_synced(&self) -> Result<Option<DateTime<Utc>>>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheSnapshot {
    #[serde(default)]
    accounts: BTreeMap<String, CachedAccount>,
    #[serde(default)]
    balances: BTreeMap<String, CachedBalance>,
    #[serde(default)]
    pots: BTreeMap<String, CachedPot>,
    #[serde(default)]
    synced_at: Option<DateTime<Utc>>,
}

pub struct JsonCache {
    snapshot: Mutex<CacheSnapshot>,
    path: Option<PathBuf>,
}

impl JsonCache {
    /// Cache that lives only as long as the process
    pub fn in_memory() -> Self {
        Self {
            snapshot: Mutex::new(CacheSnapshot::default()),
            path: None,
        }
    }

    /// Load the cache file at `path`, starting empty if it does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            CacheSnapshot::default()
        };

        Ok(Self {
            snapshot: Mutex::new(snapshot),
            path: Some(path),
        })
    }

    /// `cache.json` in the config directory
    pub fn open_default() -> Result<Self> {
        Self::open(crate::config::config_dir().join("cache.json"))
    }

    async fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut CacheSnapshot) + Send,
    {
        let mut snapshot = self.snapshot.lock().await;
        apply(&mut snapshot);

        if let Some(path) = &self.path {
            write_private_json(path, &*snapshot).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for JsonCache {
    async fn save_accounts(&self, accounts: &[CachedAccount]) -> Result<()> {
        self.update(|s| {
            for account in accounts {
                s.accounts.insert(account.id.clone(), account.clone());
            }
        })
        .await
    }

    async fn save_balance(&self, balance: &CachedBalance) -> Result<()> {
        self.update(|s| {
            s.balances.insert(balance.account_id.clone(), balance.clone());
        })
        .await
    }

    async fn save_pots(&self, pots: &[CachedPot]) -> Result<()> {
        self.update(|s| {
            for pot in pots {
                s.pots.insert(pot.id.clone(), pot.clone());
            }
        })
        .await
    }

    async fn mark_synced(&self, at: DateTime<Utc>) -> Result<()> {
        self.update(|s| s.synced_at = Some(at)).await
    }

    async fn accounts(&self) -> Result<Vec<CachedAccount>> {
        Ok(self.snapshot.lock().await.accounts.values().cloned().collect())
    }

    async fn balances(&self) -> Result<Vec<CachedBalance>> {
        Ok(self.snapshot.lock().await.balances.values().cloned().collect())
    }

    async fn pots(&self) -> Result<Vec<CachedPot>> {
        Ok(self.snapshot.lock().await.pots.values().cloned().collect())
    }

    async fn last_synced(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.snapshot.lock().await.synced_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pot(id: &str, balance: i64) -> CachedPot {
        CachedPot {
            id: id.to_string(),
            account_id: "acc_1".to_string(),
            name: "Holiday".to_string(),
            balance,
            currency: "GBP".to_string(),
        }
    }

    #[tokio::test]
    async fn test_pots_upsert_by_id() {
        let cache = JsonCache::in_memory();
        cache.save_pots(&[pot("pot_1", 100), pot("pot_2", 200)]).await.unwrap();
        cache.save_pots(&[pot("pot_1", 150)]).await.unwrap();

        let pots = cache.pots().await.unwrap();
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].balance, 150);
        assert_eq!(pots[1].balance, 200);
    }

    #[tokio::test]
    async fn test_file_cache_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let cache = JsonCache::open(&path).unwrap();
        cache
            .save_balance(&CachedBalance {
                account_id: "acc_1".to_string(),
                currency: "GBP".to_string(),
                balance: 4200,
            })
            .await
            .unwrap();
        let now = Utc::now();
        cache.mark_synced(now).await.unwrap();

        let reopened = JsonCache::open(&path).unwrap();
        let balances = reopened.balances().await.unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].balance, 4200);
        assert_eq!(reopened.last_synced().await.unwrap(), Some(now));
    }
}

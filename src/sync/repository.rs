//! MonzoRepository - refreshes the cache from the API and reads it back

use std::collections::HashMap;
use std::sync::Arc;
use chrono::Utc;
use futures_util::future::join_all;
use crate::Result;
use crate::api::MonzoApi;
use super::cache::CacheStore;
use super::models::{Account, CachedAccount, CachedBalance, CachedPot, Pot};

/// Outcome of a full sync
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Open accounts returned by the API
    pub accounts: usize,
    /// `(account_id, error)` for every balance or pot refresh that failed
    pub failures: Vec<(String, String)>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone)]
pub struct MonzoRepository {
    api: MonzoApi,
    cache: Arc<dyn CacheStore>,
}

impl MonzoRepository {
    pub fn new(api: MonzoApi, cache: Arc<dyn CacheStore>) -> Self {
        Self { api, cache }
    }

    /// Cache open accounts; returns their ids
    pub async fn refresh_accounts(&self) -> Result<Vec<String>> {
        let response = self.api.accounts().await?;
        let accounts: Vec<CachedAccount> = response
            .accounts
            .iter()
            .filter(|account| !account.closed)
            .map(CachedAccount::from)
            .collect();

        self.cache.save_accounts(&accounts).await?;
        tracing::debug!("Cached {} accounts", accounts.len());
        Ok(accounts.into_iter().map(|a| a.id).collect())
    }

    pub async fn refresh_balance(&self, account_id: &str) -> Result<()> {
        let balance = self.api.balance(account_id).await?;
        self.cache
            .save_balance(&CachedBalance::from_api(account_id, &balance))
            .await
    }

    /// Cache the account's pots, skipping deleted ones
    pub async fn refresh_pots(&self, account_id: &str) -> Result<()> {
        let response = self.api.pots(account_id).await?;
        let pots: Vec<CachedPot> = response
            .pots
            .iter()
            .filter(|pot| !pot.deleted)
            .map(|pot| CachedPot::from_api(account_id, pot))
            .collect();
        self.cache.save_pots(&pots).await
    }

    /// Refresh accounts, then balances and pots of every account concurrently
    ///
    /// A failing account refresh aborts the sync. Balance and pot failures are
    /// collected in the report so one account cannot block the others.
    pub async fn sync_all(&self) -> Result<SyncReport> {
        let account_ids = self.refresh_accounts().await?;

        let results = join_all(account_ids.iter().map(|id| async move {
            let balance = self.refresh_balance(id).await;
            let pots = self.refresh_pots(id).await;
            (id, balance, pots)
        }))
        .await;

        let mut report = SyncReport {
            accounts: account_ids.len(),
            failures: Vec::new(),
        };
        for (id, balance, pots) in results {
            for result in [balance, pots] {
                if let Err(e) = result {
                    tracing::warn!("Sync failed for account {}: {}", id, e);
                    report.failures.push((id.clone(), e.to_string()));
                }
            }
        }

        self.cache.mark_synced(Utc::now()).await?;
        tracing::info!(
            "Synced {} accounts ({} failures)",
            report.accounts,
            report.failures.len()
        );
        Ok(report)
    }

    /// Cached accounts with their balance and pots
    pub async fn accounts(&self) -> Result<Vec<Account>> {
        let accounts = self.cache.accounts().await?;
        let balances = self.cache.balances().await?;

        let mut pots: HashMap<String, Vec<Pot>> = HashMap::new();
        for pot in self.cache.pots().await? {
            pots.entry(pot.account_id.clone()).or_default().push(Pot::from(&pot));
        }

        Ok(accounts
            .iter()
            .map(|account| {
                let balance = balances.iter().find(|b| b.account_id == account.id);
                let account_pots = pots.remove(&account.id).unwrap_or_default();
                Account::from_cached(account, balance, account_pots)
            })
            .collect())
    }

    pub async fn last_synced(&self) -> Result<Option<chrono::DateTime<Utc>>> {
        self.cache.last_synced().await
    }
}

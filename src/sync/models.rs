//! Cached rows and the account view built from them

use serde::{Deserialize, Serialize};
use crate::api::{ApiAccount, ApiBalance, ApiPot};
use super::format::{country_flag, format_balance};

/// Account row, keyed by Monzo account id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAccount {
    pub id: String,
    pub owner_type: String,
    pub product_type: String,
    /// ISO 3166 alpha-2
    pub country_code: String,
}

/// Balance row, keyed by account id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedBalance {
    pub account_id: String,
    pub currency: String,
    /// Minor currency units
    pub balance: i64,
}

/// Pot row, keyed by pot id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPot {
    pub id: String,
    pub account_id: String,
    pub name: String,
    /// Minor currency units
    pub balance: i64,
    pub currency: String,
}

impl From<&ApiAccount> for CachedAccount {
    fn from(account: &ApiAccount) -> Self {
        Self {
            id: account.id.clone(),
            owner_type: account.owner_type.clone(),
            product_type: account.product_type.clone(),
            country_code: account.country_code.clone(),
        }
    }
}

impl CachedBalance {
    pub fn from_api(account_id: &str, balance: &ApiBalance) -> Self {
        Self {
            account_id: account_id.to_string(),
            currency: balance.currency.clone(),
            balance: balance.balance,
        }
    }
}

impl CachedPot {
    pub fn from_api(account_id: &str, pot: &ApiPot) -> Self {
        Self {
            id: pot.id.clone(),
            account_id: account_id.to_string(),
            name: pot.name.clone(),
            balance: pot.balance,
            currency: pot.currency.clone(),
        }
    }
}

/// Amount in minor units with its currency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub currency: String,
    pub amount: i64,
}

impl Balance {
    /// Display string, e.g. `£1,234.56`
    pub fn formatted(&self) -> String {
        format_balance(&self.currency, self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pot {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub balance: Balance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub owner_type: String,
    pub product_type: String,
    /// Flag of the account's country
    pub emoji: String,
    pub balance: Option<Balance>,
    pub pots: Vec<Pot>,
}

impl Account {
    /// `personal` / `joint` for current accounts, the product type otherwise
    pub fn title(&self) -> &str {
        if self.product_type == "standard" {
            &self.owner_type
        } else {
            &self.product_type
        }
    }

    pub(crate) fn from_cached(account: &CachedAccount, balance: Option<&CachedBalance>, pots: Vec<Pot>) -> Self {
        Self {
            id: account.id.clone(),
            owner_type: account.owner_type.clone(),
            product_type: account.product_type.clone(),
            emoji: country_flag(&account.country_code),
            balance: balance.map(|b| Balance {
                currency: b.currency.clone(),
                amount: b.balance,
            }),
            pots,
        }
    }
}

impl From<&CachedPot> for Pot {
    fn from(pot: &CachedPot) -> Self {
        Self {
            id: pot.id.clone(),
            account_id: pot.account_id.clone(),
            name: pot.name.clone(),
            balance: Balance {
                currency: pot.currency.clone(),
                amount: pot.balance,
            },
        }
    }
}

//! Account data sync
//!
//! Mirrors accounts, balances and pots from the API into a local cache and
//! turns the cache into display-ready accounts.

mod cache;
mod format;
mod models;
mod repository;

pub use cache::{CacheStore, JsonCache};
pub use format::{country_flag, currency_symbol, format_amount, format_balance};
pub use models::{Account, Balance, CachedAccount, CachedBalance, CachedPot, Pot};
pub use repository::{MonzoRepository, SyncReport};

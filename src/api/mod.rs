//! Monzo API access
//!
//! - [`ApiClient`]: bearer-token client with single-flight refresh on 401
//! - [`MonzoApi`]: typed accounts / balance / pots endpoints

mod client;
mod monzo;

pub use client::ApiClient;
pub use monzo::{AccountsResponse, ApiAccount, ApiBalance, ApiPot, MonzoApi, PotsResponse};

use url::Url;
use crate::Result;

/// Parse a base URL, making sure relative joins append to its path
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

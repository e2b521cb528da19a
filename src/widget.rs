//! Balance widget content
//!
//! The widget shows the currency symbol and the amount as separate strings so
//! the symbol can be drawn smaller than the figure.

use crate::sync::{currency_symbol, format_amount, Account, Balance, Pot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetContent {
    /// Symbol, prefixed with `-` for negative balances
    pub currency_symbol: String,
    /// Unsigned amount without symbol, e.g. `1,234.56`
    pub amount: String,
    pub emoji: String,
    pub title: String,
}

impl WidgetContent {
    /// Widget for an account; `None` until its balance has been synced
    pub fn for_account(account: &Account) -> Option<Self> {
        let balance = account.balance.as_ref()?;
        Some(Self::new(balance, &account.emoji, account.title()))
    }

    /// Widget for a pot, labelled with the flag of the account holding it
    pub fn for_pot(pot: &Pot, emoji: &str) -> Self {
        Self::new(&pot.balance, emoji, &pot.name)
    }

    fn new(balance: &Balance, emoji: &str, title: &str) -> Self {
        let symbol = currency_symbol(&balance.currency)
            .map(str::to_string)
            .unwrap_or_else(|| balance.currency.to_ascii_uppercase());
        let currency_symbol = if balance.amount < 0 {
            format!("-{}", symbol)
        } else {
            symbol
        };

        Self {
            currency_symbol,
            amount: format_amount(balance.amount.unsigned_abs()),
            emoji: emoji.to_string(),
            title: title.to_string(),
        }
    }

    /// Caption under the amount
    pub fn caption(&self) -> String {
        format!("{} {}", self.emoji, self.title)
    }
}

/// Find the widget for an account or pot id; without an id, the first account with a balance
pub fn find_widget(accounts: &[Account], id: Option<&str>) -> Option<WidgetContent> {
    match id {
        None => accounts.iter().find_map(WidgetContent::for_account),
        Some(id) => accounts.iter().find_map(|account| {
            if account.id == id {
                return WidgetContent::for_account(account);
            }
            account
                .pots
                .iter()
                .find(|pot| pot.id == id)
                .map(|pot| WidgetContent::for_pot(pot, &account.emoji))
        }),
    }
}

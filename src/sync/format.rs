//! Display formatting for balances and countries

/// Symbol for the currencies Monzo accounts are held in
pub fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency.to_ascii_uppercase().as_str() {
        "GBP" => Some("£"),
        "EUR" => Some("€"),
        "USD" => Some("$"),
        _ => None,
    }
}

/// Format minor units as `£1,234.56`, or `1,234.56 CHF` for other currencies
pub fn format_balance(currency: &str, minor_units: i64) -> String {
    let sign = if minor_units < 0 { "-" } else { "" };
    let amount = format_amount(minor_units.unsigned_abs());

    match currency_symbol(currency) {
        Some(symbol) => format!("{}{}{}", sign, symbol, amount),
        None => format!("{}{} {}", sign, amount, currency.to_ascii_uppercase()),
    }
}

/// Unsigned amount with two decimals and thousands separators
pub fn format_amount(minor_units: u64) -> String {
    let major = minor_units / 100;
    let minor = minor_units % 100;
    format!("{}.{:02}", group_thousands(major), minor)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Regional-indicator flag for an ISO 3166 alpha-2 code
pub fn country_flag(country_code: &str) -> String {
    country_code
        .chars()
        .filter(char::is_ascii_alphabetic)
        .filter_map(|c| {
            let offset = c.to_ascii_uppercase() as u32 - 'A' as u32;
            char::from_u32(0x1F1E6 + offset)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_gbp() {
        assert_eq!(format_balance("GBP", 0), "£0.00");
        assert_eq!(format_balance("GBP", 5), "£0.05");
        assert_eq!(format_balance("GBP", 123456), "£1,234.56");
        assert_eq!(format_balance("gbp", 100000000), "£1,000,000.00");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_balance("GBP", -500), "-£5.00");
        assert_eq!(format_balance("EUR", -1), "-€0.01");
    }

    #[test]
    fn test_format_unknown_currency() {
        assert_eq!(format_balance("CHF", 99999), "999.99 CHF");
    }

    #[test]
    fn test_country_flag() {
        assert_eq!(country_flag("GB"), "🇬🇧");
        assert_eq!(country_flag("us"), "🇺🇸");
        assert_eq!(country_flag(""), "");
    }
}

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Money;

static FREE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfree\b").expect("valid free regex"));

static SYMBOL_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<symbol>US\$|C\$|A\$|\$|€|£|¥)\s*(?P<amount>(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})(?P<extra>\d*)")
        .expect("valid symbol amount regex")
});

static AMOUNT_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<amount>(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})\s*(?P<code>USD|EUR|GBP|JPY|CAD|AUD)\b")
        .expect("valid amount code regex")
});

fn currency_for_symbol(symbol: &str) -> &'static str {
    match symbol {
        "€" => "EUR",
        "£" => "GBP",
        "¥" => "JPY",
        "C$" => "CAD",
        "A$" => "AUD",
        _ => "USD",
    }
}

fn cents(amount: &str) -> Option<u64> {
    let cleaned = amount.replace(',', "");
    let (whole, fraction) = cleaned.split_once('.')?;
    let whole: u64 = whole.parse().ok()?;
    let fraction: u64 = fraction.parse().ok()?;
    whole.checked_mul(100)?.checked_add(fraction)
}

/// Parses a store price: a "free" marker, `$1,299.00`, `€19.99` or `19.99 USD`.
///
/// Amounts need exactly two decimal digits; thousands separators are optional.
pub fn parse_money(raw: &str) -> Option<Money> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if FREE.is_match(text) {
        return Some(Money::Free);
    }
    // A third decimal digit means the amount is not a price.
    let symbol_amount = SYMBOL_AMOUNT
        .captures_iter(text)
        .find(|cap| cap["extra"].is_empty());
    if let Some(cap) = symbol_amount {
        let symbol = cap["symbol"].to_string();
        return Some(Money::Priced {
            cents: cents(&cap["amount"])?,
            currency: currency_for_symbol(&symbol).to_string(),
            symbol: Some(symbol),
        });
    }
    if let Some(cap) = AMOUNT_CODE.captures(text) {
        return Some(Money::Priced {
            cents: cents(&cap["amount"])?,
            currency: cap["code"].to_string(),
            symbol: None,
        });
    }
    None
}

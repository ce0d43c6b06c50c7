//! Price parsing and display.
//!
//! WooGraphQL returns prices as pre-formatted strings rather than numbers:
//!
//! ```text
//! "$19.99"
//! "&#36;19.99"               (HTML entity encoded currency symbol)
//! "$10.00 - $20.00"          (variable products report a range)
//! "&#36;5.00&nbsp;-&nbsp;&#36;9.00"
//! "1,299.00"
//! "$.99"
//! "10,50 €"                  (comma as decimal separator)
//! "1.299,00 €"
//! ```
//!
//! [`parse_lowest_price`] extracts the first (lowest) amount from any of these
//! shapes so that filtering and sorting work on real decimals.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Matches HTML character references such as `&#36;`, `&#x24;` or `&nbsp;`.
static HTML_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid entity regex")
});

/// Matches one amount: digits with `.`/`,` separators, optionally starting
/// with the decimal separator.
static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.,]?\d(?:[\d.,]*\d)?").expect("valid amount regex")
});

/// Errors that can occur when parsing a price string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// The string was empty or whitespace only.
    #[error("price is empty")]
    Empty,
    /// No numeric amount could be found in the string.
    #[error("no amount found in price {0:?}")]
    NoAmount(String),
    /// An amount was found but is not a valid decimal.
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
}

/// Parse the lowest bound of a possibly ranged, possibly formatted price string.
///
/// `"$10 - $20"` parses as `10`, `"&#36;1,299.50"` as `1299.50`.
///
/// # Errors
///
/// Returns `PriceError` if the string is empty or carries no parseable amount.
pub fn parse_lowest_price(raw: &str) -> Result<Decimal, PriceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PriceError::Empty);
    }

    let without_entities = HTML_ENTITY.replace_all(trimmed, " ");
    let amount = AMOUNT
        .find(&without_entities)
        .ok_or_else(|| PriceError::NoAmount(raw.to_string()))?;
    let amount = normalize_amount(amount.as_str());

    amount
        .parse::<Decimal>()
        .map_err(|_| PriceError::InvalidAmount(amount.clone()))
}

/// Whether a formatted price string holds a range (`"$10 - $20"`), in any
/// separator or entity encoding WooCommerce emits.
#[must_use]
pub fn is_price_range(raw: &str) -> bool {
    let without_entities = HTML_ENTITY.replace_all(raw, " ");
    AMOUNT.find_iter(&without_entities).nth(1).is_some()
}

/// Rewrite a matched amount with `.` as the only separator.
///
/// The last separator is the decimal point when it leads the amount or is
/// followed by one or two digits. Every other separator groups thousands.
fn normalize_amount(amount: &str) -> String {
    let decimal_at = amount
        .rfind(['.', ','])
        .filter(|&i| i == 0 || (1..=2).contains(&(amount.len() - i - 1)));

    let mut normalized: String = amount
        .char_indices()
        .filter_map(|(i, c)| match c {
            '.' | ',' if Some(i) == decimal_at => Some('.'),
            '.' | ',' => None,
            digit => Some(digit),
        })
        .collect();

    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }
    normalized
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}{:.2}",
            self.currency_code.symbol(),
            self.amount.round_dp(2)
        )
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes supported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Currency symbol used when formatting amounts.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

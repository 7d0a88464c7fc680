//! Quote types for the QuoteBoard service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::time::{now, Timestamp};

/// One source's reported buy/sell price pair at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Stable source identifier (canonical URL).
    pub source: String,
    /// Price the source buys at.
    #[serde(with = "rust_decimal::serde::float")]
    pub buy_price: Decimal,
    /// Price the source sells at.
    #[serde(with = "rust_decimal::serde::float")]
    pub sell_price: Decimal,
    /// When this quote was fetched.
    pub fetched_at: Timestamp,
}

impl Quote {
    /// Create a new quote fetched now.
    pub fn new(source: impl Into<String>, buy_price: Decimal, sell_price: Decimal) -> Self {
        Self {
            source: source.into(),
            buy_price,
            sell_price,
            fetched_at: now(),
        }
    }

    /// Sell below buy is anomalous for a currency desk. Expected but not
    /// enforced; callers decide whether to log or reject.
    pub fn has_inverted_spread(&self) -> bool {
        self.sell_price < self.buy_price
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: buy {} / sell {}",
            self.source, self.buy_price, self.sell_price
        )
    }
}

/// The complete set of quotes from one refresh cycle, in adapter completion
/// order.
pub type QuoteBatch = Vec<Quote>;

/// Mean prices across the current batch, derived on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub average_buy_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_sell_price: Decimal,
    /// Number of sources contributing to the averages. Zero is the explicit
    /// "no data" marker, not an error.
    pub sources_count: usize,
    pub computed_at: Timestamp,
}

impl AggregateStats {
    /// Stats for an empty batch: zero averages, zero sources.
    pub fn empty() -> Self {
        Self {
            average_buy_price: Decimal::ZERO,
            average_sell_price: Decimal::ZERO,
            sources_count: 0,
            computed_at: now(),
        }
    }

    /// Whether any source contributed to the averages.
    pub fn has_data(&self) -> bool {
        self.sources_count > 0
    }
}

/// Percentage deviation of a single source's prices from the cross-source
/// mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlippageRecord {
    pub source: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub buy_price_slippage_pct: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub sell_price_slippage_pct: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub original_buy_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub original_sell_price: Decimal,
}

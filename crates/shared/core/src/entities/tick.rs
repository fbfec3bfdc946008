use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order book level (price + quantity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Decimal,
    pub quantity: Decimal,
}

impl BookLevel {
    /// Create a new book level
    pub fn new(price: Decimal, quantity: Decimal) -> Self {
        Self { price, quantity }
    }
}

/// Market tick as delivered by the engine.
///
/// Ticks are passed to the subscribed handler verbatim, at most once per
/// callback, with no ordering or dedup guarantee beyond the engine's own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub datetime: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub turnover: Decimal,
    /// Best bid levels, closest to the touch first
    #[serde(default)]
    pub bids: Vec<BookLevel>,
    /// Best ask levels, closest to the touch first
    #[serde(default)]
    pub asks: Vec<BookLevel>,
}

impl Tick {
    /// Best bid, if the engine delivered book depth
    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.bids.first()
    }

    /// Best ask, if the engine delivered book depth
    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.asks.first()
    }
}

//! Feed records consumed by the engine and top-of-book results it produces

use crate::level::Level;
use crate::symbol::Symbol;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One snapshot-or-update row of the upstream depth feed
///
/// Whether a record is applied as a snapshot or a diff is decided by the
/// replay, not by the record itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedRecord {
    /// Instrument symbol
    pub symbol: Symbol,
    /// Event time in seconds
    pub time: f64,
    /// Bid level updates (quantity 0 removes the level)
    #[serde(default)]
    pub bids: Vec<Level>,
    /// Ask level updates (quantity 0 removes the level)
    #[serde(default)]
    pub asks: Vec<Level>,
}

impl FeedRecord {
    /// Create a new record
    pub fn new(symbol: impl Into<Symbol>, time: f64, bids: Vec<Level>, asks: Vec<Level>) -> Self {
        Self {
            symbol: symbol.into(),
            time,
            bids,
            asks,
        }
    }

    /// Returns true if the record carries no level updates
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Total number of level updates in the record
    pub fn update_count(&self) -> usize {
        self.bids.len() + self.asks.len()
    }
}

/// Best N levels of each side, in priority order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopOfBook {
    /// Bid levels, highest price first
    pub bids: Vec<Level>,
    /// Ask levels, lowest price first
    pub asks: Vec<Level>,
}

impl TopOfBook {
    /// Create from already ordered levels
    pub fn new(bids: Vec<Level>, asks: Vec<Level>) -> Self {
        Self { bids, asks }
    }

    /// Get the best bid price
    pub fn best_bid_price(&self) -> Option<Decimal> {
        self.bids.first().map(|l| l.price)
    }

    /// Get the best ask price
    pub fn best_ask_price(&self) -> Option<Decimal> {
        self.asks.first().map(|l| l.price)
    }

    /// Get the spread (may be negative for a crossed feed)
    pub fn spread(&self) -> Option<Decimal> {
        self.best_ask_price()?.checked_sub(self.best_bid_price()?)
    }

    /// Get the mid price
    pub fn mid_price(&self) -> Option<Decimal> {
        let sum = self.best_ask_price()?.checked_add(self.best_bid_price()?)?;
        Some(sum / Decimal::TWO)
    }

    /// Returns true if both sides are empty
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_record_from_json() {
        let json = r#"{
            "symbol": "BTC/USD",
            "time": 1700000000.25,
            "bids": [[112300.0, 0.5], [112299.5, 1]],
            "asks": []
        }"#;
        let record: FeedRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.symbol.as_str(), "BTC/USD");
        assert_eq!(record.time, 1700000000.25);
        assert_eq!(record.bids.len(), 2);
        assert_eq!(record.bids[1], Level::new(dec!(112299.5), dec!(1)));
        assert!(record.asks.is_empty());
        assert_eq!(record.update_count(), 2);
    }

    #[test]
    fn test_record_missing_sides_default_empty() {
        let record: FeedRecord = serde_json::from_str(r#"{"symbol": "X", "time": 1}"#).unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_top_of_book_helpers() {
        let top = TopOfBook::new(
            vec![Level::new(dec!(100), dec!(1))],
            vec![Level::new(dec!(102), dec!(1))],
        );

        assert_eq!(top.spread(), Some(dec!(2)));
        assert_eq!(top.mid_price(), Some(dec!(101)));
        assert!(!top.is_empty());
        assert_eq!(TopOfBook::default().spread(), None);
    }
}

//! Common fixtures for depth-book integration tests

#![allow(dead_code)]

use depth_book::{Orientation, PriceLevelSide};
use depth_types::{FeedRecord, Level};
use rust_decimal::Decimal;

pub const SYMBOL: &str = "BTC/USD";

/// Levels from `(price, qty)` decimal pairs
pub fn levels(pairs: &[(Decimal, Decimal)]) -> Vec<Level> {
    pairs.iter().map(|&(p, q)| Level::new(p, q)).collect()
}

/// Feed record for [`SYMBOL`]
pub fn record(time: f64, bids: &[(Decimal, Decimal)], asks: &[(Decimal, Decimal)]) -> FeedRecord {
    FeedRecord::new(SYMBOL, time, levels(bids), levels(asks))
}

/// Small deterministic generator so property-style tests stay reproducible
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    /// Price on a 0.5 tick grid between 90 and 110
    pub fn price(&mut self) -> Decimal {
        Decimal::from(180 + (self.next_u64() % 41) as i64) / Decimal::TWO
    }

    /// Quantity in 0..=4, zero roughly one time in five
    pub fn qty(&mut self) -> Decimal {
        Decimal::from((self.next_u64() % 5) as i64)
    }
}

/// Assert the side's ordering and positivity invariants
pub fn assert_side_invariants<O: Orientation>(side: &PriceLevelSide<O>) {
    let levels: Vec<Level> = side.iter().collect();
    for pair in levels.windows(2) {
        assert!(
            O::at_or_better(pair[0].price, pair[1].price) && pair[0].price != pair[1].price,
            "levels out of order: {:?} then {:?}",
            pair[0],
            pair[1]
        );
    }
    for level in &levels {
        assert!(level.qty > Decimal::ZERO, "non-positive level {level:?}");
    }
    assert_eq!(levels.len(), side.len());
}

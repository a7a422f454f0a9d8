//! BTreeMap-based storage for one side of the book
//!
//! Provides O(log N) level upsert and lookup. Both sides share one container,
//! [`PriceLevelSide`], parameterized by an [`Orientation`] that maps prices to
//! map keys: asks use the price directly (ascending), bids use
//! `Reverse<Decimal>` (descending). Iteration therefore always yields the best
//! level first, and "at or better than" is a single key comparison.

use depth_types::{BookError, BookResult, BookSide, Level};
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

/// Quantities at or below this are treated as zero.
///
/// Every "level exhausted / remaining quantity consumed" check goes through
/// this constant.
pub const QTY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 15);

/// Returns true if `qty` is indistinguishable from zero
#[inline]
pub fn is_negligible(qty: Decimal) -> bool {
    qty <= QTY_TOLERANCE
}

/// Sum decimals, failing instead of panicking past `Decimal::MAX`
fn checked_sum(
    values: impl IntoIterator<Item = Option<Decimal>>,
    operation: &'static str,
) -> BookResult<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value?))
        .ok_or(BookError::overflow(operation))
}

/// Sort orientation of a book side
pub trait Orientation: fmt::Debug + Clone + Copy + Default + Send + Sync + 'static {
    /// Map key whose natural order is best-first
    type Key: Ord + Copy + fmt::Debug + Send + Sync;

    /// Which side of the book this orientation describes
    const SIDE: BookSide;

    /// Map a price to its key
    fn key(price: Decimal) -> Self::Key;

    /// Recover the price from a key
    fn price(key: &Self::Key) -> Decimal;

    /// Returns true if `price` is at or better than `threshold` on this side
    #[inline]
    fn at_or_better(price: Decimal, threshold: Decimal) -> bool {
        Self::key(price) <= Self::key(threshold)
    }
}

/// Ask orientation: lowest price first
#[derive(Debug, Clone, Copy, Default)]
pub struct Ascending;

impl Orientation for Ascending {
    type Key = Decimal;
    const SIDE: BookSide = BookSide::Ask;

    #[inline]
    fn key(price: Decimal) -> Decimal {
        price
    }

    #[inline]
    fn price(key: &Decimal) -> Decimal {
        *key
    }
}

/// Bid orientation: highest price first
#[derive(Debug, Clone, Copy, Default)]
pub struct Descending;

impl Orientation for Descending {
    type Key = Reverse<Decimal>;
    const SIDE: BookSide = BookSide::Bid;

    #[inline]
    fn key(price: Decimal) -> Reverse<Decimal> {
        Reverse(price)
    }

    #[inline]
    fn price(key: &Reverse<Decimal>) -> Decimal {
        key.0
    }
}

/// Bid side of a book
pub type BidSide = PriceLevelSide<Descending>;

/// Ask side of a book
pub type AskSide = PriceLevelSide<Ascending>;

/// Aggregated price levels for one side of the book
///
/// Invariants: prices are strictly ordered best-first with no duplicates,
/// and every stored quantity is above [`QTY_TOLERANCE`].
#[derive(Debug, Clone, Default)]
pub struct PriceLevelSide<O: Orientation> {
    levels: BTreeMap<O::Key, Decimal>,
}

impl<O: Orientation> PriceLevelSide<O> {
    /// Create a new empty side
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Which side of the book this is
    pub fn side(&self) -> BookSide {
        O::SIDE
    }

    /// Set the aggregate quantity at `price`
    ///
    /// A negligible quantity removes the level (no-op if absent).
    pub fn upsert(&mut self, price: Decimal, qty: Decimal) {
        if is_negligible(qty) {
            self.levels.remove(&O::key(price));
        } else {
            self.levels.insert(O::key(price), qty);
        }
    }

    /// Add `qty` on top of whatever rests at `price`; returns the new level quantity
    ///
    /// The level is left untouched if the sum overflows.
    pub fn add(&mut self, price: Decimal, qty: Decimal) -> BookResult<Decimal> {
        let total = self
            .quantity_at(price)
            .unwrap_or(Decimal::ZERO)
            .checked_add(qty)
            .ok_or(BookError::overflow("level quantity"))?;
        self.upsert(price, total);
        Ok(self.quantity_at(price).unwrap_or(Decimal::ZERO))
    }

    /// Take `qty` off the level at `price`; returns what is left there
    ///
    /// The level is removed once its remainder is negligible.
    pub fn reduce(&mut self, price: Decimal, qty: Decimal) -> Decimal {
        let remainder = self
            .quantity_at(price)
            .unwrap_or(Decimal::ZERO)
            .saturating_sub(qty);
        self.upsert(price, remainder);
        self.quantity_at(price).unwrap_or(Decimal::ZERO)
    }

    /// Remove a level by price
    pub fn remove(&mut self, price: Decimal) -> Option<Decimal> {
        self.levels.remove(&O::key(price))
    }

    /// Quantity resting at an exact price
    pub fn quantity_at(&self, price: Decimal) -> Option<Decimal> {
        self.levels.get(&O::key(price)).copied()
    }

    /// Best level (lowest ask / highest bid)
    pub fn best(&self) -> Option<Level> {
        self.levels
            .iter()
            .next()
            .map(|(key, qty)| Level::new(O::price(key), *qty))
    }

    /// Best price
    pub fn best_price(&self) -> Option<Decimal> {
        self.levels.keys().next().map(O::price)
    }

    /// Sum of price × quantity over every level at or better than `threshold`
    ///
    /// Asks: price <= threshold. Bids: price >= threshold. Fails with
    /// [`BookError::Overflow`] if a product or the running sum leaves the
    /// `Decimal` range.
    pub fn notional_ahead_of(&self, threshold: Decimal) -> BookResult<Decimal> {
        checked_sum(
            self.levels
                .range(..=O::key(threshold))
                .map(|(key, qty)| O::price(key).checked_mul(*qty)),
            "notional ahead",
        )
    }

    /// Sum of quantity over every level at or better than `threshold`
    pub fn quantity_ahead_of(&self, threshold: Decimal) -> BookResult<Decimal> {
        checked_sum(
            self.levels.range(..=O::key(threshold)).map(|(_, qty)| Some(*qty)),
            "quantity ahead",
        )
    }

    /// First `n` levels in priority order
    pub fn best_n(&self, n: usize) -> Vec<Level> {
        self.iter().take(n).collect()
    }

    /// Iterator over levels, best first
    pub fn iter(&self) -> impl Iterator<Item = Level> + '_ {
        self.levels
            .iter()
            .map(|(key, qty)| Level::new(O::price(key), *qty))
    }

    /// Total resting quantity on this side
    pub fn total_quantity(&self) -> BookResult<Decimal> {
        checked_sum(self.levels.values().copied().map(Some), "total quantity")
    }

    /// Number of price levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Check if the side is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Clear all levels
    pub fn clear(&mut self) {
        self.levels.clear();
    }
}

impl<O: Orientation> Extend<Level> for PriceLevelSide<O> {
    fn extend<T: IntoIterator<Item = Level>>(&mut self, iter: T) {
        for level in iter {
            self.upsert(level.price, level.qty);
        }
    }
}

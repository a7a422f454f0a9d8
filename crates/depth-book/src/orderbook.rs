//! Aggregated order book for a single instrument
//!
//! Applies full snapshots and incremental diffs, and answers the point
//! queries: top-N, notional ahead of a price, and limit order crossing.
//!
//! A crossed book (best bid >= best ask) is accepted as-is; it reflects what
//! the feed reported.

use crate::ladder::{is_negligible, AskSide, BidSide};
use crate::matching::{sweep, LimitOrderOutcome};
use depth_types::{BookError, BookResult, BookSide, Level, OrderSide, TopOfBook};
use rust_decimal::Decimal;
use tracing::debug;

/// Default number of levels reported per side
pub const DEFAULT_DEPTH: usize = 10;

/// Order book for one instrument
#[derive(Debug, Clone)]
pub struct OrderBook {
    /// Symbol for this orderbook
    symbol: String,
    /// Bid levels, highest first
    bids: BidSide,
    /// Ask levels, lowest first
    asks: AskSide,
    /// Levels per side reported by [`OrderBook::top`]
    depth: usize,
}

impl OrderBook {
    /// Create a new empty orderbook for a symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_depth(symbol, DEFAULT_DEPTH)
    }

    /// Create with a specific reporting depth
    pub fn with_depth(symbol: impl Into<String>, depth: usize) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BidSide::new(),
            asks: AskSide::new(),
            depth,
        }
    }

    /// Get the symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Get the reporting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Bid side
    pub fn bids(&self) -> &BidSide {
        &self.bids
    }

    /// Ask side
    pub fn asks(&self) -> &AskSide {
        &self.asks
    }

    /// Get the best bid
    pub fn best_bid(&self) -> Option<Level> {
        self.bids.best()
    }

    /// Get the best ask
    pub fn best_ask(&self) -> Option<Level> {
        self.asks.best()
    }

    /// Get the spread (ask - bid)
    pub fn spread(&self) -> Option<Decimal> {
        self.asks.best_price()?.checked_sub(self.bids.best_price()?)
    }

    /// Get the mid price ((ask + bid) / 2)
    pub fn mid_price(&self) -> Option<Decimal> {
        let sum = self.asks.best_price()?.checked_add(self.bids.best_price()?)?;
        Some(sum / Decimal::TWO)
    }

    /// Returns true if the best bid is at or above the best ask
    pub fn is_crossed(&self) -> bool {
        matches!(
            (self.bids.best_price(), self.asks.best_price()),
            (Some(bid), Some(ask)) if bid >= ask
        )
    }

    /// Number of bid levels
    pub fn bid_count(&self) -> usize {
        self.bids.len()
    }

    /// Number of ask levels
    pub fn ask_count(&self) -> usize {
        self.asks.len()
    }

    /// Check if both sides are empty
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Replace the whole book with the given levels
    ///
    /// Levels with a non-positive quantity produce no entry.
    pub fn apply_snapshot(&mut self, bids: &[Level], asks: &[Level]) {
        self.bids.clear();
        self.asks.clear();
        self.apply_diff(bids, asks);

        debug!(
            symbol = %self.symbol,
            bids = self.bids.len(),
            asks = self.asks.len(),
            "applied snapshot"
        );
    }

    /// Upsert the given levels on top of the current state
    pub fn apply_diff(&mut self, bids: &[Level], asks: &[Level]) {
        self.bids.extend(bids.iter().copied());
        self.asks.extend(asks.iter().copied());
    }

    /// Best `n` levels of each side
    pub fn top_n(&self, n: usize) -> TopOfBook {
        TopOfBook::new(self.bids.best_n(n), self.asks.best_n(n))
    }

    /// Best levels of each side at the configured depth
    pub fn top(&self) -> TopOfBook {
        self.top_n(self.depth)
    }

    /// Every level of both sides
    pub fn full_depth(&self) -> TopOfBook {
        TopOfBook::new(self.bids.iter().collect(), self.asks.iter().collect())
    }

    /// Notional resting at or better than `price` on the side named by `side`
    ///
    /// Accepts `bid`/`bids`/`buy` and `ask`/`asks`/`sell`, case-insensitively.
    pub fn notional_ahead(&self, side: &str, price: Decimal) -> BookResult<Decimal> {
        self.notional_ahead_on(side.parse()?, price)
    }

    /// Typed variant of [`OrderBook::notional_ahead`]
    pub fn notional_ahead_on(&self, side: BookSide, price: Decimal) -> BookResult<Decimal> {
        match side {
            BookSide::Bid => self.bids.notional_ahead_of(price),
            BookSide::Ask => self.asks.notional_ahead_of(price),
        }
    }

    /// Cross a limit order against the live book and return the new top
    ///
    /// This mutates the book: consumed levels are reduced or removed and any
    /// residual rests at the limit price. Accepts `buy`/`bid` and
    /// `sell`/`ask`. A non-positive quantity leaves the book untouched.
    pub fn simulate_limit_order(
        &mut self,
        side: &str,
        price: Decimal,
        quantity: Decimal,
    ) -> BookResult<TopOfBook> {
        let side: OrderSide = side.parse()?;
        self.place_limit_order(side, price, quantity)?;
        Ok(self.top_n(DEFAULT_DEPTH))
    }

    /// Cross a limit order against the live book
    ///
    /// Fails with [`BookError::Overflow`], before any level is touched, if
    /// the full quantity could not rest on top of the level already at
    /// `price`.
    pub fn place_limit_order(
        &mut self,
        side: OrderSide,
        price: Decimal,
        quantity: Decimal,
    ) -> BookResult<LimitOrderOutcome> {
        if quantity <= Decimal::ZERO {
            return Ok(LimitOrderOutcome {
                side,
                price,
                quantity,
                fills: Vec::new(),
                rested: Decimal::ZERO,
                top: self.top(),
            });
        }

        let resting = match side.resting_side() {
            BookSide::Bid => self.bids.quantity_at(price),
            BookSide::Ask => self.asks.quantity_at(price),
        };
        if resting.unwrap_or(Decimal::ZERO).checked_add(quantity).is_none() {
            return Err(BookError::overflow("limit order residual"));
        }

        let (fills, remaining) = match side {
            OrderSide::Buy => sweep(&mut self.asks, price, quantity),
            OrderSide::Sell => sweep(&mut self.bids, price, quantity),
        };

        let rested = if is_negligible(remaining) {
            Decimal::ZERO
        } else {
            match side.resting_side() {
                BookSide::Bid => self.bids.add(price, remaining)?,
                BookSide::Ask => self.asks.add(price, remaining)?,
            };
            remaining
        };

        debug!(
            symbol = %self.symbol,
            %side,
            %price,
            %quantity,
            fills = fills.len(),
            %rested,
            "limit order crossed"
        );

        Ok(LimitOrderOutcome {
            side,
            price,
            quantity,
            fills,
            rested,
            top: self.top(),
        })
    }

    /// Outcome the order would have, without touching the live book
    pub fn preview_limit_order(
        &self,
        side: OrderSide,
        price: Decimal,
        quantity: Decimal,
    ) -> BookResult<LimitOrderOutcome> {
        self.clone().place_limit_order(side, price, quantity)
    }

    /// Clear both sides
    pub fn reset(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }
}

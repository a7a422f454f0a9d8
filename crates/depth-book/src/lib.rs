//! Aggregated limit order book engine
//!
//! This crate maintains per-instrument order books from snapshot and diff
//! events and answers point queries against them. It performs no I/O: feed
//! parsing and result export live in `depth-feed`.
//!
//! # Example
//!
//! ```
//! use depth_book::OrderBook;
//! use depth_types::Level;
//! use rust_decimal_macros::dec;
//!
//! let mut book = OrderBook::new("BTC/USD");
//! book.apply_snapshot(
//!     &[Level::new(dec!(99), dec!(1))],
//!     &[Level::new(dec!(100), dec!(1)), Level::new(dec!(101), dec!(2))],
//! );
//!
//! assert_eq!(book.notional_ahead("ask", dec!(101)).unwrap(), dec!(302));
//!
//! let top = book.simulate_limit_order("buy", dec!(100), dec!(3)).unwrap();
//! assert_eq!(top.bids[0], Level::new(dec!(100), dec!(2)));
//! ```

pub mod engine;
pub mod ladder;
pub mod matching;
pub mod orderbook;

// Re-export main types
pub use engine::{BookEngine, EngineConfig, ReplayStats};
pub use ladder::{
    is_negligible, AskSide, Ascending, BidSide, Descending, Orientation, PriceLevelSide,
    QTY_TOLERANCE,
};
pub use matching::LimitOrderOutcome;
pub use orderbook::{OrderBook, DEFAULT_DEPTH};

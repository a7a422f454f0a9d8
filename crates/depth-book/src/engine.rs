//! Per-instrument book registry and feed replay
//!
//! The engine owns one [`OrderBook`] per symbol. Replay policy lives here, not
//! in the book: within one [`BookEngine::build_until`] call the first record
//! for the requested symbol replaces the book as a snapshot and every later
//! record is applied as a diff.

use crate::orderbook::{OrderBook, DEFAULT_DEPTH};
use depth_types::{BookError, BookResult, FeedRecord, Symbol, TopOfBook};
use std::collections::HashMap;
use std::convert::Infallible;
use tracing::{debug, info, instrument, warn};

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Levels per side returned by replay and held as each book's reporting depth
    pub depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
        }
    }
}

impl EngineConfig {
    /// Set the reporting depth
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> BookResult<()> {
        if self.depth == 0 {
            return Err(BookError::InvalidArgument(
                "depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Summary of the most recent replay
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReplayStats {
    /// Records for the symbol that were applied
    pub records_applied: usize,
    /// Records for other symbols that were skipped
    pub records_skipped: usize,
    /// Timestamp of the last applied record
    pub last_time: Option<f64>,
    /// True if replay stopped on a record at or past the horizon
    pub reached_horizon: bool,
}

/// Registry of order books keyed by symbol
///
/// Books are created on the first record seen for a symbol and live as long
/// as the engine. Independent engines share nothing.
#[derive(Debug, Default)]
pub struct BookEngine {
    books: HashMap<Symbol, OrderBook>,
    config: EngineConfig,
    last_replay: Option<ReplayStats>,
}

impl BookEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a validated configuration
    pub fn with_config(config: EngineConfig) -> BookResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replay `records` into the book for `symbol` until `horizon`
    ///
    /// Records for other symbols are skipped. The first record at or after
    /// `horizon` is applied before stopping. A source error aborts the replay
    /// and is returned unchanged; records applied before it stay applied.
    #[instrument(skip(self, records))]
    pub fn build_until<I, E>(
        &mut self,
        symbol: &str,
        horizon: f64,
        records: I,
    ) -> Result<TopOfBook, E>
    where
        I: IntoIterator<Item = Result<FeedRecord, E>>,
    {
        let mut stats = ReplayStats::default();

        for record in records {
            let record = record?;
            if record.symbol.as_str() != symbol {
                stats.records_skipped += 1;
                continue;
            }

            if let Some(last) = stats.last_time {
                if record.time < last {
                    warn!(last, time = record.time, "feed record out of order");
                }
            }

            let book = self.book_entry(symbol);
            if stats.records_applied == 0 {
                book.apply_snapshot(&record.bids, &record.asks);
            } else {
                book.apply_diff(&record.bids, &record.asks);
            }
            stats.records_applied += 1;
            stats.last_time = Some(record.time);

            if record.time >= horizon {
                debug!(time = record.time, horizon, "horizon reached");
                stats.reached_horizon = true;
                break;
            }
        }

        info!(
            applied = stats.records_applied,
            skipped = stats.records_skipped,
            reached_horizon = stats.reached_horizon,
            "replay finished"
        );
        self.last_replay = Some(stats);

        Ok(self
            .books
            .get(symbol)
            .map(|book| book.top_n(self.config.depth))
            .unwrap_or_default())
    }

    /// [`BookEngine::build_until`] over an in-memory stream that cannot fail
    pub fn replay_until<I>(&mut self, symbol: &str, horizon: f64, records: I) -> TopOfBook
    where
        I: IntoIterator<Item = FeedRecord>,
    {
        match self.build_until(symbol, horizon, records.into_iter().map(Ok::<_, Infallible>)) {
            Ok(top) => top,
            Err(never) => match never {},
        }
    }

    /// Live book for a symbol
    pub fn reference(&self, symbol: &str) -> BookResult<&OrderBook> {
        self.books
            .get(symbol)
            .ok_or_else(|| BookError::not_found(symbol))
    }

    /// Live book for a symbol, for queries that mutate it
    pub fn reference_mut(&mut self, symbol: &str) -> BookResult<&mut OrderBook> {
        self.books
            .get_mut(symbol)
            .ok_or_else(|| BookError::not_found(symbol))
    }

    /// Statistics of the most recent replay
    pub fn last_replay(&self) -> Option<&ReplayStats> {
        self.last_replay.as_ref()
    }

    /// Symbols with a book
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.books.keys()
    }

    /// Number of books
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Check if no book exists yet
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    fn book_entry(&mut self, symbol: &str) -> &mut OrderBook {
        let depth = self.config.depth;
        self.books
            .entry(Symbol::from(symbol))
            .or_insert_with(|| OrderBook::with_depth(symbol, depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depth_types::Level;
    use rust_decimal_macros::dec;

    fn record(symbol: &str, time: f64, bids: &[(f64, f64)], asks: &[(f64, f64)]) -> FeedRecord {
        FeedRecord::new(
            symbol,
            time,
            bids.iter().map(|&(p, q)| Level::from_f64(p, q)).collect(),
            asks.iter().map(|&(p, q)| Level::from_f64(p, q)).collect(),
        )
    }

    #[test]
    fn test_config_validation() {
        assert!(EngineConfig::default().validate().is_ok());
        assert_eq!(EngineConfig::default().depth, 10);

        let err = BookEngine::with_config(EngineConfig::default().with_depth(0)).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_first_record_is_snapshot() {
        let mut engine = BookEngine::new();
        engine.replay_until("BTC/USD", 10.0, vec![record("BTC/USD", 1.0, &[(100.0, 1.0)], &[])]);

        // second call starts from a fresh snapshot
        let top = engine.replay_until(
            "BTC/USD",
            10.0,
            vec![record("BTC/USD", 2.0, &[(90.0, 1.0)], &[(91.0, 2.0)])],
        );

        assert_eq!(top.bids, vec![Level::new(dec!(90), dec!(1))]);
        assert_eq!(top.asks, vec![Level::new(dec!(91), dec!(2))]);
    }

    #[test]
    fn test_other_symbols_are_skipped() {
        let mut engine = BookEngine::new();
        let top = engine.replay_until(
            "ETH/USD",
            10.0,
            vec![
                record("BTC/USD", 1.0, &[(100.0, 1.0)], &[]),
                record("ETH/USD", 2.0, &[(3000.0, 1.0)], &[]),
                record("BTC/USD", 3.0, &[(101.0, 1.0)], &[]),
            ],
        );

        assert_eq!(top.best_bid_price(), Some(dec!(3000)));
        assert_eq!(engine.len(), 1);
        assert!(engine.reference("BTC/USD").unwrap_err().is_not_found());

        let stats = engine.last_replay().unwrap();
        assert_eq!(stats.records_applied, 1);
        assert_eq!(stats.records_skipped, 2);
        assert!(!stats.reached_horizon);
    }

    #[test]
    fn test_unknown_symbol_not_found() {
        let mut engine = BookEngine::new();
        let top = engine.replay_until("BTC/USD", 10.0, Vec::new());

        assert!(top.is_empty());
        assert!(engine.is_empty());
        assert!(matches!(
            engine.reference("BTC/USD"),
            Err(BookError::NotFound { .. })
        ));
        assert!(engine.reference_mut("BTC/USD").is_err());
    }

    #[test]
    fn test_source_error_propagates() {
        let mut engine = BookEngine::new();
        let records: Vec<Result<FeedRecord, String>> = vec![
            Ok(record("BTC/USD", 1.0, &[(100.0, 1.0)], &[])),
            Err("bad row".to_string()),
            Ok(record("BTC/USD", 2.0, &[(101.0, 1.0)], &[])),
        ];

        let err = engine.build_until("BTC/USD", 10.0, records).unwrap_err();
        assert_eq!(err, "bad row");

        // first record stays applied
        let book = engine.reference("BTC/USD").unwrap();
        assert_eq!(book.best_bid().unwrap().price, dec!(100));
    }

    #[test]
    fn test_configured_depth_applies_to_books() {
        let mut engine = BookEngine::with_config(EngineConfig::default().with_depth(1)).unwrap();
        let top = engine.replay_until(
            "BTC/USD",
            10.0,
            vec![record("BTC/USD", 1.0, &[(100.0, 1.0), (99.0, 1.0)], &[])],
        );

        assert_eq!(top.bids.len(), 1);
        assert_eq!(engine.reference("BTC/USD").unwrap().depth(), 1);
    }

    #[test]
    fn test_independent_engines() {
        let mut a = BookEngine::new();
        let b = BookEngine::new();
        a.replay_until("BTC/USD", 1.0, vec![record("BTC/USD", 1.0, &[(1.0, 1.0)], &[])]);

        assert_eq!(a.symbols().count(), 1);
        assert!(b.is_empty());
    }
}

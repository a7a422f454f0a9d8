//! CSV depth feed reader
//!
//! Expected layout: a header row with at least `symbol`, `time`, `bids` and
//! `asks` columns (others are ignored). Level cells hold list literals such as
//! `[[112300.0, 0.5], [112299.5, 1.25]]`; quoted numbers, single quotes and
//! tuple parentheses are accepted. An empty cell or `[]` means no updates.

use crate::error::FeedError;
use depth_types::{FeedRecord, Level, Symbol};
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, trace};

/// Row as stored in the file, level cells still unparsed
#[derive(Debug, Deserialize)]
struct RawRow {
    symbol: String,
    time: String,
    #[serde(default)]
    bids: String,
    #[serde(default)]
    asks: String,
}

/// Streaming reader over a CSV depth feed
///
/// Yields one [`FeedRecord`] per data row, in file order. When constructed
/// with a symbol filter, rows for other symbols are skipped before their level
/// cells are parsed, so malformed rows of unrelated instruments do not abort
/// a replay.
pub struct FeedReader<R: io::Read> {
    rows: csv::DeserializeRecordsIntoIter<R, RawRow>,
    symbol: Option<String>,
    row: usize,
}

impl FeedReader<File> {
    /// Open a feed file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| FeedError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "opened feed");
        Ok(Self::new(reader))
    }
}

impl<R: io::Read> FeedReader<R> {
    /// Read a feed from any byte source
    pub fn from_reader(reader: R) -> Self {
        Self::new(
            csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_reader(reader),
        )
    }

    fn new(reader: csv::Reader<R>) -> Self {
        Self {
            rows: reader.into_deserialize(),
            symbol: None,
            row: 0,
        }
    }

    /// Only yield rows for `symbol`
    pub fn for_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    fn parse_row(&self, raw: RawRow) -> Result<FeedRecord, FeedError> {
        let time = raw
            .time
            .parse::<f64>()
            .map_err(|_| FeedError::InvalidTimestamp {
                row: self.row,
                value: raw.time.clone(),
            })?;
        let bids = parse_levels(&raw.bids).map_err(|message| FeedError::MalformedLevels {
            row: self.row,
            column: "bids",
            message,
        })?;
        let asks = parse_levels(&raw.asks).map_err(|message| FeedError::MalformedLevels {
            row: self.row,
            column: "asks",
            message,
        })?;

        Ok(FeedRecord {
            symbol: Symbol::new(raw.symbol),
            time,
            bids,
            asks,
        })
    }
}

impl<R: io::Read> Iterator for FeedReader<R> {
    type Item = Result<FeedRecord, FeedError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.rows.next()?;
            // Counts bad rows too, so later row numbers stay aligned with the file
            self.row += 1;
            let raw = match next {
                Ok(raw) => raw,
                Err(err) => return Some(Err(FeedError::Csv(err))),
            };

            if let Some(symbol) = &self.symbol {
                if raw.symbol != *symbol {
                    trace!(row = self.row, symbol = %raw.symbol, "skipping row");
                    continue;
                }
            }

            return Some(self.parse_row(raw));
        }
    }
}

/// Parse a level cell into levels
///
/// Returns a human readable message on failure.
pub fn parse_levels(cell: &str) -> Result<Vec<Level>, String> {
    let cell = cell.trim();
    if cell.is_empty() || cell == "[]" {
        return Ok(Vec::new());
    }

    let normalized: String = cell
        .chars()
        .map(|c| match c {
            '\'' => '"',
            '(' => '[',
            ')' => ']',
            other => other,
        })
        .collect();

    serde_json::from_str(&normalized).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const FEED: &str = "\
symbol,time,bids,asks,exchange
BTC/USD,1.0,\"[[100.0, 1.0], [99.5, 2]]\",\"[[101.0, 0.5]]\",x
ETH/USD,1.5,not a list,[],x
BTC/USD,2.0,[],\"[[101.0, 0]]\",x
";

    #[test]
    fn test_parse_levels_shapes() {
        assert!(parse_levels("").unwrap().is_empty());
        assert!(parse_levels(" [] ").unwrap().is_empty());

        let levels = parse_levels("[[100.5, 1], [99, 2.25]]").unwrap();
        assert_eq!(levels[0], Level::new(dec!(100.5), dec!(1)));
        assert_eq!(levels[1], Level::new(dec!(99), dec!(2.25)));

        let levels = parse_levels("[('100.5', '1'), (99, 5e-3)]").unwrap();
        assert_eq!(levels[0], Level::new(dec!(100.5), dec!(1)));
        assert_eq!(levels[1], Level::new(dec!(99), dec!(0.005)));
    }

    #[test]
    fn test_parse_levels_rejects_garbage() {
        assert!(parse_levels("[[1, 2, 3]]").is_err());
        assert!(parse_levels("[[1]]").is_err());
        assert!(parse_levels("hello").is_err());
    }

    #[test]
    fn test_reader_all_rows_reports_malformed() {
        let results: Vec<_> = FeedReader::from_reader(FEED.as_bytes()).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());

        let err = results[1].as_ref().unwrap_err();
        assert!(matches!(
            err,
            FeedError::MalformedLevels { row: 2, column: "bids", .. }
        ));
    }

    #[test]
    fn test_row_numbers_count_unreadable_rows() {
        let feed = "symbol,time,bids,asks\n\
                    BTC/USD,1.0,[],[],extra\n\
                    BTC/USD,later,[],[]\n";
        let results: Vec<_> = FeedReader::from_reader(feed.as_bytes()).collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(FeedError::Csv(_))));
        assert!(matches!(
            &results[1],
            Err(FeedError::InvalidTimestamp { row: 2, value }) if value == "later"
        ));
    }

    #[test]
    fn test_reader_symbol_filter_skips_before_parsing() {
        let records: Vec<FeedRecord> = FeedReader::from_reader(FEED.as_bytes())
            .for_symbol("BTC/USD")
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].time, 1.0);
        assert_eq!(records[0].bids.len(), 2);
        assert_eq!(records[0].asks[0], Level::new(dec!(101), dec!(0.5)));
        assert!(records[1].bids.is_empty());
        assert_eq!(records[1].asks[0].qty, dec!(0));
    }

    #[test]
    fn test_reader_invalid_time() {
        let feed = "symbol,time,bids,asks\nBTC/USD,later,[],[]\n";
        let err = FeedReader::from_reader(feed.as_bytes())
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, FeedError::InvalidTimestamp { row: 1, .. }));
    }

    #[test]
    fn test_reader_missing_column() {
        let feed = "symbol,bids,asks\nBTC/USD,[],[]\n";
        let err = FeedReader::from_reader(feed.as_bytes())
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, FeedError::Csv(_)));
    }
}

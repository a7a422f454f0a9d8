//! File I/O around the depth book
//!
//! [`FeedReader`] streams [`FeedRecord`](depth_types::FeedRecord)s out of a CSV
//! depth feed; the [`export`] helpers write top-of-book levels and a run
//! summary back out as CSV.
//!
//! # Example
//!
//! ```no_run
//! use depth_feed::FeedReader;
//!
//! let reader = FeedReader::from_path("orderbooks.csv")?.for_symbol("BTC/USD");
//! for record in reader {
//!     let record = record?;
//!     println!("{} {} bid updates", record.time, record.bids.len());
//! }
//! # Ok::<(), depth_feed::FeedError>(())
//! ```

pub mod error;
pub mod export;
pub mod reader;

pub use error::{ExportError, FeedError};
pub use export::{write_levels_csv, OutputPrefix, Summary, LEVEL_DECIMALS};
pub use reader::{parse_levels, FeedReader};

//! Command-line arguments

use anyhow::Result;
use clap::Parser;
use depth_book::EngineConfig;
use depth_types::{parse_decimal, BookError, BookSide, OrderSide, Symbol};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Replay a CSV depth feed into an order book and export the results
#[derive(Debug, Parser)]
#[command(name = "depthbook", version, about)]
pub struct Cli {
    /// Path to the order book CSV feed
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,

    /// Symbol to process, e.g. BTC/USD
    #[arg(long)]
    pub symbol: String,

    /// Timestamp (inclusive) to process up to
    #[arg(long, allow_negative_numbers = true)]
    pub until: f64,

    /// Output prefix for CSV files, e.g. results/run1
    #[arg(long, value_name = "PREFIX")]
    pub out_prefix: PathBuf,

    /// Report the notional resting ahead of PRICE on SIDE (e.g. bid 112300)
    #[arg(long, num_args = 2, value_names = ["SIDE", "PRICE"])]
    pub notional_ahead: Option<Vec<String>>,

    /// Cross a limit order against the book and export the new top levels
    #[arg(long, num_args = 3, value_names = ["SIDE", "PRICE", "QTY"])]
    pub place_limit: Option<Vec<String>>,

    /// Report the placement outcome without mutating the book
    #[arg(long, requires = "place_limit")]
    pub preview: bool,

    /// Levels per side in exported files
    #[arg(long, default_value_t = 10)]
    pub depth: usize,

    /// Log filter, overrides RUST_LOG (e.g. debug, depth_book=trace)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// `--notional-ahead` after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotionalRequest {
    /// Token as typed, echoed in the summary
    pub token: String,
    pub side: BookSide,
    pub price_text: String,
    pub price: Decimal,
}

/// `--place-limit` after validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceRequest {
    pub side: OrderSide,
    pub price: Decimal,
    pub quantity: Decimal,
}

fn parse_number(name: &str, text: &str) -> Result<Decimal, BookError> {
    parse_decimal(text).map_err(|err| {
        BookError::InvalidArgument(format!("{name} '{text}' is not a number: {err}"))
    })
}

impl Cli {
    pub fn symbol(&self) -> Result<Symbol, BookError> {
        self.symbol.parse()
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        let config = EngineConfig::default().with_depth(self.depth);
        config.validate()?;
        Ok(config)
    }

    pub fn notional_request(&self) -> Result<Option<NotionalRequest>, BookError> {
        match self.notional_ahead.as_deref() {
            Some([token, price]) => Ok(Some(NotionalRequest {
                token: token.clone(),
                side: token.parse()?,
                price_text: price.clone(),
                price: parse_number("price", price)?,
            })),
            Some(other) => Err(BookError::InvalidArgument(format!(
                "--notional-ahead takes SIDE PRICE, got {} values",
                other.len()
            ))),
            None => Ok(None),
        }
    }

    pub fn place_request(&self) -> Result<Option<PlaceRequest>, BookError> {
        match self.place_limit.as_deref() {
            Some([side, price, quantity]) => Ok(Some(PlaceRequest {
                side: side.parse()?,
                price: parse_number("price", price)?,
                quantity: parse_number("quantity", quantity)?,
            })),
            Some(other) => Err(BookError::InvalidArgument(format!(
                "--place-limit takes SIDE PRICE QTY, got {} values",
                other.len()
            ))),
            None => Ok(None),
        }
    }
}

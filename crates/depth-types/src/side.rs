//! Book side and order side enums

use crate::error::BookError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Side of the book a query addresses
///
/// Parsed case-insensitively from `bid`, `bids`, `buy` or `ask`, `asks`, `sell`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    /// Resting buy interest, best = highest price
    Bid,
    /// Resting sell interest, best = lowest price
    Ask,
}

impl BookSide {
    /// Returns the side name as used in exports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bid => "bid",
            Self::Ask => "ask",
        }
    }

    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Self::Bid => Self::Ask,
            Self::Ask => Self::Bid,
        }
    }
}

impl FromStr for BookSide {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bid" | "bids" | "buy" => Ok(Self::Bid),
            "ask" | "asks" | "sell" => Ok(Self::Ask),
            _ => Err(BookError::invalid_side(s, "bid/buy or ask/sell")),
        }
    }
}

impl fmt::Display for BookSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of an incoming limit order
///
/// Parsed case-insensitively from `buy`, `bid` or `sell`, `ask`.
/// The plural book tokens are not order sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy order, consumes asks
    Buy,
    /// Sell order, consumes bids
    Sell,
}

impl OrderSide {
    /// Returns the side name as used in exports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }

    /// Returns the opposite order side
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Book side where unfilled quantity of this order rests
    pub fn resting_side(&self) -> BookSide {
        match self {
            Self::Buy => BookSide::Bid,
            Self::Sell => BookSide::Ask,
        }
    }

    /// Book side this order trades against
    pub fn contra_side(&self) -> BookSide {
        self.resting_side().opposite()
    }
}

impl FromStr for OrderSide {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" | "bid" => Ok(Self::Buy),
            "sell" | "ask" => Ok(Self::Sell),
            _ => Err(BookError::invalid_side(s, "buy/bid or sell/ask")),
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

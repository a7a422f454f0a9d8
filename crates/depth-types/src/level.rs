//! Price level types with decimal precision

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// A single aggregated price level in the orderbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Level {
    /// Price of this level
    pub price: Decimal,
    /// Quantity resting at this price level
    pub qty: Decimal,
}

impl Level {
    /// Create a new price level
    pub fn new(price: Decimal, qty: Decimal) -> Self {
        Self { price, qty }
    }

    /// Create a level from f64 values (for testing)
    pub fn from_f64(price: f64, qty: f64) -> Self {
        use rust_decimal::prelude::FromPrimitive;
        Self {
            price: Decimal::from_f64(price).unwrap_or_default(),
            qty: Decimal::from_f64(qty).unwrap_or_default(),
        }
    }

    /// Notional value of this level (price × quantity)
    ///
    /// `None` if the product does not fit in a `Decimal`.
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(self.qty)
    }

    /// Check if this level has zero quantity
    pub fn is_zero(&self) -> bool {
        self.qty.is_zero()
    }
}

impl From<(Decimal, Decimal)> for Level {
    fn from((price, qty): (Decimal, Decimal)) -> Self {
        Self::new(price, qty)
    }
}

/// Wire shapes accepted for a level: `[price, qty]` or `{"price": .., "qty": ..}`
#[derive(Deserialize)]
#[serde(untagged)]
enum LevelRepr {
    Pair(
        #[serde(deserialize_with = "deserialize_decimal")] Decimal,
        #[serde(deserialize_with = "deserialize_decimal")] Decimal,
    ),
    Object {
        #[serde(deserialize_with = "deserialize_decimal")]
        price: Decimal,
        #[serde(deserialize_with = "deserialize_decimal", alias = "quantity")]
        qty: Decimal,
    },
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match LevelRepr::deserialize(deserializer)? {
            LevelRepr::Pair(price, qty) => Level::new(price, qty),
            LevelRepr::Object { price, qty } => Level::new(price, qty),
        })
    }
}

/// Decimal from either a JSON number or a string
///
/// JSON numbers are held as f64 by `serde_json`, so only about 17 significant
/// digits survive; quoted strings are parsed exactly.
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    let s = match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    };
    parse_decimal(s.trim()).map_err(D::Error::custom)
}

/// Parse a decimal in plain or scientific notation (e.g. `0.5`, `5e-6`)
pub fn parse_decimal(s: &str) -> Result<Decimal, rust_decimal::Error> {
    use std::str::FromStr;

    if s.contains('e') || s.contains('E') {
        Decimal::from_scientific(s)
    } else {
        Decimal::from_str(s)
    }
}

//! Instrument symbols (BTC/USD format)

use crate::error::BookError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Instrument symbol as it appears in the feed (e.g. "BTC/USD")
///
/// Feed symbols are matched verbatim; no normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new symbol from a string
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates user input; feed rows go through [`Symbol::new`] unchecked
impl FromStr for Symbol {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(BookError::InvalidArgument(
                "symbol must not be empty".to_string(),
            ));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(BookError::InvalidArgument(format!(
                "symbol must not contain whitespace, got {s:?}"
            )));
        }

        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

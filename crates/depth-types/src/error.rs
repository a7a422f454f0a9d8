//! Error types for depth book operations

use thiserror::Error;

/// Main error type for order book and engine operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    /// Caller supplied a value the operation cannot interpret
    /// (unrecognized side token, invalid configuration)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Query against an instrument that has seen no events
    #[error("Order book not found for instrument: {symbol}")]
    NotFound { symbol: String },

    /// Decimal arithmetic left the representable range
    #[error("Arithmetic overflow in {operation}")]
    Overflow { operation: &'static str },
}

impl BookError {
    /// Create an error for an unrecognized side token
    pub fn invalid_side(token: impl AsRef<str>, expected: &str) -> Self {
        Self::InvalidArgument(format!(
            "side must be {expected}, got '{}'",
            token.as_ref()
        ))
    }

    /// Create an error for an unknown instrument
    pub fn not_found(symbol: impl Into<String>) -> Self {
        Self::NotFound {
            symbol: symbol.into(),
        }
    }

    /// Create an error for an operation whose result does not fit a `Decimal`
    pub fn overflow(operation: &'static str) -> Self {
        Self::Overflow { operation }
    }

    /// Returns true if the caller passed a bad argument
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns true if the instrument was unknown
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Process exit code a front end should use for this error kind
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidArgument(_) => 2,
            Self::NotFound { .. } => 3,
            Self::Overflow { .. } => 6,
        }
    }
}

/// Result type alias for book operations
pub type BookResult<T> = Result<T, BookError>;

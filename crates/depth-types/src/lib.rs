//! Shared types for the depth book workspace
//!
//! This crate provides the core type definitions used across the depth book
//! crates. It has minimal dependencies and performs no I/O.
//!
//! # Key Types
//!
//! - [`Symbol`] - Instrument identifiers (e.g., "BTC/USD")
//! - [`Level`] - Aggregated price level with decimal precision
//! - [`BookSide`], [`OrderSide`] - Side tokens accepted by the queries
//! - [`FeedRecord`] - One parsed snapshot/update row of the upstream feed
//! - [`TopOfBook`] - Best N levels of both sides
//! - [`BookError`] - Error types

pub mod error;
pub mod level;
pub mod record;
pub mod side;
pub mod symbol;

// Re-export commonly used types
pub use error::*;
pub use level::*;
pub use record::*;
pub use side::*;
pub use symbol::*;

// Re-export rust_decimal for users
pub use rust_decimal::Decimal;

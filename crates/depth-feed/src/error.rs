//! Error types for feed input and result export

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the depth feed
#[derive(Error, Debug)]
pub enum FeedError {
    /// Feed file could not be opened
    #[error("Failed to open feed {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// CSV framing or column error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `time` column is not a number
    #[error("Row {row}: invalid time {value:?}")]
    InvalidTimestamp { row: usize, value: String },

    /// A level cell is not a list of `[price, quantity]` pairs
    #[error("Row {row}: malformed {column} levels: {message}")]
    MalformedLevels {
        row: usize,
        column: &'static str,
        message: String,
    },
}

impl FeedError {
    /// Data row (1-based, header excluded) the error refers to, if known
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::InvalidTimestamp { row, .. } | Self::MalformedLevels { row, .. } => Some(*row),
            Self::Csv(err) => err.position().map(|pos| pos.record() as usize),
            Self::Open { .. } => None,
        }
    }

    /// Process exit code a front end should use for input errors
    pub fn exit_code(&self) -> u8 {
        4
    }
}

/// Errors raised while writing results
#[derive(Error, Debug)]
pub enum ExportError {
    /// Output directory could not be created
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl ExportError {
    /// Process exit code a front end should use for output errors
    pub fn exit_code(&self) -> u8 {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_error_row() {
        let err = FeedError::MalformedLevels {
            row: 7,
            column: "bids",
            message: "expected list".into(),
        };
        assert_eq!(err.row(), Some(7));
        assert_eq!(err.to_string(), "Row 7: malformed bids levels: expected list");
    }

    #[test]
    fn test_exit_codes() {
        let feed = FeedError::InvalidTimestamp {
            row: 1,
            value: "soon".into(),
        };
        let export = ExportError::CreateDir {
            path: PathBuf::from("/x"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "denied"),
        };
        assert_ne!(feed.exit_code(), export.exit_code());
    }
}

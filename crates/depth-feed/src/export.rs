//! CSV result writers
//!
//! All files of one run share an output prefix: `results/run1` produces
//! `results/run1_top10_bids.csv`, `results/run1_summary.csv` and so on.

use crate::error::ExportError;
use depth_types::Level;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decimal places used for prices and quantities in level files
pub const LEVEL_DECIMALS: usize = 10;

/// Common prefix of every file written by one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPrefix(PathBuf);

impl OutputPrefix {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self(prefix.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut path = self.0.clone().into_os_string();
        path.push(suffix);
        PathBuf::from(path)
    }

    pub fn top_bids(&self) -> PathBuf {
        self.with_suffix("_top10_bids.csv")
    }

    pub fn top_asks(&self) -> PathBuf {
        self.with_suffix("_top10_asks.csv")
    }

    pub fn after_place_limit_bids(&self) -> PathBuf {
        self.with_suffix("_after_place_limit_bids.csv")
    }

    pub fn after_place_limit_asks(&self) -> PathBuf {
        self.with_suffix("_after_place_limit_asks.csv")
    }

    pub fn summary(&self) -> PathBuf {
        self.with_suffix("_summary.csv")
    }

    /// Create the directory the prefix lives in, if it has one
    pub fn ensure_parent_dir(&self) -> Result<(), ExportError> {
        match self.0.parent() {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
                fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
                debug!(dir = %dir.display(), "created output directory");
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for OutputPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Write levels as `price,quantity` rows in book order
pub fn write_levels_csv(path: impl AsRef<Path>, levels: &[Level]) -> Result<(), ExportError> {
    let path = path.as_ref();
    let wrap = |source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(wrap)?;
    writer.write_record(["price", "quantity"]).map_err(wrap)?;
    for level in levels {
        writer
            .write_record([
                format!("{:.*}", LEVEL_DECIMALS, level.price),
                format!("{:.*}", LEVEL_DECIMALS, level.qty),
            ])
            .map_err(wrap)?;
    }
    writer.flush().map_err(|err| wrap(err.into()))?;

    debug!(path = %path.display(), rows = levels.len(), "wrote levels");
    Ok(())
}

/// Insertion-ordered `key,value` report of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    entries: Vec<(String, String)>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, replacing its value in place if it was already present
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();
        let wrap = |source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut writer = csv::Writer::from_path(path).map_err(wrap)?;
        writer.write_record(["key", "value"]).map_err(wrap)?;
        for (key, value) in self.iter() {
            writer.write_record([key, value]).map_err(wrap)?;
        }
        writer.flush().map_err(|err| wrap(err.into()))?;

        debug!(path = %path.display(), entries = self.len(), "wrote summary");
        Ok(())
    }
}

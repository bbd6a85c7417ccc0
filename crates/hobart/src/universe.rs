//! Stock universe ingestion.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while loading a universe definition.
#[derive(Error, Debug)]
pub enum UniverseError {
    /// The universe file could not be opened.
    #[error("cannot open universe file {path}: {source}")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A row could not be parsed.
    #[error("malformed universe row: {0}")]
    Csv(#[from] csv::Error),

    /// The file parsed but contained no constituents.
    #[error("universe file {0} contains no constituents")]
    Empty(PathBuf),
}

/// One member of the tracked universe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Constituent {
    /// Ticker symbol.
    pub ticker: String,
    /// Company name, if the source provides one.
    #[serde(default)]
    pub company_name: Option<String>,
    /// Sector classification, if the source provides one.
    #[serde(default)]
    pub sector: Option<String>,
}

/// A source of universe constituents.
pub trait Universe {
    /// The constituents, deduplicated by ticker, in source order.
    fn constituents(&self) -> Result<Vec<Constituent>, UniverseError>;
}

/// Universe defined by a CSV file with a `ticker` column and optional
/// `company_name` and `sector` columns.
#[derive(Debug, Clone)]
pub struct CsvUniverse {
    path: PathBuf,
}

impl CsvUniverse {
    /// Universe backed by the CSV file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Universe for CsvUniverse {
    fn constituents(&self) -> Result<Vec<Constituent>, UniverseError> {
        let file = File::open(&self.path).map_err(|source| UniverseError::Open {
            path: self.path.clone(),
            source,
        })?;

        let mut reader = csv::Reader::from_reader(file);
        let mut constituents: Vec<Constituent> = Vec::new();
        for row in reader.deserialize() {
            let constituent: Constituent = row?;
            let ticker = constituent.ticker.trim();
            if ticker.is_empty() {
                continue;
            }
            if constituents.iter().any(|c| c.ticker == ticker) {
                continue;
            }
            constituents.push(Constituent {
                ticker: ticker.to_string(),
                ..constituent
            });
        }

        if constituents.is_empty() {
            return Err(UniverseError::Empty(self.path.clone()));
        }
        Ok(constituents)
    }
}

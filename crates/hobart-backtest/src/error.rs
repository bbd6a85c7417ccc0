//! Error types for portfolio construction and simulation.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while building portfolios or running backtests.
#[derive(Error, Debug)]
pub enum BacktestError {
    /// The risk profile name is not one of the supported profiles.
    #[error("unknown risk profile '{0}' (expected conservative, balanced or aggressive)")]
    UnknownProfile(String),

    /// The weighting scheme name is not one of the supported schemes.
    #[error("unknown weighting scheme '{0}' (expected equal or inverse_volatility)")]
    UnknownScheme(String),

    /// The simulation period is empty or reversed.
    #[error("invalid backtest period: start {start} is not before end {end}")]
    InvalidPeriod {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },

    /// No persisted factor scores exist anywhere in the simulation period.
    #[error("no factor scores available on or before {0}; run scoring first")]
    NoScores(NaiveDate),

    /// An underlying store operation failed.
    #[error(transparent)]
    Data(#[from] hobart_data::DataError),
}

/// Result type alias for backtest operations.
pub type Result<T> = std::result::Result<T, BacktestError>;

//! Umbrella error type spanning the pipeline layers.

use thiserror::Error;

use crate::universe::UniverseError;

/// Errors from any layer of the Hobart pipeline.
#[derive(Error, Debug)]
pub enum HobartError {
    /// A store or provider operation failed.
    #[error(transparent)]
    Data(#[from] hobart_data::DataError),

    /// Portfolio construction or simulation failed.
    #[error(transparent)]
    Backtest(#[from] hobart_backtest::BacktestError),

    /// Universe ingestion failed.
    #[error(transparent)]
    Universe(#[from] UniverseError),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, HobartError>;

//! Low-volatility factor - dispersion of trailing daily returns.
//!
//! Lower-volatility securities tend to exhibit better risk-adjusted
//! returns; the raw metric is the sample standard deviation of daily
//! percentage-change returns over roughly one trading year.

use serde::{Deserialize, Serialize};

/// Configuration for the trailing-volatility metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityConfig {
    /// Number of trailing daily returns to measure over (default: 252 for
    /// ~1 year of trading days).
    pub lookback: usize,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self { lookback: 252 }
    }
}

/// Daily percentage-change returns of an ascending close series.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect()
}

/// Sample standard deviation of the last `lookback` daily returns.
///
/// Returns `None` when fewer than two returns are available; a flat series
/// yields `Some(0.0)` (callers that cannot invert a zero decide for
/// themselves, see the weighting engine).
pub fn return_volatility(closes: &[f64], lookback: usize) -> Option<f64> {
    let returns = daily_returns(closes);
    if returns.len() < 2 {
        return None;
    }

    let tail = &returns[returns.len().saturating_sub(lookback)..];
    if tail.len() < 2 {
        return None;
    }

    Some(std_dev(tail))
}

/// Sample standard deviation (ddof = 1).
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

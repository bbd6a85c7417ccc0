//! Performance metrics over a daily return series.

use hobart_factors::volatility::std_dev;
use serde::Serialize;

use crate::simulator::ReturnSeries;

/// Trading days assumed per calendar year when annualizing.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Summary statistics for a strategy's daily return series.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    /// Compounded return over the whole series.
    pub total_return: f64,
    /// Geometric return annualized at 252 trading days.
    pub annualized_return: f64,
    /// Standard deviation of daily returns, annualized.
    pub annualized_volatility: f64,
    /// Annualized return over annualized volatility, at a zero risk-free
    /// rate; zero when volatility is zero.
    pub sharpe_ratio: f64,
}

/// Evaluate a return series, or `None` when it holds fewer than two
/// observations and the statistics are undefined.
pub fn evaluate(series: &ReturnSeries) -> Option<PerformanceSummary> {
    let returns = series.returns();
    if returns.len() < 2 {
        return None;
    }

    let total_return = returns.iter().map(|r| 1.0 + r).product::<f64>() - 1.0;
    let annualized_return =
        (1.0 + total_return).powf(TRADING_DAYS_PER_YEAR / returns.len() as f64) - 1.0;
    let annualized_volatility = std_dev(&returns) * TRADING_DAYS_PER_YEAR.sqrt();
    let sharpe_ratio = if annualized_volatility == 0.0 {
        0.0
    } else {
        annualized_return / annualized_volatility
    };

    Some(PerformanceSummary {
        total_return,
        annualized_return,
        annualized_volatility,
        sharpe_ratio,
    })
}

impl PerformanceSummary {
    /// Metric names and display values, percentages formatted to two
    /// decimal places.
    pub fn formatted(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Return", format!("{:.2}%", self.total_return * 100.0)),
            (
                "Annualized Return",
                format!("{:.2}%", self.annualized_return * 100.0),
            ),
            (
                "Annualized Volatility",
                format!("{:.2}%", self.annualized_volatility * 100.0),
            ),
            ("Sharpe Ratio", format!("{:.2}", self.sharpe_ratio)),
        ]
    }
}

/// Formatted metrics with an `N/A` sentinel for an unevaluable series.
pub fn formatted_metrics(summary: Option<&PerformanceSummary>) -> Vec<(&'static str, String)> {
    match summary {
        Some(summary) => summary.formatted(),
        None => vec![
            ("Total Return", "N/A".to_string()),
            ("Annualized Return", "N/A".to_string()),
            ("Annualized Volatility", "N/A".to_string()),
            ("Sharpe Ratio", "N/A".to_string()),
        ],
    }
}

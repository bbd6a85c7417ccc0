//! Typed rows for the Hobart data model.
//!
//! Every computation downstream of the store works on these types rather
//! than on ad hoc query results, which keeps the point-in-time contracts
//! explicit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A stock in the tracked universe.
///
/// Immutable once created; rows are inserted at universe-ingestion time and
/// never updated by the scoring or backtesting code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Stable store-assigned identifier.
    pub id: i64,
    /// Ticker symbol (e.g. "AAPL").
    pub ticker: String,
    /// Company name, if known.
    pub company_name: Option<String>,
    /// Sector classification, if known.
    pub sector: Option<String>,
}

/// A single daily close observation for a stock.
///
/// Append-only and unique per (stock, date); the source of truth for
/// returns and volatility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Stock identifier.
    pub stock_id: i64,
    /// Trading date.
    pub date: NaiveDate,
    /// Closing price.
    pub close: f64,
    /// Traded volume, when the provider reports it.
    pub volume: Option<i64>,
}

/// A point-in-time snapshot of fundamental ratios for a stock.
///
/// Sparse: roughly one row per update cycle. Absent fields are `None` and
/// rank as worst during scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    /// Stock identifier.
    pub stock_id: i64,
    /// Date the snapshot was recorded.
    pub date_recorded: NaiveDate,
    /// Trailing price-to-earnings ratio.
    pub pe_ratio: Option<f64>,
    /// Price-to-book ratio.
    pub pb_ratio: Option<f64>,
    /// Return on equity.
    pub roe: Option<f64>,
    /// Debt-to-equity ratio.
    pub debt_equity: Option<f64>,
}

/// Hexile factor scores for one stock on one as-of date.
///
/// Scores are bucket labels in `1..=6` (1 = worst, 6 = best) or `None` when
/// the underlying raw metric was entirely unavailable. Records are
/// regenerable: recomputing a date overwrites, never duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorScoreRecord {
    /// Stock identifier.
    pub stock_id: i64,
    /// The as-of date the scores were computed for.
    pub date_calculated: NaiveDate,
    /// Value factor score (cheapness on P/E and P/B).
    pub value_score: Option<u8>,
    /// Quality factor score (ROE and leverage).
    pub quality_score: Option<u8>,
    /// Momentum factor score (trailing multi-window return).
    pub momentum_score: Option<u8>,
    /// Low-volatility factor score (trailing daily-return dispersion).
    pub low_volatility_score: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_record_roundtrips_through_json() {
        let record = FactorScoreRecord {
            stock_id: 7,
            date_calculated: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            value_score: Some(6),
            quality_score: Some(3),
            momentum_score: None,
            low_volatility_score: Some(1),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: FactorScoreRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}

//! Portfolio selection from a scored cross-section.

use std::collections::HashMap;

use hobart_data::{FactorScoreRecord, Stock};
use serde::Serialize;

use crate::composite::composite_score;
use crate::profile::FactorWeights;

/// Momentum hexile a stock must exceed to be eligible for selection.
pub const MOMENTUM_FLOOR: u8 = 3;

/// One selected portfolio position.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioPosition {
    /// Stock identifier.
    pub stock_id: i64,
    /// Ticker symbol.
    pub ticker: String,
    /// Weighted composite of the four factor scores.
    pub composite_score: f64,
    /// The underlying factor scores.
    pub scores: FactorScoreRecord,
}

/// Select the top-`num_stocks` portfolio from a scored cross-section.
///
/// Stocks with no momentum score, or a momentum score at or below
/// [`MOMENTUM_FLOOR`], are excluded before ranking. Survivors are ordered
/// by composite score descending with ticker as the tie-break, then
/// truncated. Fewer than `num_stocks` eligible stocks yields a smaller
/// portfolio, never an error.
pub fn select_portfolio(
    stocks: &[Stock],
    scores: &[FactorScoreRecord],
    weights: &FactorWeights,
    num_stocks: usize,
) -> Vec<PortfolioPosition> {
    let tickers: HashMap<i64, &str> = stocks
        .iter()
        .map(|s| (s.id, s.ticker.as_str()))
        .collect();

    let mut positions: Vec<PortfolioPosition> = scores
        .iter()
        .filter(|record| record.momentum_score.is_some_and(|m| m > MOMENTUM_FLOOR))
        .filter_map(|record| {
            tickers.get(&record.stock_id).map(|ticker| PortfolioPosition {
                stock_id: record.stock_id,
                ticker: ticker.to_string(),
                composite_score: composite_score(record, weights),
                scores: record.clone(),
            })
        })
        .collect();

    positions.sort_by(|a, b| {
        b.composite_score
            .total_cmp(&a.composite_score)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    positions.truncate(num_stocks);
    positions
}

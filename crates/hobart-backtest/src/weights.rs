//! Capital allocation across a selected portfolio.

use std::collections::HashMap;

use hobart_factors::volatility::{daily_returns, std_dev};
use serde::Serialize;

use crate::portfolio::PortfolioPosition;
use crate::profile::WeightingScheme;

/// A portfolio position with its capital weight.
#[derive(Debug, Clone, Serialize)]
pub struct WeightedHolding {
    /// Stock identifier.
    pub stock_id: i64,
    /// Ticker symbol.
    pub ticker: String,
    /// Fraction of capital allocated, in `(0, 1]`; weights sum to 1.
    pub weight: f64,
}

/// Split capital across the portfolio under the given scheme.
///
/// `trailing_closes` holds each position's ascending close series over the
/// trailing lookback window ending at the rebalance date. Positions whose
/// series cannot support the scheme are excluded and the remaining weights
/// renormalized:
///
/// * equal weighting needs at least one daily return (two closes);
/// * inverse-volatility weighting needs a defined, nonzero trailing
///   volatility (a flat series cannot be inverted).
///
/// Returns an empty vector when no position is usable.
pub fn portfolio_weights(
    scheme: WeightingScheme,
    positions: &[PortfolioPosition],
    trailing_closes: &HashMap<i64, Vec<f64>>,
) -> Vec<WeightedHolding> {
    match scheme {
        WeightingScheme::Equal => equal_weights(positions, trailing_closes),
        WeightingScheme::InverseVolatility => inverse_volatility_weights(positions, trailing_closes),
    }
}

fn equal_weights(
    positions: &[PortfolioPosition],
    trailing_closes: &HashMap<i64, Vec<f64>>,
) -> Vec<WeightedHolding> {
    let usable: Vec<&PortfolioPosition> = positions
        .iter()
        .filter(|p| trailing_closes.get(&p.stock_id).is_some_and(|c| c.len() >= 2))
        .collect();

    let weight = 1.0 / usable.len() as f64;
    usable
        .into_iter()
        .map(|p| WeightedHolding {
            stock_id: p.stock_id,
            ticker: p.ticker.clone(),
            weight,
        })
        .collect()
}

fn inverse_volatility_weights(
    positions: &[PortfolioPosition],
    trailing_closes: &HashMap<i64, Vec<f64>>,
) -> Vec<WeightedHolding> {
    let usable: Vec<(&PortfolioPosition, f64)> = positions
        .iter()
        .filter_map(|p| {
            let closes = trailing_closes.get(&p.stock_id)?;
            let returns = daily_returns(closes);
            if returns.len() < 2 {
                return None;
            }
            let vol = std_dev(&returns);
            (vol > 0.0).then_some((p, 1.0 / vol))
        })
        .collect();

    let total: f64 = usable.iter().map(|(_, inv)| inv).sum();
    usable
        .into_iter()
        .map(|(p, inv)| WeightedHolding {
            stock_id: p.stock_id,
            ticker: p.ticker.clone(),
            weight: inv / total,
        })
        .collect()
}

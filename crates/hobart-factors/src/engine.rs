//! Cross-sectional factor score computation for one as-of date.

use std::collections::HashMap;

use chrono::NaiveDate;
use hobart_data::{FactorScoreRecord, FundamentalSnapshot, PriceObservation, Stock};
use serde::{Deserialize, Serialize};

use crate::hexile::hexile_scores;
use crate::momentum::{MomentumConfig, composite_momentum};
use crate::quality::quality_keys;
use crate::value::value_keys;
use crate::volatility::{VolatilityConfig, return_volatility};

/// Configuration for a scoring run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Momentum windows and blend weights.
    pub momentum: MomentumConfig,
    /// Volatility lookback.
    pub volatility: VolatilityConfig,
    /// Calendar days of price history to consider before the as-of date.
    /// Must cover the longest momentum window in trading days plus
    /// weekends and holidays (default: 550).
    pub history_window_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            momentum: MomentumConfig::default(),
            volatility: VolatilityConfig::default(),
            history_window_days: 550,
        }
    }
}

/// Computes hexile factor scores for a universe cross-section.
///
/// The engine is pure: callers materialize price history and point-in-time
/// fundamental snapshots first, and the engine guarantees no observation
/// dated after the as-of date influences any score.
#[derive(Debug, Clone, Default)]
pub struct FactorScoreEngine {
    config: EngineConfig,
}

impl FactorScoreEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score the cross-section as of `as_of`.
    ///
    /// `prices` maps stock id to its close history (any order, any date
    /// range; observations after `as_of` are ignored) and `fundamentals`
    /// maps stock id to its latest snapshot recorded on or before `as_of`.
    /// Output rows are in ticker order, one per stock, with `None` for a
    /// factor whose raw metric was unavailable.
    pub fn compute(
        &self,
        as_of: NaiveDate,
        stocks: &[Stock],
        prices: &HashMap<i64, Vec<PriceObservation>>,
        fundamentals: &HashMap<i64, FundamentalSnapshot>,
    ) -> Vec<FactorScoreRecord> {
        let mut ordered: Vec<&Stock> = stocks.iter().collect();
        ordered.sort_by(|a, b| a.ticker.cmp(&b.ticker));

        // Ascending close series per stock, truncated at the as-of date.
        let close_series: Vec<Vec<f64>> = ordered
            .iter()
            .map(|stock| {
                let mut observations: Vec<&PriceObservation> = prices
                    .get(&stock.id)
                    .map(|rows| rows.iter().filter(|p| p.date <= as_of).collect())
                    .unwrap_or_default();
                observations.sort_by_key(|p| p.date);
                observations.iter().map(|p| p.close).collect()
            })
            .collect();

        let momentum_keys: Vec<Option<f64>> = close_series
            .iter()
            .map(|closes| composite_momentum(closes, &self.config.momentum))
            .collect();

        // Lower volatility is better, so negate for the goodness ordering.
        let volatility_keys: Vec<Option<f64>> = close_series
            .iter()
            .map(|closes| return_volatility(closes, self.config.volatility.lookback).map(|v| -v))
            .collect();

        let snapshots: Vec<Option<&FundamentalSnapshot>> = ordered
            .iter()
            .map(|stock| fundamentals.get(&stock.id))
            .collect();

        // Value and quality keys are lower-is-better mean ranks; negate so
        // all four goodness vectors agree on larger = better.
        let value_goodness: Vec<Option<f64>> =
            value_keys(&snapshots).into_iter().map(|k| Some(-k)).collect();
        let quality_goodness: Vec<Option<f64>> =
            quality_keys(&snapshots).into_iter().map(|k| Some(-k)).collect();

        let value_scores = hexile_scores(&value_goodness);
        let quality_scores = hexile_scores(&quality_goodness);
        let momentum_scores = hexile_scores(&momentum_keys);
        let volatility_scores = hexile_scores(&volatility_keys);

        ordered
            .iter()
            .enumerate()
            .map(|(i, stock)| FactorScoreRecord {
                stock_id: stock.id,
                date_calculated: as_of,
                value_score: value_scores[i],
                quality_score: quality_scores[i],
                momentum_score: momentum_scores[i],
                low_volatility_score: volatility_scores[i],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn stock(id: i64, ticker: &str) -> Stock {
        Stock {
            id,
            ticker: ticker.to_string(),
            company_name: None,
            sector: None,
        }
    }

    fn snapshot(
        stock_id: i64,
        pe: f64,
        pb: f64,
        roe: f64,
        de: f64,
    ) -> FundamentalSnapshot {
        FundamentalSnapshot {
            stock_id,
            date_recorded: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            pe_ratio: Some(pe),
            pb_ratio: Some(pb),
            roe: Some(roe),
            debt_equity: Some(de),
        }
    }

    /// Daily closes ending at `end`, one per calendar day, drifting by
    /// `daily` per day from a base of 100.
    fn drift_prices(stock_id: i64, end: NaiveDate, len: usize, daily: f64) -> Vec<PriceObservation> {
        (0..len)
            .map(|i| {
                let back = (len - 1 - i) as u64;
                PriceObservation {
                    stock_id,
                    date: end.checked_sub_days(Days::new(back)).unwrap(),
                    close: 100.0 + daily * i as f64,
                    volume: None,
                }
            })
            .collect()
    }

    #[test]
    fn test_rising_stock_beats_falling_stock_on_momentum() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let stocks = vec![stock(1, "UP"), stock(2, "DOWN")];

        let mut prices = HashMap::new();
        prices.insert(1, drift_prices(1, as_of, 300, 0.5));
        prices.insert(2, drift_prices(2, as_of, 300, -0.1));

        let records = FactorScoreEngine::default().compute(as_of, &stocks, &prices, &HashMap::new());

        // Output is in ticker order: DOWN then UP.
        assert_eq!(records[0].stock_id, 2);
        assert_eq!(records[1].stock_id, 1);
        assert!(records[1].momentum_score.unwrap() > records[0].momentum_score.unwrap());
    }

    #[test]
    fn test_insufficient_history_leaves_price_factors_unscored() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let stocks = vec![stock(1, "NEW")];

        let mut prices = HashMap::new();
        prices.insert(1, drift_prices(1, as_of, 30, 0.5));

        let records = FactorScoreEngine::default().compute(as_of, &stocks, &prices, &HashMap::new());
        assert_eq!(records[0].momentum_score, None);
        // 30 observations still yield enough daily returns for volatility.
        assert!(records[0].low_volatility_score.is_some());
        // Fundamental factors are always scored, missing inputs rank bottom.
        assert!(records[0].value_score.is_some());
        assert!(records[0].quality_score.is_some());
    }

    #[test]
    fn test_observations_after_the_as_of_date_are_ignored() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let stocks = vec![stock(1, "A"), stock(2, "B")];

        let mut prices = HashMap::new();
        prices.insert(1, drift_prices(1, as_of, 300, 0.2));
        // Same history as stock 1 plus a huge future spike.
        let mut with_future = drift_prices(2, as_of, 300, 0.2);
        with_future.push(PriceObservation {
            stock_id: 2,
            date: as_of.checked_add_days(Days::new(1)).unwrap(),
            close: 10_000.0,
            volume: None,
        });
        prices.insert(2, with_future);

        let records = FactorScoreEngine::default().compute(as_of, &stocks, &prices, &HashMap::new());
        assert_eq!(records[0].momentum_score, records[1].momentum_score);
        assert_eq!(
            records[0].low_volatility_score,
            records[1].low_volatility_score
        );
    }

    #[test]
    fn test_twelve_stock_universe_fills_value_buckets_evenly() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let stocks: Vec<Stock> = (0..12).map(|i| stock(i, &format!("S{i:02}"))).collect();

        // Strictly improving fundamentals by stock id: higher id = cheaper,
        // more profitable, less levered.
        let fundamentals: HashMap<i64, FundamentalSnapshot> = (0..12)
            .map(|i| {
                let f = i as f64;
                (
                    i,
                    snapshot(i, 50.0 - 3.0 * f, 10.0 - 0.7 * f, 0.01 + 0.02 * f, 5.0 - 0.4 * f),
                )
            })
            .collect();

        let records =
            FactorScoreEngine::default().compute(as_of, &stocks, &HashMap::new(), &fundamentals);

        let mut counts = [0usize; 6];
        for record in &records {
            counts[(record.value_score.unwrap() - 1) as usize] += 1;
        }
        assert_eq!(counts, [2, 2, 2, 2, 2, 2]);

        // S11 is best on every fundamental.
        let best = records.iter().find(|r| r.stock_id == 11).unwrap();
        assert_eq!(best.value_score, Some(6));
        assert_eq!(best.quality_score, Some(6));
    }

    #[test]
    fn test_records_carry_the_as_of_date() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let stocks = vec![stock(1, "A")];

        let records =
            FactorScoreEngine::default().compute(as_of, &stocks, &HashMap::new(), &HashMap::new());
        assert_eq!(records[0].date_calculated, as_of);
    }
}

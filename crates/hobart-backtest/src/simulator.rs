//! Historical strategy simulation over quarterly rebalances.

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, Duration, NaiveDate};
use hobart_data::{PriceObservation, PriceRepository, ScoreRepository, StockRepository};
use serde::Serialize;

use crate::calendar::rebalance_dates;
use crate::error::{BacktestError, Result};
use crate::portfolio::select_portfolio;
use crate::profile::{RiskProfile, WeightingScheme};
use crate::weights::portfolio_weights;

/// Configuration for one backtest run.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestConfig {
    /// Risk profile selecting the factor weight preset.
    pub profile: RiskProfile,
    /// Capital allocation scheme at each rebalance.
    pub scheme: WeightingScheme,
    /// First day of the simulation.
    pub start: NaiveDate,
    /// Last day of the simulation (inclusive).
    pub end: NaiveDate,
    /// Portfolio size at each rebalance.
    pub num_stocks: usize,
    /// Calendar days of trailing history used to weight holdings.
    pub lookback_days: i64,
}

impl BacktestConfig {
    /// A config with the default portfolio size (20) and trailing window
    /// (365 calendar days).
    pub fn new(
        profile: RiskProfile,
        scheme: WeightingScheme,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            profile,
            scheme,
            start,
            end,
            num_stocks: 20,
            lookback_days: 365,
        }
    }
}

/// A chronological series of dated daily returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReturnSeries {
    observations: Vec<(NaiveDate, f64)>,
}

impl ReturnSeries {
    /// An empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Daily returns of an ascending close series, dated at the later
    /// close of each pair. Used for buy-and-hold benchmarks.
    pub fn from_closes(closes: &[PriceObservation]) -> Self {
        let observations = closes
            .windows(2)
            .map(|pair| (pair[1].date, (pair[1].close - pair[0].close) / pair[0].close))
            .collect();
        Self { observations }
    }

    /// Append a dated return. Callers append in chronological order.
    pub fn push(&mut self, date: NaiveDate, value: f64) {
        self.observations.push((date, value));
    }

    /// Number of dated returns.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the series holds no returns.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// The dated observations, chronological.
    pub fn observations(&self) -> &[(NaiveDate, f64)] {
        &self.observations
    }

    /// Just the return values, chronological.
    pub fn returns(&self) -> Vec<f64> {
        self.observations.iter().map(|(_, r)| *r).collect()
    }
}

/// Replays the strategy over historical scores and prices.
///
/// At each quarterly rebalance the scores persisted on that exact date
/// select the portfolio, trailing closes weight it, and the weighted
/// holdings' daily returns are accumulated until the next rebalance.
/// Periods that cannot produce a portfolio (no scores on the rebalance
/// date, no eligible stocks, no usable weights, no forward prices) are
/// skipped and contribute nothing; a run where every period is skipped
/// returns an empty series.
pub struct Backtester<'a, S> {
    store: &'a S,
    config: BacktestConfig,
}

impl<'a, S> Backtester<'a, S>
where
    S: StockRepository + PriceRepository + ScoreRepository,
{
    /// Create a backtester over the given store.
    pub fn new(store: &'a S, config: BacktestConfig) -> Result<Self> {
        if config.start >= config.end {
            return Err(BacktestError::InvalidPeriod {
                start: config.start,
                end: config.end,
            });
        }
        Ok(Self { store, config })
    }

    /// The run's configuration.
    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run the simulation.
    pub fn run(&self) -> Result<ReturnSeries> {
        self.run_with_progress(|_, _| {})
    }

    /// Run the simulation, reporting `(periods_done, periods_total)` after
    /// each rebalance period.
    pub fn run_with_progress(
        &self,
        mut progress: impl FnMut(usize, usize),
    ) -> Result<ReturnSeries> {
        let periods = self.periods();
        let stocks = self.store.stocks()?;
        let weights = self.config.profile.weights();

        let mut series = ReturnSeries::new();
        for (done, &(rebalance, until)) in periods.iter().enumerate() {
            // Only scores dated exactly on the rebalance count; stale
            // cross-sections never select a portfolio here.
            let scores = self.store.scores_on(rebalance)?;
            if scores.is_empty() {
                progress(done + 1, periods.len());
                continue;
            }

            let positions =
                select_portfolio(&stocks, &scores, &weights, self.config.num_stocks);
            if positions.is_empty() {
                progress(done + 1, periods.len());
                continue;
            }

            let lookback_start = rebalance - Duration::days(self.config.lookback_days);
            let mut trailing: HashMap<i64, Vec<f64>> = HashMap::new();
            for position in &positions {
                let closes = self
                    .store
                    .close_series(position.stock_id, lookback_start, rebalance)?;
                trailing.insert(
                    position.stock_id,
                    closes.iter().map(|p| p.close).collect(),
                );
            }

            let holdings = portfolio_weights(self.config.scheme, &positions, &trailing);

            // Weighted sum of each holding's daily returns, per date.
            let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
            for holding in &holdings {
                let closes = self.store.close_series(holding.stock_id, rebalance, until)?;
                for pair in closes.windows(2) {
                    let r = (pair[1].close - pair[0].close) / pair[0].close;
                    *daily.entry(pair[1].date).or_insert(0.0) += holding.weight * r;
                }
            }

            for (date, value) in daily {
                series.push(date, value);
            }
            progress(done + 1, periods.len());
        }

        Ok(series)
    }

    /// Half-open `(rebalance, until)` pairs covering the run; the final
    /// period extends one day past `end` so the inclusive end date's close
    /// is observed.
    fn periods(&self) -> Vec<(NaiveDate, NaiveDate)> {
        let rebalances = rebalance_dates(self.config.start, self.config.end);
        let past_end = self.config.end + Days::new(1);

        rebalances
            .iter()
            .enumerate()
            .map(|(i, &rebalance)| {
                let until = rebalances.get(i + 1).copied().unwrap_or(past_end);
                (rebalance, until)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hobart_data::{FactorScoreRecord, MemoryStore};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn strong_scores(stock_id: i64, as_of: NaiveDate) -> FactorScoreRecord {
        FactorScoreRecord {
            stock_id,
            date_calculated: as_of,
            value_score: Some(5),
            quality_score: Some(5),
            momentum_score: Some(5),
            low_volatility_score: Some(5),
        }
    }

    /// Store with two stocks, daily business-day closes through the end
    /// date and strong scores on the given dates.
    fn seeded_store(score_dates: &[NaiveDate]) -> MemoryStore {
        let mut store = MemoryStore::new();
        let a = store.add_stock("AAA", None);
        let b = store.add_stock("BBB", None);

        // 2024-06-28 is a Friday; 420 business days reaches back into 2022.
        let end = date(2024, 6, 28);
        let closes_a: Vec<f64> = (0..420).map(|i| 100.0 + 0.1 * i as f64).collect();
        let closes_b: Vec<f64> = (0..420).map(|i| 200.0 + 0.3 * i as f64).collect();
        store.add_business_day_closes(a, end, &closes_a);
        store.add_business_day_closes(b, end, &closes_b);

        for &score_date in score_dates {
            store
                .replace_scores(
                    score_date,
                    &[strong_scores(a, score_date), strong_scores(b, score_date)],
                )
                .unwrap();
        }
        store
    }

    #[test]
    fn test_run_produces_daily_returns_between_rebalances() {
        // 2024-01-01 and 2024-04-01 are both Mondays.
        let store = seeded_store(&[date(2024, 1, 1), date(2024, 4, 1)]);
        let config = BacktestConfig::new(
            RiskProfile::Balanced,
            WeightingScheme::Equal,
            date(2024, 1, 1),
            date(2024, 6, 28),
        );

        let series = Backtester::new(&store, config).unwrap().run().unwrap();
        assert!(!series.is_empty());

        // Business days only, chronological, all inside the run window.
        let observations = series.observations();
        for window in observations.windows(2) {
            assert!(window[0].0 < window[1].0);
        }
        assert!(observations.first().unwrap().0 > date(2024, 1, 1));
        assert!(observations.last().unwrap().0 <= date(2024, 6, 28));
    }

    #[test]
    fn test_periods_without_scores_are_skipped() {
        // Scores exist only for the second quarter's rebalance.
        let store = seeded_store(&[date(2024, 4, 1)]);
        let config = BacktestConfig::new(
            RiskProfile::Balanced,
            WeightingScheme::Equal,
            date(2024, 1, 1),
            date(2024, 6, 28),
        );

        let series = Backtester::new(&store, config).unwrap().run().unwrap();
        assert!(!series.is_empty());
        // Nothing before the first scored rebalance.
        assert!(series.observations().first().unwrap().0 > date(2024, 4, 1));
    }

    #[test]
    fn test_no_scores_anywhere_yields_empty_series() {
        let store = seeded_store(&[]);
        let config = BacktestConfig::new(
            RiskProfile::Balanced,
            WeightingScheme::Equal,
            date(2024, 1, 1),
            date(2024, 6, 28),
        );

        let series = Backtester::new(&store, config).unwrap().run().unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_stale_scores_never_select_a_portfolio() {
        // Scores exist, but not on any 2024 rebalance date.
        let store = seeded_store(&[date(2023, 12, 15)]);
        let config = BacktestConfig::new(
            RiskProfile::Balanced,
            WeightingScheme::Equal,
            date(2024, 1, 1),
            date(2024, 6, 28),
        );

        let series = Backtester::new(&store, config).unwrap().run().unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_reversed_period_is_rejected() {
        let store = seeded_store(&[date(2024, 1, 1)]);
        let config = BacktestConfig::new(
            RiskProfile::Balanced,
            WeightingScheme::Equal,
            date(2024, 6, 28),
            date(2024, 1, 1),
        );

        assert!(matches!(
            Backtester::new(&store, config),
            Err(BacktestError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_progress_reports_every_period() {
        let store = seeded_store(&[date(2024, 1, 1)]);
        let config = BacktestConfig::new(
            RiskProfile::Balanced,
            WeightingScheme::Equal,
            date(2024, 1, 1),
            date(2024, 6, 28),
        );

        let mut seen = Vec::new();
        Backtester::new(&store, config)
            .unwrap()
            .run_with_progress(|done, total| seen.push((done, total)))
            .unwrap();
        assert_eq!(seen, vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_benchmark_series_from_closes() {
        let closes = vec![
            PriceObservation {
                stock_id: 1,
                date: date(2024, 1, 2),
                close: 100.0,
                volume: None,
            },
            PriceObservation {
                stock_id: 1,
                date: date(2024, 1, 3),
                close: 110.0,
                volume: None,
            },
        ];

        let series = ReturnSeries::from_closes(&closes);
        assert_eq!(series.len(), 1);
        assert_eq!(series.observations()[0].0, date(2024, 1, 3));
        assert_relative_eq!(series.observations()[0].1, 0.1, epsilon = 1e-12);
    }
}

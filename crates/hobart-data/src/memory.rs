//! In-memory store, primarily a test double for the repository traits.
//!
//! Seeding helpers mutate through `&mut self`; the repository traits read
//! (and, for scores, write) through shared references, matching the store
//! contract the pipeline sees.

use crate::error::Result;
use crate::model::{FactorScoreRecord, FundamentalSnapshot, PriceObservation, Stock};
use crate::repository::{
    FundamentalRepository, PriceRepository, ScoreRepository, StockRepository,
};
use chrono::{Datelike, NaiveDate, Weekday};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

/// In-memory implementation of all repository traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    stocks: Vec<Stock>,
    prices: HashMap<i64, BTreeMap<NaiveDate, PriceObservation>>,
    fundamentals: HashMap<i64, Vec<FundamentalSnapshot>>,
    scores: RefCell<BTreeMap<NaiveDate, Vec<FactorScoreRecord>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stock and return its assigned id.
    pub fn add_stock(&mut self, ticker: &str, sector: Option<&str>) -> i64 {
        let id = self.stocks.len() as i64 + 1;
        self.stocks.push(Stock {
            id,
            ticker: ticker.to_string(),
            company_name: None,
            sector: sector.map(str::to_string),
        });
        self.stocks.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        id
    }

    /// Add a single close observation.
    pub fn add_price(&mut self, stock_id: i64, date: NaiveDate, close: f64) {
        self.prices.entry(stock_id).or_default().insert(
            date,
            PriceObservation {
                stock_id,
                date,
                close,
                volume: None,
            },
        );
    }

    /// Add a run of closes on consecutive business days so that the last
    /// element lands on `end` (weekends are skipped going backwards).
    pub fn add_business_day_closes(&mut self, stock_id: i64, end: NaiveDate, closes: &[f64]) {
        let mut date = end;
        for close in closes.iter().rev() {
            while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                date = date.pred_opt().expect("date underflow");
            }
            self.add_price(stock_id, date, *close);
            date = date.pred_opt().expect("date underflow");
        }
    }

    /// Add a fundamental snapshot.
    pub fn add_fundamental(&mut self, snapshot: FundamentalSnapshot) {
        self.fundamentals
            .entry(snapshot.stock_id)
            .or_default()
            .push(snapshot);
    }
}

impl StockRepository for MemoryStore {
    fn stocks(&self) -> Result<Vec<Stock>> {
        Ok(self.stocks.clone())
    }

    fn stock_by_ticker(&self, ticker: &str) -> Result<Option<Stock>> {
        Ok(self.stocks.iter().find(|s| s.ticker == ticker).cloned())
    }
}

impl PriceRepository for MemoryStore {
    fn close_history(
        &self,
        as_of: NaiveDate,
        window_days: i64,
    ) -> Result<HashMap<i64, Vec<PriceObservation>>> {
        let window_start = as_of - chrono::Duration::days(window_days);

        let mut history = HashMap::new();
        for (stock_id, series) in &self.prices {
            let observations: Vec<PriceObservation> = series
                .range(window_start..=as_of)
                .map(|(_, obs)| obs.clone())
                .collect();
            if !observations.is_empty() {
                history.insert(*stock_id, observations);
            }
        }

        Ok(history)
    }

    fn close_series(
        &self,
        stock_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceObservation>> {
        Ok(self
            .prices
            .get(&stock_id)
            .map(|series| series.range(start..end).map(|(_, obs)| obs.clone()).collect())
            .unwrap_or_default())
    }

    fn latest_price_date(&self, stock_id: i64) -> Result<Option<NaiveDate>> {
        Ok(self
            .prices
            .get(&stock_id)
            .and_then(|series| series.keys().next_back().copied()))
    }
}

impl FundamentalRepository for MemoryStore {
    fn latest_snapshots(
        &self,
        as_of: NaiveDate,
    ) -> Result<HashMap<i64, FundamentalSnapshot>> {
        let mut snapshots = HashMap::new();
        for (stock_id, history) in &self.fundamentals {
            let latest = history
                .iter()
                .filter(|s| s.date_recorded <= as_of)
                .max_by_key(|s| s.date_recorded);
            if let Some(snapshot) = latest {
                snapshots.insert(*stock_id, snapshot.clone());
            }
        }

        Ok(snapshots)
    }
}

impl ScoreRepository for MemoryStore {
    fn scores_on(&self, date: NaiveDate) -> Result<Vec<FactorScoreRecord>> {
        let scores = self.scores.borrow();
        let mut records = scores.get(&date).cloned().unwrap_or_default();

        // Same contract as the SQLite store: ticker order.
        let ticker_of: HashMap<i64, &str> = self
            .stocks
            .iter()
            .map(|s| (s.id, s.ticker.as_str()))
            .collect();
        records.sort_by_key(|r| ticker_of.get(&r.stock_id).copied().unwrap_or(""));

        Ok(records)
    }

    fn latest_score_date(&self, at_or_before: Option<NaiveDate>) -> Result<Option<NaiveDate>> {
        let scores = self.scores.borrow();
        Ok(match at_or_before {
            Some(bound) => scores.range(..=bound).next_back().map(|(d, _)| *d),
            None => scores.keys().next_back().copied(),
        })
    }

    fn replace_scores(&self, date: NaiveDate, records: &[FactorScoreRecord]) -> Result<()> {
        self.scores.borrow_mut().insert(date, records.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_business_day_seeding_skips_weekends() {
        let mut store = MemoryStore::new();
        let id = store.add_stock("AAPL", None);

        // 2024-01-08 is a Monday; five closes reach back to Tuesday the
        // 2nd, jumping the intervening weekend.
        store.add_business_day_closes(id, date(2024, 1, 8), &[1.0, 2.0, 3.0, 4.0, 5.0]);

        let history = store.close_history(date(2024, 1, 8), 30).unwrap();
        let series = &history[&id];
        assert_eq!(series.len(), 5);
        assert_eq!(series.last().unwrap().date, date(2024, 1, 8));
        assert_eq!(series[0].date, date(2024, 1, 2));
        assert!(
            series
                .iter()
                .all(|o| !matches!(o.date.weekday(), Weekday::Sat | Weekday::Sun))
        );
    }

    #[test]
    fn test_latest_snapshot_respects_as_of() {
        let mut store = MemoryStore::new();
        let id = store.add_stock("AAPL", None);

        for month in [1, 6] {
            store.add_fundamental(FundamentalSnapshot {
                stock_id: id,
                date_recorded: date(2024, month, 1),
                pe_ratio: Some(month as f64),
                pb_ratio: None,
                roe: None,
                debt_equity: None,
            });
        }

        let snapshots = store.latest_snapshots(date(2024, 3, 1)).unwrap();
        assert_eq!(snapshots[&id].pe_ratio, Some(1.0));

        let snapshots = store.latest_snapshots(date(2024, 7, 1)).unwrap();
        assert_eq!(snapshots[&id].pe_ratio, Some(6.0));
    }

    #[test]
    fn test_scores_roundtrip_in_ticker_order() {
        let mut store = MemoryStore::new();
        let zeta = store.add_stock("ZETA", None);
        let acme = store.add_stock("ACME", None);
        let as_of = date(2024, 1, 2);

        let record = |stock_id| FactorScoreRecord {
            stock_id,
            date_calculated: as_of,
            value_score: Some(3),
            quality_score: Some(3),
            momentum_score: Some(3),
            low_volatility_score: Some(3),
        };
        store
            .replace_scores(as_of, &[record(zeta), record(acme)])
            .unwrap();

        let records = store.scores_on(as_of).unwrap();
        assert_eq!(records[0].stock_id, acme);
        assert_eq!(records[1].stock_id, zeta);

        assert_eq!(store.latest_score_date(None).unwrap(), Some(as_of));
        assert_eq!(
            store.latest_score_date(Some(date(2023, 12, 31))).unwrap(),
            None
        );
    }
}

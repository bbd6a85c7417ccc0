//! Repository traits the scoring and backtesting core depends on.
//!
//! The core never touches a connection or a query string; it consumes these
//! narrow read/write contracts, so a SQLite store and an in-memory test
//! double are interchangeable.

use crate::error::Result;
use crate::model::{FactorScoreRecord, FundamentalSnapshot, PriceObservation, Stock};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Read access to the stock universe.
pub trait StockRepository {
    /// All stocks, ordered by ticker.
    fn stocks(&self) -> Result<Vec<Stock>>;

    /// Look up a single stock by ticker.
    fn stock_by_ticker(&self, ticker: &str) -> Result<Option<Stock>>;
}

/// Point-in-time read access to price history.
pub trait PriceRepository {
    /// Close history for every stock over the `window_days` calendar days
    /// ending at `as_of` (inclusive), ascending by date per stock.
    ///
    /// Only observations dated at or before `as_of` are returned; this is
    /// the look-ahead boundary for all trailing computations.
    fn close_history(
        &self,
        as_of: NaiveDate,
        window_days: i64,
    ) -> Result<HashMap<i64, Vec<PriceObservation>>>;

    /// Close observations for one stock in `[start, end)`, ascending.
    fn close_series(
        &self,
        stock_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceObservation>>;

    /// The most recent date with a price for the stock, if any.
    fn latest_price_date(&self, stock_id: i64) -> Result<Option<NaiveDate>>;
}

/// Point-in-time read access to fundamental snapshots.
pub trait FundamentalRepository {
    /// The most recent snapshot recorded at or before `as_of`, per stock.
    ///
    /// Stocks without any snapshot by `as_of` are absent from the map.
    fn latest_snapshots(&self, as_of: NaiveDate)
    -> Result<HashMap<i64, FundamentalSnapshot>>;
}

/// Read/write access to persisted factor scores.
pub trait ScoreRepository {
    /// All score records calculated for exactly `date`.
    fn scores_on(&self, date: NaiveDate) -> Result<Vec<FactorScoreRecord>>;

    /// The most recent date with persisted scores, optionally bounded to
    /// dates at or before `at_or_before`.
    fn latest_score_date(&self, at_or_before: Option<NaiveDate>) -> Result<Option<NaiveDate>>;

    /// Replace every score record for `date` with `records`.
    ///
    /// Overwrite semantics: existing rows for the date are deleted and the
    /// new rows inserted as one atomic unit, so recomputation never
    /// duplicates and a failed write never leaves a partial date behind.
    fn replace_scores(&self, date: NaiveDate, records: &[FactorScoreRecord]) -> Result<()>;
}

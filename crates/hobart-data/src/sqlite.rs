//! SQLite-backed store for universe, price, fundamental and score data.

use crate::error::Result;
use crate::model::{FactorScoreRecord, FundamentalSnapshot, PriceObservation, Stock};
use crate::repository::{
    FundamentalRepository, PriceRepository, ScoreRepository, StockRepository,
};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::Path;

/// SQLite store implementing all repository traits.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

/// Parse a stored `YYYY-MM-DD` date inside a rusqlite row closure.
fn parse_date(s: &str) -> std::result::Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS stocks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL UNIQUE,
                company_name TEXT,
                sector TEXT
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS daily_prices (
                stock_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                close_price REAL NOT NULL,
                volume INTEGER,
                PRIMARY KEY (stock_id, date),
                FOREIGN KEY (stock_id) REFERENCES stocks (id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_prices_date ON daily_prices(date)",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS fundamental_data (
                stock_id INTEGER NOT NULL,
                date_recorded TEXT NOT NULL,
                pe_ratio REAL,
                pb_ratio REAL,
                roe REAL,
                debt_equity REAL,
                PRIMARY KEY (stock_id, date_recorded),
                FOREIGN KEY (stock_id) REFERENCES stocks (id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS factor_scores (
                stock_id INTEGER NOT NULL,
                date_calculated TEXT NOT NULL,
                value_score INTEGER,
                quality_score INTEGER,
                momentum_score INTEGER,
                low_volatility_score INTEGER,
                PRIMARY KEY (stock_id, date_calculated),
                FOREIGN KEY (stock_id) REFERENCES stocks (id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scores_date ON factor_scores(date_calculated)",
            [],
        )?;

        Ok(())
    }

    /// Insert a stock if its ticker is not already present; returns its id.
    pub fn add_stock(
        &self,
        ticker: &str,
        company_name: Option<&str>,
        sector: Option<&str>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT OR IGNORE INTO stocks (ticker, company_name, sector) VALUES (?1, ?2, ?3)",
            params![ticker, company_name, sector],
        )?;

        let id = self.conn.query_row(
            "SELECT id FROM stocks WHERE ticker = ?1",
            params![ticker],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    /// Store a batch of price observations atomically.
    ///
    /// Re-inserting an existing (stock, date) pair replaces it, so repeated
    /// updates are idempotent.
    pub fn put_prices(&self, observations: &[PriceObservation]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        for obs in observations {
            tx.execute(
                "INSERT OR REPLACE INTO daily_prices (stock_id, date, close_price, volume)
                 VALUES (?1, ?2, ?3, ?4)",
                params![obs.stock_id, obs.date.to_string(), obs.close, obs.volume],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Store one fundamental snapshot.
    pub fn put_fundamental(&self, snapshot: &FundamentalSnapshot) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO fundamental_data
             (stock_id, date_recorded, pe_ratio, pb_ratio, roe, debt_equity)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                snapshot.stock_id,
                snapshot.date_recorded.to_string(),
                snapshot.pe_ratio,
                snapshot.pb_ratio,
                snapshot.roe,
                snapshot.debt_equity,
            ],
        )?;

        Ok(())
    }

    /// Whether a fundamental snapshot already exists for (stock, date).
    pub fn has_fundamental_on(&self, stock_id: i64, date: NaiveDate) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM fundamental_data WHERE stock_id = ?1 AND date_recorded = ?2",
            params![stock_id, date.to_string()],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Get store statistics.
    pub fn stats(&self) -> Result<StoreStats> {
        let stocks: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM stocks", [], |row| row.get(0))?;

        let prices: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM daily_prices", [], |row| row.get(0))?;

        let fundamentals: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM fundamental_data", [], |row| {
                    row.get(0)
                })?;

        let score_dates: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT date_calculated) FROM factor_scores",
            [],
            |row| row.get(0),
        )?;

        Ok(StoreStats {
            stocks: stocks as usize,
            price_observations: prices as usize,
            fundamental_snapshots: fundamentals as usize,
            scored_dates: score_dates as usize,
        })
    }
}

impl StockRepository for SqliteStore {
    fn stocks(&self) -> Result<Vec<Stock>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, ticker, company_name, sector FROM stocks ORDER BY ticker")?;

        let stocks = stmt
            .query_map([], |row| {
                Ok(Stock {
                    id: row.get(0)?,
                    ticker: row.get(1)?,
                    company_name: row.get(2)?,
                    sector: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(stocks)
    }

    fn stock_by_ticker(&self, ticker: &str) -> Result<Option<Stock>> {
        let stock = self
            .conn
            .query_row(
                "SELECT id, ticker, company_name, sector FROM stocks WHERE ticker = ?1",
                params![ticker],
                |row| {
                    Ok(Stock {
                        id: row.get(0)?,
                        ticker: row.get(1)?,
                        company_name: row.get(2)?,
                        sector: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(stock)
    }
}

impl PriceRepository for SqliteStore {
    fn close_history(
        &self,
        as_of: NaiveDate,
        window_days: i64,
    ) -> Result<HashMap<i64, Vec<PriceObservation>>> {
        let window_start = as_of - chrono::Duration::days(window_days);

        let mut stmt = self.conn.prepare(
            "SELECT stock_id, date, close_price, volume FROM daily_prices
             WHERE date <= ?1 AND date >= ?2
             ORDER BY stock_id, date",
        )?;

        let rows = stmt.query_map(
            params![as_of.to_string(), window_start.to_string()],
            |row| {
                let date: String = row.get(1)?;
                Ok(PriceObservation {
                    stock_id: row.get(0)?,
                    date: parse_date(&date)?,
                    close: row.get(2)?,
                    volume: row.get(3)?,
                })
            },
        )?;

        let mut history: HashMap<i64, Vec<PriceObservation>> = HashMap::new();
        for row in rows {
            let obs = row?;
            history.entry(obs.stock_id).or_default().push(obs);
        }

        Ok(history)
    }

    fn close_series(
        &self,
        stock_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceObservation>> {
        let mut stmt = self.conn.prepare(
            "SELECT stock_id, date, close_price, volume FROM daily_prices
             WHERE stock_id = ?1 AND date >= ?2 AND date < ?3
             ORDER BY date",
        )?;

        let observations = stmt
            .query_map(
                params![stock_id, start.to_string(), end.to_string()],
                |row| {
                    let date: String = row.get(1)?;
                    Ok(PriceObservation {
                        stock_id: row.get(0)?,
                        date: parse_date(&date)?,
                        close: row.get(2)?,
                        volume: row.get(3)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(observations)
    }

    fn latest_price_date(&self, stock_id: i64) -> Result<Option<NaiveDate>> {
        let date: Option<String> = self.conn.query_row(
            "SELECT MAX(date) FROM daily_prices WHERE stock_id = ?1",
            params![stock_id],
            |row| row.get(0),
        )?;

        Ok(match date {
            Some(s) => Some(parse_date(&s)?),
            None => None,
        })
    }
}

impl FundamentalRepository for SqliteStore {
    fn latest_snapshots(
        &self,
        as_of: NaiveDate,
    ) -> Result<HashMap<i64, FundamentalSnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT f.stock_id, f.date_recorded, f.pe_ratio, f.pb_ratio, f.roe, f.debt_equity
             FROM fundamental_data f
             INNER JOIN (
                 SELECT stock_id, MAX(date_recorded) AS max_date
                 FROM fundamental_data
                 WHERE date_recorded <= ?1
                 GROUP BY stock_id
             ) fm ON f.stock_id = fm.stock_id AND f.date_recorded = fm.max_date",
        )?;

        let rows = stmt.query_map(params![as_of.to_string()], |row| {
            let date: String = row.get(1)?;
            Ok(FundamentalSnapshot {
                stock_id: row.get(0)?,
                date_recorded: parse_date(&date)?,
                pe_ratio: row.get(2)?,
                pb_ratio: row.get(3)?,
                roe: row.get(4)?,
                debt_equity: row.get(5)?,
            })
        })?;

        let mut snapshots = HashMap::new();
        for row in rows {
            let snapshot = row?;
            snapshots.insert(snapshot.stock_id, snapshot);
        }

        Ok(snapshots)
    }
}

impl ScoreRepository for SqliteStore {
    fn scores_on(&self, date: NaiveDate) -> Result<Vec<FactorScoreRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT fs.stock_id, fs.date_calculated, fs.value_score, fs.quality_score,
                    fs.momentum_score, fs.low_volatility_score
             FROM factor_scores fs
             INNER JOIN stocks s ON s.id = fs.stock_id
             WHERE fs.date_calculated = ?1
             ORDER BY s.ticker",
        )?;

        let records = stmt
            .query_map(params![date.to_string()], |row| {
                let date: String = row.get(1)?;
                Ok(FactorScoreRecord {
                    stock_id: row.get(0)?,
                    date_calculated: parse_date(&date)?,
                    value_score: row.get(2)?,
                    quality_score: row.get(3)?,
                    momentum_score: row.get(4)?,
                    low_volatility_score: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn latest_score_date(&self, at_or_before: Option<NaiveDate>) -> Result<Option<NaiveDate>> {
        let date: Option<String> = match at_or_before {
            Some(bound) => self.conn.query_row(
                "SELECT MAX(date_calculated) FROM factor_scores WHERE date_calculated <= ?1",
                params![bound.to_string()],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT MAX(date_calculated) FROM factor_scores",
                [],
                |row| row.get(0),
            )?,
        };

        Ok(match date {
            Some(s) => Some(parse_date(&s)?),
            None => None,
        })
    }

    fn replace_scores(&self, date: NaiveDate, records: &[FactorScoreRecord]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM factor_scores WHERE date_calculated = ?1",
            params![date.to_string()],
        )?;

        for record in records {
            tx.execute(
                "INSERT INTO factor_scores
                 (stock_id, date_calculated, value_score, quality_score,
                  momentum_score, low_volatility_score)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.stock_id,
                    date.to_string(),
                    record.value_score,
                    record.quality_score,
                    record.momentum_score,
                    record.low_volatility_score,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

/// Store statistics.
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Number of stocks in the universe.
    pub stocks: usize,
    /// Total price observations.
    pub price_observations: usize,
    /// Total fundamental snapshots.
    pub fundamental_snapshots: usize,
    /// Number of distinct dates with factor scores.
    pub scored_dates: usize,
}

//! Store-backed data pipeline for the CLI.
//!
//! Handles universe ingestion, incremental price and fundamental updates
//! from Yahoo Finance, and store housekeeping. All network operations warn
//! and continue on per-ticker failures so one bad symbol never aborts a
//! whole update run.

use chrono::{Days, Local, NaiveDate};
use hobart::universe::{CsvUniverse, Universe, UniverseError};
use hobart_data::yahoo::fundamentals::YahooFundamentalsProvider;
use hobart_data::yahoo::quotes::YahooQuoteProvider;
use hobart_data::{
    FundamentalSnapshot, PriceObservation, PriceRepository, SqliteStore, StockRepository,
};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

/// Error type for pipeline operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum PipelineError {
    /// Store or provider error.
    #[error("Data error: {0}")]
    Data(#[from] hobart_data::DataError),
    /// Universe file error.
    #[error("Universe error: {0}")]
    Universe(#[from] UniverseError),
    /// Filesystem error while preparing the store location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// First date fetched for a stock with no stored prices yet.
fn initial_history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).expect("valid date")
}

/// Default store location under the platform data directory.
pub(crate) fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hobart")
        .join("hobart.db")
}

/// Open (creating if needed) the store at `path`.
pub(crate) fn open_store(path: &Path) -> Result<SqliteStore, PipelineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(SqliteStore::new(path)?)
}

/// Load a universe CSV into the store. Returns the constituent count;
/// re-running with the same file is idempotent.
pub(crate) fn init_universe(
    store: &SqliteStore,
    universe_csv: &Path,
) -> Result<usize, PipelineError> {
    let constituents = CsvUniverse::new(universe_csv).constituents()?;
    for constituent in &constituents {
        store.add_stock(
            &constituent.ticker,
            constituent.company_name.as_deref(),
            constituent.sector.as_deref(),
        )?;
    }
    Ok(constituents.len())
}

/// Print a warning without tearing the progress bar.
fn warn(progress: Option<&ProgressBar>, message: &str) {
    match progress {
        Some(pb) => pb.suspend(|| eprintln!("{message}")),
        None => eprintln!("{message}"),
    }
}

/// Incrementally update daily closes for every stock in the universe.
///
/// Each stock is fetched from the day after its latest stored price (or
/// from the initial history start for new stocks) through today. Returns
/// the number of observations stored.
pub(crate) async fn update_prices(
    store: &SqliteStore,
    provider: &YahooQuoteProvider,
    progress: Option<&ProgressBar>,
) -> Result<usize, PipelineError> {
    let stocks = store.stocks()?;
    let today = Local::now().date_naive();

    let mut stored = 0;
    for stock in &stocks {
        let start = match store.latest_price_date(stock.id)? {
            Some(latest) => latest + Days::new(1),
            None => initial_history_start(),
        };

        if start > today {
            if let Some(pb) = progress {
                pb.inc(1);
            }
            continue;
        }

        match provider.fetch_closes(&stock.ticker, start, today).await {
            Ok(closes) => {
                let observations: Vec<PriceObservation> = closes
                    .iter()
                    .map(|c| PriceObservation {
                        stock_id: stock.id,
                        date: c.date,
                        close: c.close,
                        volume: Some(c.volume as i64),
                    })
                    .collect();
                store.put_prices(&observations)?;
                stored += observations.len();
            }
            Err(e) => warn(
                progress,
                &format!("Warning: failed to fetch prices for {}: {}", stock.ticker, e),
            ),
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    Ok(stored)
}

/// Record today's fundamental snapshot for every stock in the universe.
///
/// Stocks that already have a snapshot dated today are skipped, so
/// re-running within a day costs no API calls. Returns the number of
/// snapshots stored.
pub(crate) async fn update_fundamentals(
    store: &SqliteStore,
    provider: &YahooFundamentalsProvider,
    progress: Option<&ProgressBar>,
) -> Result<usize, PipelineError> {
    let stocks = store.stocks()?;
    let today = Local::now().date_naive();

    let mut stored = 0;
    for stock in &stocks {
        if store.has_fundamental_on(stock.id, today)? {
            if let Some(pb) = progress {
                pb.inc(1);
            }
            continue;
        }

        match provider.fetch_fundamentals(&stock.ticker).await {
            Ok(facts) => {
                store.put_fundamental(&FundamentalSnapshot {
                    stock_id: stock.id,
                    date_recorded: today,
                    pe_ratio: facts.trailing_pe,
                    pb_ratio: facts.price_to_book,
                    roe: facts.return_on_equity,
                    debt_equity: facts.debt_to_equity,
                })?;
                stored += 1;
            }
            Err(e) => warn(
                progress,
                &format!(
                    "Warning: failed to fetch fundamentals for {}: {}",
                    stock.ticker, e
                ),
            ),
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    Ok(stored)
}

/// Print store location and content statistics.
pub(crate) fn print_store_info(store: &SqliteStore, path: &Path) -> Result<(), PipelineError> {
    let stats = store.stats()?;
    println!("  Store location: {}", path.display());
    println!(
        "  Contents: {} stocks, {} price observations, {} fundamental snapshots, {} scored dates",
        stats.stocks, stats.price_observations, stats.fundamental_snapshots, stats.scored_dates
    );
    Ok(())
}

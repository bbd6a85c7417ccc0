//! End-to-end pipeline operations over a store.
//!
//! These functions wire the pure factor engine and backtest core to the
//! repository traits, and are what the CLI (and library consumers) call.

use chrono::{Days, NaiveDate};
use hobart_backtest::{
    BacktestConfig, BacktestError, Backtester, PortfolioPosition, ReturnSeries, RiskProfile,
    rebalance_dates, select_portfolio,
};
use hobart_data::{
    DataError, FactorScoreRecord, FundamentalRepository, PriceRepository, ScoreRepository,
    StockRepository,
};
use hobart_factors::{EngineConfig, FactorScoreEngine};

use crate::error::Result;

/// Compute hexile factor scores for the whole universe as of `as_of`.
///
/// Pulls the trailing price window and the latest point-in-time
/// fundamental snapshots from the store; nothing dated after `as_of` can
/// influence the result.
pub fn compute_factor_scores<S>(
    store: &S,
    as_of: NaiveDate,
    config: &EngineConfig,
) -> Result<Vec<FactorScoreRecord>>
where
    S: StockRepository + PriceRepository + FundamentalRepository,
{
    let stocks = store.stocks()?;
    let prices = store.close_history(as_of, config.history_window_days)?;
    let fundamentals = store.latest_snapshots(as_of)?;

    let engine = FactorScoreEngine::new(config.clone());
    Ok(engine.compute(as_of, &stocks, &prices, &fundamentals))
}

/// Compute and persist scores for `as_of`, replacing any existing rows for
/// that date. Returns the number of stocks scored.
pub fn score_and_store<S>(store: &S, as_of: NaiveDate, config: &EngineConfig) -> Result<usize>
where
    S: StockRepository + PriceRepository + FundamentalRepository + ScoreRepository,
{
    let records = compute_factor_scores(store, as_of, config)?;
    store.replace_scores(as_of, &records)?;
    Ok(records.len())
}

/// Compute and persist scores on every quarterly rebalance date in
/// `[start, end]`, reporting `(dates_done, dates_total)` after each.
/// Returns the dates scored.
pub fn backfill_scores<S>(
    store: &S,
    start: NaiveDate,
    end: NaiveDate,
    config: &EngineConfig,
    mut progress: impl FnMut(usize, usize),
) -> Result<Vec<NaiveDate>>
where
    S: StockRepository + PriceRepository + FundamentalRepository + ScoreRepository,
{
    let dates = rebalance_dates(start, end);
    for (done, &date) in dates.iter().enumerate() {
        score_and_store(store, date, config)?;
        progress(done + 1, dates.len());
    }
    Ok(dates)
}

/// Build the top-`num_stocks` portfolio for a risk profile.
///
/// Uses the most recent persisted scores at or before `as_of` and returns
/// the score date alongside the positions; errors when no scores exist by
/// that date.
pub fn build_portfolio<S>(
    store: &S,
    profile: RiskProfile,
    as_of: NaiveDate,
    num_stocks: usize,
) -> Result<(NaiveDate, Vec<PortfolioPosition>)>
where
    S: StockRepository + ScoreRepository,
{
    let Some(score_date) = store.latest_score_date(Some(as_of))? else {
        return Err(BacktestError::NoScores(as_of).into());
    };

    let stocks = store.stocks()?;
    let scores = store.scores_on(score_date)?;
    let positions = select_portfolio(&stocks, &scores, &profile.weights(), num_stocks);
    Ok((score_date, positions))
}

/// Run a backtest over persisted scores and prices.
pub fn run_backtest<S>(store: &S, config: BacktestConfig) -> Result<ReturnSeries>
where
    S: StockRepository + PriceRepository + ScoreRepository,
{
    Ok(Backtester::new(store, config)?.run()?)
}

/// Run a backtest, reporting `(periods_done, periods_total)` after each
/// rebalance period.
pub fn run_backtest_with_progress<S>(
    store: &S,
    config: BacktestConfig,
    progress: impl FnMut(usize, usize),
) -> Result<ReturnSeries>
where
    S: StockRepository + PriceRepository + ScoreRepository,
{
    Ok(Backtester::new(store, config)?.run_with_progress(progress)?)
}

/// Buy-and-hold daily return series for one ticker over `[start, end]`,
/// for benchmark comparison against a backtest run.
pub fn benchmark_series<S>(
    store: &S,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ReturnSeries>
where
    S: StockRepository + PriceRepository,
{
    let stock = store
        .stock_by_ticker(ticker)?
        .ok_or_else(|| DataError::UnknownTicker(ticker.to_string()))?;

    let closes = store.close_series(stock.id, start, end + Days::new(1))?;
    Ok(ReturnSeries::from_closes(&closes))
}

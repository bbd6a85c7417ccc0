//! Hobart CLI binary.
//!
//! Command-line interface for the Hobart multi-factor ranking and
//! backtesting engine.

mod integration;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use hobart::pipeline::{
    backfill_scores, benchmark_series, build_portfolio, run_backtest_with_progress,
    score_and_store,
};
use hobart_backtest::{
    BacktestConfig, PerformanceSummary, RiskProfile, WeightingScheme, evaluate, formatted_metrics,
};
use hobart_data::yahoo::fundamentals::YahooFundamentalsProvider;
use hobart_data::yahoo::quotes::YahooQuoteProvider;
use hobart_data::{SqliteStore, StockRepository};
use hobart_factors::EngineConfig;
use indicatif::{ProgressBar, ProgressStyle};
use integration::data_pipeline::{
    default_db_path, init_universe, open_store, print_store_info, update_fundamentals,
    update_prices,
};
use serde_json::json;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "hobart")]
#[command(about = "Hobart: Multi-factor equity ranking and backtesting", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the SQLite store (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the store with a universe CSV
    Init {
        /// CSV file with ticker, company_name and sector columns
        universe: PathBuf,
    },

    /// Update price and fundamental data from Yahoo Finance
    Update {
        /// Update daily closes
        #[arg(long)]
        quotes: bool,

        /// Update fundamental snapshots
        #[arg(long)]
        fundamentals: bool,

        /// Update all data
        #[arg(long)]
        full: bool,
    },

    /// Compute and store factor scores for one date
    Score {
        /// As-of date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Compute and store scores on every quarterly rebalance in a range
    Backfill {
        /// First date of the range
        start: NaiveDate,

        /// Last date of the range
        end: NaiveDate,
    },

    /// Show the current top-ranked portfolio for a risk profile
    Portfolio {
        /// Risk profile (conservative, balanced or aggressive)
        profile: RiskProfile,

        /// Number of stocks to select
        #[arg(long, default_value = "20")]
        count: usize,

        /// As-of date (defaults to today; the latest scores at or before
        /// this date are used)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output format (json or text)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Backtest a risk profile over a historical period
    Backtest {
        /// Risk profile (conservative, balanced or aggressive)
        profile: RiskProfile,

        /// First day of the simulation
        start: NaiveDate,

        /// Last day of the simulation
        end: NaiveDate,

        /// Weighting scheme (equal or inverse_volatility)
        #[arg(long, default_value = "equal")]
        weighting: WeightingScheme,

        /// Portfolio size at each rebalance
        #[arg(long, default_value = "20")]
        count: usize,

        /// Compare against a buy-and-hold position in this ticker
        #[arg(long)]
        benchmark: Option<String>,

        /// Output format (json or text)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(default_db_path);

    match cli.command {
        Commands::Init { universe } => {
            let store = open_store(&db_path)?;
            let count = init_universe(&store, &universe)?;
            println!("Initialized universe with {} constituents", count);
            print_store_info(&store, &db_path)?;
        }
        Commands::Update {
            quotes,
            fundamentals,
            full,
        } => {
            let store = open_store(&db_path)?;
            update_data(&store, &db_path, quotes, fundamentals, full).await?;
        }
        Commands::Score { date } => {
            let store = open_store(&db_path)?;
            let as_of = date.unwrap_or_else(|| Local::now().date_naive());
            let scored = score_and_store(&store, as_of, &EngineConfig::default())?;
            println!("Scored {} stocks as of {}", scored, as_of);
        }
        Commands::Backfill { start, end } => {
            let store = open_store(&db_path)?;
            backfill(&store, start, end)?;
        }
        Commands::Portfolio {
            profile,
            count,
            date,
            format,
        } => {
            let store = open_store(&db_path)?;
            let as_of = date.unwrap_or_else(|| Local::now().date_naive());
            show_portfolio(&store, profile, as_of, count, &format)?;
        }
        Commands::Backtest {
            profile,
            start,
            end,
            weighting,
            count,
            benchmark,
            format,
        } => {
            let store = open_store(&db_path)?;
            backtest(&store, profile, weighting, start, end, count, benchmark, &format)?;
        }
    }

    Ok(())
}

fn progress_bar(len: u64, message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("█▓░"),
    );
    pb.set_message(message);
    pb
}

async fn update_data(
    store: &SqliteStore,
    db_path: &std::path::Path,
    quotes: bool,
    fundamentals: bool,
    full: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let do_quotes = full || quotes;
    let do_fundamentals = full || fundamentals;

    if !do_quotes && !do_fundamentals {
        println!("No data selected for update. Use --quotes, --fundamentals, or --full");
        return Ok(());
    }

    let universe_size = store.stocks()?.len() as u64;
    if universe_size == 0 {
        println!("Universe is empty; run `hobart init <universe.csv>` first");
        return Ok(());
    }

    if do_quotes {
        let provider = YahooQuoteProvider::new();
        let pb = progress_bar(universe_size, "Updating daily closes...");
        let stored = update_prices(store, &provider, Some(&pb)).await?;
        pb.finish_with_message(format!("Stored {} price observations", stored));
    }

    if do_fundamentals {
        let provider = YahooFundamentalsProvider::new();
        let pb = progress_bar(universe_size, "Updating fundamentals...");
        let stored = update_fundamentals(store, &provider, Some(&pb)).await?;
        pb.finish_with_message(format!("Stored {} fundamental snapshots", stored));
    }

    print_store_info(store, db_path)?;
    Ok(())
}

fn backfill(
    store: &SqliteStore,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = progress_bar(0, "Backfilling factor scores...");
    let dates = backfill_scores(store, start, end, &EngineConfig::default(), |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    })?;
    pb.finish_with_message(format!("Scored {} rebalance dates", dates.len()));

    match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => {
            println!("Backfilled scores from {} through {}", first, last);
        }
        _ => println!("No quarterly rebalance dates in {}..={}", start, end),
    }
    Ok(())
}

fn show_portfolio(
    store: &SqliteStore,
    profile: RiskProfile,
    as_of: NaiveDate,
    count: usize,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (score_date, positions) = build_portfolio(store, profile, as_of, count)?;

    if format.eq_ignore_ascii_case("json") {
        let output = json!({
            "profile": profile.to_string(),
            "score_date": score_date.to_string(),
            "positions": positions,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!(
        "║{:^62}║",
        format!("TOP {} PORTFOLIO ({})", positions.len(), profile)
    );
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Scores as of: {}", score_date);
    println!();
    println!(
        "{:<4} {:<8} {:>9} {:>6} {:>8} {:>9} {:>7}",
        "#", "Ticker", "Composite", "Value", "Quality", "Momentum", "LowVol"
    );
    println!("─────────────────────────────────────────────────────────");

    for (rank, position) in positions.iter().enumerate() {
        println!(
            "{:<4} {:<8} {:>9.2} {:>6} {:>8} {:>9} {:>7}",
            rank + 1,
            position.ticker,
            position.composite_score,
            fmt_score(position.scores.value_score),
            fmt_score(position.scores.quality_score),
            fmt_score(position.scores.momentum_score),
            fmt_score(position.scores.low_volatility_score),
        );
    }
    println!();
    Ok(())
}

fn fmt_score(score: Option<u8>) -> String {
    score.map_or_else(|| "-".to_string(), |s| s.to_string())
}

#[allow(clippy::too_many_arguments)]
fn backtest(
    store: &SqliteStore,
    profile: RiskProfile,
    weighting: WeightingScheme,
    start: NaiveDate,
    end: NaiveDate,
    count: usize,
    benchmark: Option<String>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = BacktestConfig::new(profile, weighting, start, end);
    config.num_stocks = count;

    let pb = progress_bar(0, "Running backtest...");
    let series = run_backtest_with_progress(store, config, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    })?;
    pb.finish_with_message(format!("{} daily returns", series.len()));

    let summary = evaluate(&series);
    let benchmark_summary = match &benchmark {
        Some(ticker) => {
            let bench = benchmark_series(store, ticker, start, end)?;
            Some((ticker.clone(), evaluate(&bench)))
        }
        None => None,
    };

    if format.eq_ignore_ascii_case("json") {
        let mut output = json!({
            "profile": profile.to_string(),
            "weighting": weighting.to_string(),
            "start": start.to_string(),
            "end": end.to_string(),
            "num_stocks": count,
            "daily_returns": series.len(),
            "metrics": metrics_json(summary.as_ref()),
        });
        if let Some((ticker, bench)) = &benchmark_summary {
            output["benchmark"] = json!({
                "ticker": ticker,
                "metrics": metrics_json(bench.as_ref()),
            });
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", format!("BACKTEST RESULTS ({})", profile));
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Period:     {} to {}", start, end);
    println!("Weighting:  {}", weighting);
    println!("Portfolio:  top {} stocks", count);
    println!();

    print_metrics("Strategy", summary.as_ref());
    if let Some((ticker, bench)) = &benchmark_summary {
        println!();
        print_metrics(&format!("Benchmark ({})", ticker), bench.as_ref());
    }
    println!();
    Ok(())
}

fn print_metrics(title: &str, summary: Option<&PerformanceSummary>) {
    println!("{}", title);
    println!("─────────────────────────────────────────");
    for (name, value) in formatted_metrics(summary) {
        println!("  {:<24} {:>12}", name, value);
    }
}

fn metrics_json(summary: Option<&PerformanceSummary>) -> serde_json::Value {
    summary.map_or_else(
        || json!({ "available": false }),
        |s| {
            json!({
                "available": true,
                "total_return": s.total_return,
                "annualized_return": s.annualized_return,
                "annualized_volatility": s.annualized_volatility,
                "sharpe_ratio": s.sharpe_ratio,
            })
        },
    )
}

//! End-to-end pipeline tests against the in-memory store.

use chrono::NaiveDate;
use hobart::backtest::{
    BacktestConfig, RiskProfile, WeightingScheme, evaluate, portfolio_weights, select_portfolio,
};
use hobart::data::{
    FundamentalSnapshot, MemoryStore, PriceRepository, ScoreRepository, StockRepository,
};
use hobart::factors::EngineConfig;
use hobart::pipeline::{
    backfill_scores, build_portfolio, compute_factor_scores, run_backtest, score_and_store,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Ten stocks with monotonically improving fundamentals and drifts, plus
/// closes through `end`. Stock i's drift grows with i, so later tickers
/// carry stronger momentum.
fn ten_stock_store(end: NaiveDate) -> MemoryStore {
    let mut store = MemoryStore::new();
    for i in 0..10 {
        let ticker = format!("S{i:02}");
        let id = store.add_stock(&ticker, Some("Test"));

        let drift = 0.02 * (i as f64 + 1.0);
        let closes: Vec<f64> = (0..420).map(|t| 100.0 + drift * t as f64).collect();
        store.add_business_day_closes(id, end, &closes);

        let f = i as f64;
        store.add_fundamental(FundamentalSnapshot {
            stock_id: id,
            date_recorded: date(2023, 1, 2),
            pe_ratio: Some(40.0 - 3.0 * f),
            pb_ratio: Some(8.0 - 0.5 * f),
            roe: Some(0.02 + 0.02 * f),
            debt_equity: Some(4.0 - 0.3 * f),
        });
    }
    store
}

#[test]
fn balanced_portfolio_selects_top_five_with_acceptable_momentum() {
    let store = ten_stock_store(date(2024, 6, 28));
    let as_of = date(2024, 4, 1);
    score_and_store(&store, as_of, &EngineConfig::default()).unwrap();

    let (used_date, positions) =
        build_portfolio(&store, RiskProfile::Balanced, as_of, 5).unwrap();
    assert_eq!(used_date, as_of);
    assert_eq!(positions.len(), 5);

    // Every selected stock clears the momentum floor and positions are in
    // descending composite order.
    for position in &positions {
        assert!(position.scores.momentum_score.unwrap() >= 4);
    }
    for pair in positions.windows(2) {
        assert!(pair[0].composite_score >= pair[1].composite_score);
    }

    // Fundamentals and momentum both improve with the stock index, so the
    // best composite belongs to the last ticker.
    assert_eq!(positions[0].ticker, "S09");
}

#[test]
fn periods_without_forward_prices_contribute_nothing() {
    // Prices stop at the end of Q1, so the Q2 rebalance period has scores
    // but no forward closes.
    let store = ten_stock_store(date(2024, 3, 28));
    backfill_scores(
        &store,
        date(2024, 1, 1),
        date(2024, 6, 28),
        &EngineConfig::default(),
        |_, _| {},
    )
    .unwrap();

    let config = BacktestConfig::new(
        RiskProfile::Balanced,
        WeightingScheme::Equal,
        date(2024, 1, 1),
        date(2024, 6, 28),
    );
    let series = run_backtest(&store, config).unwrap();

    assert!(!series.is_empty());
    assert!(series.observations().last().unwrap().0 <= date(2024, 3, 28));
}

#[test]
fn zero_volatility_holding_is_excluded_from_inverse_weights() {
    let mut store = ten_stock_store(date(2024, 6, 28));

    // A flat stock with perfect fundamentals: selectable, but its trailing
    // volatility cannot be inverted.
    let flat = store.add_stock("FLAT", Some("Test"));
    store.add_business_day_closes(flat, date(2024, 6, 28), &[100.0; 420]);
    store.add_fundamental(FundamentalSnapshot {
        stock_id: flat,
        date_recorded: date(2023, 1, 2),
        pe_ratio: Some(5.0),
        pb_ratio: Some(0.5),
        roe: Some(0.50),
        debt_equity: Some(0.1),
    });

    let as_of = date(2024, 4, 1);
    score_and_store(&store, as_of, &EngineConfig::default()).unwrap();

    // The flat series zeroes out FLAT's raw momentum, so lift its stored
    // momentum score to keep it selectable.
    let mut records = store.scores_on(as_of).unwrap();
    for record in &mut records {
        if record.stock_id == flat {
            record.momentum_score = Some(6);
        }
    }
    store.replace_scores(as_of, &records).unwrap();

    let (_, positions) = build_portfolio(&store, RiskProfile::Balanced, as_of, 11).unwrap();
    assert!(positions.iter().any(|p| p.ticker == "FLAT"));
    let trailing: std::collections::HashMap<i64, Vec<f64>> = positions
        .iter()
        .map(|p| {
            let closes = store
                .close_series(p.stock_id, date(2023, 4, 1), as_of)
                .unwrap();
            (p.stock_id, closes.iter().map(|o| o.close).collect())
        })
        .collect();

    let holdings = portfolio_weights(WeightingScheme::InverseVolatility, &positions, &trailing);
    assert!(holdings.iter().all(|h| h.ticker != "FLAT"));

    let total: f64 = holdings.iter().map(|h| h.weight).sum();
    approx::assert_relative_eq!(total, 1.0, epsilon = 1e-12);
}

#[test]
fn scores_ignore_prices_after_the_as_of_date() {
    let as_of = date(2024, 3, 28);
    let store = ten_stock_store(as_of);
    let before = compute_factor_scores(&store, as_of, &EngineConfig::default()).unwrap();

    // Extending every price series past the as-of date must not change
    // anything.
    let mut extended = ten_stock_store(as_of);
    for id in 1..=10i64 {
        extended.add_business_day_closes(id, date(2024, 6, 28), &[500.0, 1.0, 900.0, 2.0]);
    }
    let after = compute_factor_scores(&extended, as_of, &EngineConfig::default()).unwrap();

    assert_eq!(before, after);
}

#[test]
fn backtest_runs_are_deterministic() {
    let store = ten_stock_store(date(2024, 6, 28));
    backfill_scores(
        &store,
        date(2024, 1, 1),
        date(2024, 6, 28),
        &EngineConfig::default(),
        |_, _| {},
    )
    .unwrap();

    let config = BacktestConfig::new(
        RiskProfile::Aggressive,
        WeightingScheme::InverseVolatility,
        date(2024, 1, 1),
        date(2024, 6, 28),
    );
    let first = run_backtest(&store, config.clone()).unwrap();
    let second = run_backtest(&store, config).unwrap();
    assert_eq!(first, second);

    let summary = evaluate(&first).unwrap();
    assert!(summary.total_return.is_finite());
    assert!(summary.annualized_volatility >= 0.0);
}

#[test]
fn stale_scores_still_build_a_portfolio_on_later_dates() {
    let store = ten_stock_store(date(2024, 6, 28));
    let score_date = date(2024, 1, 2);
    score_and_store(&store, score_date, &EngineConfig::default()).unwrap();

    let (used_date, positions) =
        build_portfolio(&store, RiskProfile::Conservative, date(2024, 6, 1), 3).unwrap();
    assert_eq!(used_date, score_date);
    assert_eq!(positions.len(), 3);

    // select_portfolio and the stored records agree on eligibility.
    let stocks = store.stocks().unwrap();
    let records = store.scores_on(score_date).unwrap();
    let direct = select_portfolio(
        &stocks,
        &records,
        &RiskProfile::Conservative.weights(),
        3,
    );
    assert_eq!(
        positions.iter().map(|p| &p.ticker).collect::<Vec<_>>(),
        direct.iter().map(|p| &p.ticker).collect::<Vec<_>>()
    );
}

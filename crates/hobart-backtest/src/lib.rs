#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod calendar;
pub mod composite;
pub mod error;
pub mod performance;
pub mod portfolio;
pub mod profile;
pub mod simulator;
pub mod weights;

pub use calendar::rebalance_dates;
pub use composite::composite_score;
pub use error::{BacktestError, Result};
pub use performance::{PerformanceSummary, TRADING_DAYS_PER_YEAR, evaluate, formatted_metrics};
pub use portfolio::{PortfolioPosition, select_portfolio};
pub use profile::{FactorWeights, RiskProfile, WeightingScheme};
pub use simulator::{BacktestConfig, Backtester, ReturnSeries};
pub use weights::{WeightedHolding, portfolio_weights};

/// Version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

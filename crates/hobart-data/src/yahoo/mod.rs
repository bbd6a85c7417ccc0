//! Yahoo Finance data providers.
//!
//! These providers sit outside the scoring/backtesting core: the pipeline
//! only ever sees data that has already been materialized into a store.

pub mod fundamentals;
pub mod quotes;

pub use fundamentals::{FundamentalFacts, YahooFundamentalsProvider};
pub use quotes::{DailyClose, YahooQuoteProvider};

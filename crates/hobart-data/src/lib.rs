#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod memory;
pub mod model;
pub mod repository;
pub mod sqlite;
pub mod yahoo;

pub use error::{DataError, Result};
pub use memory::MemoryStore;
pub use model::{FactorScoreRecord, FundamentalSnapshot, PriceObservation, Stock};
pub use repository::{
    FundamentalRepository, PriceRepository, ScoreRepository, StockRepository,
};
pub use sqlite::SqliteStore;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

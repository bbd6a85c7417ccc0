#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use hobart_backtest as backtest;
pub use hobart_data as data;
pub use hobart_factors as factors;

pub mod error;
pub mod pipeline;
pub mod universe;

pub use error::{HobartError, Result};
pub use universe::{Constituent, CsvUniverse, Universe, UniverseError};

/// Version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

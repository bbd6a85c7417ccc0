#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod hexile;
pub mod momentum;
pub mod quality;
pub mod ranking;
pub mod value;
pub mod volatility;

pub use engine::{EngineConfig, FactorScoreEngine};
pub use hexile::hexile_scores;
pub use momentum::{MomentumConfig, composite_momentum, trailing_return};
pub use quality::quality_keys;
pub use ranking::{RankDirection, cross_sectional_ranks};
pub use value::value_keys;
pub use volatility::{VolatilityConfig, daily_returns, return_volatility};

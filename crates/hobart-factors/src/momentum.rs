//! Momentum factor - composite trailing return over multiple windows.
//!
//! Momentum captures the tendency of securities with strong recent
//! performance to continue outperforming. The raw metric blends trailing
//! returns over 1/3/6/12-month trading-day windows, weighted toward the
//! longer horizons.

use serde::{Deserialize, Serialize};

/// Configuration for the composite momentum metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumConfig {
    /// Trailing-return windows in trading days, shortest first
    /// (default: 21/63/126/252 for 1/3/6/12 months).
    pub windows: [usize; 4],
    /// Blend weight per window, aligned with `windows` (default:
    /// 0.1/0.2/0.3/0.4, so the 12-month return dominates).
    pub weights: [f64; 4],
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            windows: [21, 63, 126, 252],
            weights: [0.1, 0.2, 0.3, 0.4],
        }
    }
}

/// Trailing percentage return over the last `days` trading days of an
/// ascending close series.
///
/// Returns `None` when the series is too short to reach back `days`
/// observations from the most recent close.
pub fn trailing_return(closes: &[f64], days: usize) -> Option<f64> {
    if closes.len() <= days {
        return None;
    }

    let latest = closes[closes.len() - 1];
    let past = closes[closes.len() - 1 - days];
    Some((latest - past) / past)
}

/// Composite raw momentum: the weighted blend of the configured trailing
/// returns. Any unavailable window propagates as `None`.
pub fn composite_momentum(closes: &[f64], config: &MomentumConfig) -> Option<f64> {
    let mut blended = 0.0;
    for (window, weight) in config.windows.iter().zip(config.weights.iter()) {
        blended += trailing_return(closes, *window)? * weight;
    }
    Some(blended)
}

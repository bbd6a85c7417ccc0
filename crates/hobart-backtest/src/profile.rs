//! Risk profiles, factor weight presets and weighting schemes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BacktestError;

/// Blend weights applied to the four hexile factor scores.
///
/// Weights within a preset sum to 1; a custom instance may use any blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    /// Weight on the value score.
    pub value: f64,
    /// Weight on the quality score.
    pub quality: f64,
    /// Weight on the momentum score.
    pub momentum: f64,
    /// Weight on the low-volatility score.
    pub low_volatility: f64,
}

/// Investor risk profile selecting a factor weight preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    /// Defensive tilt: quality and low volatility dominate.
    Conservative,
    /// Equal weight on all four factors.
    Balanced,
    /// Return-seeking tilt: value and momentum dominate.
    Aggressive,
}

impl RiskProfile {
    /// The factor weight preset for this profile.
    pub fn weights(self) -> FactorWeights {
        match self {
            RiskProfile::Conservative => FactorWeights {
                value: 0.15,
                quality: 0.40,
                momentum: 0.05,
                low_volatility: 0.40,
            },
            RiskProfile::Balanced => FactorWeights {
                value: 0.25,
                quality: 0.25,
                momentum: 0.25,
                low_volatility: 0.25,
            },
            RiskProfile::Aggressive => FactorWeights {
                value: 0.40,
                quality: 0.15,
                momentum: 0.40,
                low_volatility: 0.05,
            },
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Balanced => "balanced",
            RiskProfile::Aggressive => "aggressive",
        };
        write!(f, "{name}")
    }
}

impl FromStr for RiskProfile {
    type Err = BacktestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "conservative" => Ok(RiskProfile::Conservative),
            "balanced" => Ok(RiskProfile::Balanced),
            "aggressive" => Ok(RiskProfile::Aggressive),
            _ => Err(BacktestError::UnknownProfile(s.to_string())),
        }
    }
}

/// How capital is split across the selected portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightingScheme {
    /// Equal weight per holding.
    Equal,
    /// Weight proportional to the inverse of trailing volatility.
    InverseVolatility,
}

impl fmt::Display for WeightingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeightingScheme::Equal => "equal",
            WeightingScheme::InverseVolatility => "inverse_volatility",
        };
        write!(f, "{name}")
    }
}

impl FromStr for WeightingScheme {
    type Err = BacktestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "equal" => Ok(WeightingScheme::Equal),
            "inverse_volatility" | "inverse-volatility" => Ok(WeightingScheme::InverseVolatility),
            _ => Err(BacktestError::UnknownScheme(s.to_string())),
        }
    }
}

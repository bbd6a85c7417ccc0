//! Composite scoring of factor score records.

use hobart_data::FactorScoreRecord;

use crate::profile::FactorWeights;

/// Weighted blend of a record's four hexile scores.
///
/// A factor without a score contributes zero, which penalizes the stock
/// rather than excluding it; momentum eligibility is enforced separately
/// during portfolio selection.
pub fn composite_score(record: &FactorScoreRecord, weights: &FactorWeights) -> f64 {
    let factor = |score: Option<u8>| score.map(f64::from).unwrap_or(0.0);

    factor(record.value_score) * weights.value
        + factor(record.quality_score) * weights.quality
        + factor(record.momentum_score) * weights.momentum
        + factor(record.low_volatility_score) * weights.low_volatility
}

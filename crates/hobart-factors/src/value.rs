//! Value factor - cheapness on P/E and P/B ratios.

use hobart_data::FundamentalSnapshot;

use crate::ranking::{RankDirection, cross_sectional_ranks};

/// Raw value keys for a cross-section of stocks, lower = cheaper = better.
///
/// Each key is the mean of the stock's ascending P/E rank and ascending P/B
/// rank; a missing ratio, or a missing snapshot entirely, ranks at the
/// bottom of its component. Every stock always gets a key, so value is
/// never `None` in the score record.
pub fn value_keys(snapshots: &[Option<&FundamentalSnapshot>]) -> Vec<f64> {
    let pe: Vec<Option<f64>> = snapshots.iter().map(|s| s.and_then(|s| s.pe_ratio)).collect();
    let pb: Vec<Option<f64>> = snapshots.iter().map(|s| s.and_then(|s| s.pb_ratio)).collect();

    let pe_ranks = cross_sectional_ranks(&pe, RankDirection::Ascending);
    let pb_ranks = cross_sectional_ranks(&pb, RankDirection::Ascending);

    pe_ranks
        .iter()
        .zip(pb_ranks.iter())
        .map(|(a, b)| (a + b) / 2.0)
        .collect()
}

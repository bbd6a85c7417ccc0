//! Cross-sectional ranking with missing-value handling.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Direction of a cross-sectional rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankDirection {
    /// Smallest value ranks first (rank 1).
    Ascending,
    /// Largest value ranks first (rank 1).
    Descending,
}

/// Rank a cross-section of optional values.
///
/// Present values receive 1-based ranks in the requested direction, with
/// tied values sharing the average of their positional ranks (pandas
/// `method='average'`). Missing values rank at the bottom: every `None`
/// gets the worst possible rank, the population size.
pub fn cross_sectional_ranks(values: &[Option<f64>], direction: RankDirection) -> Vec<f64> {
    let n = values.len();
    let mut ranks = vec![n as f64; n];

    let mut present: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();

    present.sort_by(|a, b| {
        let ord = a.1.total_cmp(&b.1);
        let ord = match direction {
            RankDirection::Ascending => ord,
            RankDirection::Descending => ord.reverse(),
        };
        // Stable tie-break on input position keeps the pipeline reproducible.
        ord.then(a.0.cmp(&b.0))
    });

    // Assign average ranks over runs of equal values.
    let mut start = 0;
    while start < present.len() {
        let mut end = start;
        while end + 1 < present.len()
            && present[end + 1].1.total_cmp(&present[start].1) == Ordering::Equal
        {
            end += 1;
        }

        let average = (start + 1 + end + 1) as f64 / 2.0;
        for &(index, _) in &present[start..=end] {
            ranks[index] = average;
        }
        start = end + 1;
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascending_ranks() {
        let ranks = cross_sectional_ranks(
            &[Some(30.0), Some(10.0), Some(20.0)],
            RankDirection::Ascending,
        );
        assert_eq!(ranks, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_descending_ranks() {
        let ranks = cross_sectional_ranks(
            &[Some(30.0), Some(10.0), Some(20.0)],
            RankDirection::Descending,
        );
        assert_eq!(ranks, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_ties_share_average_rank() {
        let ranks = cross_sectional_ranks(
            &[Some(10.0), Some(10.0), Some(20.0)],
            RankDirection::Ascending,
        );
        assert_eq!(ranks, vec![1.5, 1.5, 3.0]);
    }

    #[test]
    fn test_missing_values_rank_at_the_bottom() {
        let ranks = cross_sectional_ranks(
            &[Some(10.0), None, Some(20.0), None],
            RankDirection::Ascending,
        );
        assert_eq!(ranks, vec![1.0, 4.0, 2.0, 4.0]);
    }

    #[test]
    fn test_all_missing() {
        let ranks = cross_sectional_ranks(&[None, None], RankDirection::Descending);
        assert_eq!(ranks, vec![2.0, 2.0]);
    }

    #[test]
    fn test_empty_cross_section() {
        let ranks = cross_sectional_ranks(&[], RankDirection::Ascending);
        assert!(ranks.is_empty());
    }
}

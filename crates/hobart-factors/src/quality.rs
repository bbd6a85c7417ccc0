//! Quality factor - profitability and leverage.

use hobart_data::FundamentalSnapshot;

use crate::ranking::{RankDirection, cross_sectional_ranks};

/// Raw quality keys for a cross-section of stocks, lower = better.
///
/// Each key is the mean of the stock's descending ROE rank (higher
/// profitability first) and ascending debt-to-equity rank (lower leverage
/// first). Missing inputs rank at the bottom of their component, so every
/// stock gets a key.
pub fn quality_keys(snapshots: &[Option<&FundamentalSnapshot>]) -> Vec<f64> {
    let roe: Vec<Option<f64>> = snapshots.iter().map(|s| s.and_then(|s| s.roe)).collect();
    let de: Vec<Option<f64>> = snapshots
        .iter()
        .map(|s| s.and_then(|s| s.debt_equity))
        .collect();

    let roe_ranks = cross_sectional_ranks(&roe, RankDirection::Descending);
    let de_ranks = cross_sectional_ranks(&de, RankDirection::Ascending);

    roe_ranks
        .iter()
        .zip(de_ranks.iter())
        .map(|(a, b)| (a + b) / 2.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snapshot(roe: Option<f64>, de: Option<f64>) -> FundamentalSnapshot {
        FundamentalSnapshot {
            stock_id: 0,
            date_recorded: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            pe_ratio: None,
            pb_ratio: None,
            roe,
            debt_equity: de,
        }
    }

    #[test]
    fn test_profitable_low_leverage_stock_gets_the_lowest_key() {
        let a = snapshot(Some(0.30), Some(0.2));
        let b = snapshot(Some(0.10), Some(1.5));
        let c = snapshot(Some(0.02), Some(4.0));

        let keys = quality_keys(&[Some(&a), Some(&b), Some(&c)]);
        assert_eq!(keys, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_high_roe_high_leverage_averages_out() {
        let a = snapshot(Some(0.30), Some(4.0));
        let b = snapshot(Some(0.10), Some(1.5));
        let c = snapshot(Some(0.02), Some(0.2));

        // ROE ranks: 1, 2, 3. D/E ranks: 3, 2, 1.
        let keys = quality_keys(&[Some(&a), Some(&b), Some(&c)]);
        assert_eq!(keys, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_missing_snapshot_ranks_worst() {
        let a = snapshot(Some(0.30), Some(0.2));
        let b = snapshot(Some(0.10), Some(1.5));

        let keys = quality_keys(&[None, Some(&a), Some(&b)]);
        assert_eq!(keys, vec![3.0, 1.0, 2.0]);
    }
}

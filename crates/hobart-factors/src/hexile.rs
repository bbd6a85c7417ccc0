//! Hexile bucketing of a scored cross-section.

/// Bucket a cross-section of goodness keys into hexile scores.
///
/// Inputs are per-stock goodness keys where larger = better; `None` means
/// the raw metric was unavailable and stays `None` in the output. Present
/// keys are sorted worst-to-best (ties broken by input position, so the
/// bucketing is deterministic) and assigned bucket `pos * 6 / k + 1`, which
/// yields scores in `1..=6` with populations that differ by at most one.
///
/// With fewer than six present keys some buckets are empty; a single key
/// scores 1.
pub fn hexile_scores(keys: &[Option<f64>]) -> Vec<Option<u8>> {
    let mut scores = vec![None; keys.len()];

    let mut present: Vec<(usize, f64)> = keys
        .iter()
        .enumerate()
        .filter_map(|(i, k)| k.map(|k| (i, k)))
        .collect();
    present.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    let k = present.len();
    for (pos, &(index, _)) in present.iter().enumerate() {
        scores[index] = Some((pos * 6 / k + 1) as u8);
    }

    scores
}

//! Offset statistics over a correspondence path.
//!
//! Per-pair offset is `track2[j].start - track1[i].start`. Consecutive
//! pairs that share an index (a smear group) contribute a single sample,
//! taken from the group's first pair, so one long line split five ways
//! does not outvote the rest of the path.

use tracing::debug;

use super::types::{AlignmentConfig, OffsetStatistics};
use crate::models::{CorrespondencePair, Entry};

/// Compute offset statistics for `path`.
///
/// Pairs pointing outside either track are ignored. An empty path yields
/// zeroed statistics with `sample_count == 0`.
pub fn compute_offset(
    path: &[CorrespondencePair],
    track1: &[Entry],
    track2: &[Entry],
    config: &AlignmentConfig,
) -> OffsetStatistics {
    let offsets: Vec<f64> = group_starts(path)
        .into_iter()
        .filter_map(|pair| {
            let e1 = track1.get(pair.i)?;
            let e2 = track2.get(pair.j)?;
            Some(e2.start - e1.start)
        })
        .collect();

    if offsets.is_empty() {
        return OffsetStatistics::default();
    }

    let n = offsets.len() as f64;
    let median = calculate_median(&offsets);
    let std_dev = calculate_std_dev(&offsets);
    let mean = offsets.iter().sum::<f64>() / n;
    let min = offsets.iter().copied().fold(f64::INFINITY, f64::min);
    let max = offsets.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let inliers = offsets
        .iter()
        .filter(|o| (*o - median).abs() <= config.offset_consistency_threshold_sd)
        .count();

    let stats = OffsetStatistics {
        median,
        std_dev,
        mean,
        min,
        max,
        sample_count: offsets.len(),
        inlier_fraction: inliers as f64 / n,
    };

    debug!(
        median = stats.median,
        std_dev = stats.std_dev,
        samples = stats.sample_count,
        inlier_fraction = stats.inlier_fraction,
        "Offset statistics"
    );

    stats
}

/// First pair of every run of consecutive pairs sharing an index.
///
/// A smear on track 2 repeats `i`; a smear on track 1 repeats `j`.
pub fn group_starts(path: &[CorrespondencePair]) -> Vec<CorrespondencePair> {
    let mut starts: Vec<CorrespondencePair> = Vec::with_capacity(path.len());
    for &pair in path {
        // Every pair in a run shares the run's index, so comparing with the
        // run's first pair is enough.
        let continues = starts
            .last()
            .is_some_and(|start| start.i == pair.i || start.j == pair.j);
        if !continues {
            starts.push(pair);
        }
    }
    starts
}

/// Median of `values`; the mean of the two middle values for even lengths.
pub fn calculate_median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation.
pub fn calculate_std_dev(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

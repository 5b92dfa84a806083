//! Path validation and confidence scoring.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::AlignmentConfig;
use crate::models::{CorrespondencePair, FailureReason};

const COVERAGE_WEIGHT: f64 = 0.4;
const CONTINUITY_WEIGHT: f64 = 0.3;
const DISPERSION_WEIGHT: f64 = 0.3;

/// Gate a path before it may produce a result.
///
/// Length is checked first, then offset dispersion.
pub fn validate_path(
    path: &[CorrespondencePair],
    std_dev: f64,
    config: &AlignmentConfig,
) -> Result<(), FailureReason> {
    if path.len() < config.min_path_length {
        debug!(
            path_length = path.len(),
            min_path_length = config.min_path_length,
            "Path too short"
        );
        return Err(FailureReason::PathTooShort);
    }

    if std_dev > config.offset_consistency_threshold_sd {
        debug!(
            std_dev,
            threshold = config.offset_consistency_threshold_sd,
            "Offsets inconsistent"
        );
        return Err(FailureReason::OffsetInconsistent);
    }

    Ok(())
}

/// The three inputs to the confidence score, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceComponents {
    /// Path length relative to the shorter track.
    pub coverage: f64,
    /// Fraction of path steps that skipped nothing.
    pub continuity: f64,
    /// `1 / (1 + std_dev / threshold)`.
    pub dispersion: f64,
}

impl ConfidenceComponents {
    pub fn compute(
        path: &[CorrespondencePair],
        std_dev: f64,
        len1: usize,
        len2: usize,
        config: &AlignmentConfig,
    ) -> Self {
        let shorter = len1.min(len2);
        let coverage = if shorter == 0 {
            0.0
        } else {
            (path.len() as f64 / shorter as f64).min(1.0)
        };

        let steps = path.len().saturating_sub(1);
        let continuity = if steps == 0 {
            1.0
        } else {
            (steps - count_gap_steps(path)) as f64 / steps as f64
        };

        let threshold = config.offset_consistency_threshold_sd;
        let dispersion = if threshold > 0.0 {
            1.0 / (1.0 + std_dev.max(0.0) / threshold)
        } else if std_dev > 0.0 {
            0.0
        } else {
            1.0
        };

        Self {
            coverage,
            continuity,
            dispersion,
        }
    }

    /// Weighted sum, clamped to `[0, 1]`.
    pub fn score(&self) -> f64 {
        (COVERAGE_WEIGHT * self.coverage
            + CONTINUITY_WEIGHT * self.continuity
            + DISPERSION_WEIGHT * self.dispersion)
            .clamp(0.0, 1.0)
    }
}

/// Confidence of an accepted path in `[0, 1]`.
pub fn score_confidence(
    path: &[CorrespondencePair],
    std_dev: f64,
    len1: usize,
    len2: usize,
    config: &AlignmentConfig,
) -> f64 {
    ConfidenceComponents::compute(path, std_dev, len1, len2, config).score()
}

/// Steps between consecutive pairs that skipped at least one entry.
pub fn count_gap_steps(path: &[CorrespondencePair]) -> usize {
    path.windows(2)
        .filter(|w| {
            let di = w[1].i.saturating_sub(w[0].i);
            let dj = w[1].j.saturating_sub(w[0].j);
            di > 1 || dj > 1
        })
        .count()
}

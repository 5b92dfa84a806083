//! The Phonetic Walk aligner.
//!
//! Composes the pure component functions into the full decision:
//! anchor → walk → offset statistics → validation → confidence.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::anchor::find_anchor;
use super::offset::compute_offset;
use super::path::follow_path;
use super::similarity::entry_similarity;
use super::smear::detect_smear;
use super::types::{
    AlignmentConfig, Anchor, OffsetStatistics, SmearMatch, WalkOutcome, WalkTermination,
};
use super::validation::{score_confidence, validate_path, ConfidenceComponents};
use crate::models::{AlignmentResult, CorrespondencePair, Entry, FailureReason};

/// A strategy that derives a global offset between two tracks.
pub trait Aligner: Send + Sync {
    /// Get the name of this alignment strategy.
    fn name(&self) -> &'static str;

    /// Align `track2` against `track1`.
    fn align(&self, track1: &[Entry], track2: &[Entry]) -> AlignmentResult;
}

/// What happened during an alignment, for logging and reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentDiagnostics {
    pub track1_len: usize,
    pub track2_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Anchor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination: Option<WalkTermination>,
    pub path_length: usize,
    pub gap_steps: usize,
    pub missed_steps: usize,
    pub smear_groups: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<OffsetStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_components: Option<ConfidenceComponents>,
}

/// Result plus diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentOutcome {
    pub result: AlignmentResult,
    pub diagnostics: AlignmentDiagnostics,
}

/// Greedy phonetic path-walk aligner.
#[derive(Debug, Clone, Default)]
pub struct PhoneticWalk {
    config: AlignmentConfig,
}

impl PhoneticWalk {
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    pub fn score_similarity(&self, e1: &Entry, e2: &Entry) -> f64 {
        entry_similarity(e1, e2, self.config.speaker_mismatch_penalty)
    }

    pub fn find_anchor(&self, track1: &[Entry], track2: &[Entry]) -> Option<Anchor> {
        find_anchor(track1, track2, &self.config)
    }

    pub fn follow_path(&self, track1: &[Entry], track2: &[Entry], anchor: &Anchor) -> WalkOutcome {
        follow_path(track1, track2, anchor, &self.config)
    }

    pub fn detect_smear(
        &self,
        track1: &[Entry],
        track2: &[Entry],
        i: usize,
        j: usize,
    ) -> Option<SmearMatch> {
        detect_smear(track1, track2, i, j, &self.config)
    }

    pub fn compute_offset(
        &self,
        path: &[CorrespondencePair],
        track1: &[Entry],
        track2: &[Entry],
    ) -> OffsetStatistics {
        compute_offset(path, track1, track2, &self.config)
    }

    pub fn validate_path(
        &self,
        path: &[CorrespondencePair],
        std_dev: f64,
    ) -> Result<(), FailureReason> {
        validate_path(path, std_dev, &self.config)
    }

    pub fn score_confidence(
        &self,
        path: &[CorrespondencePair],
        std_dev: f64,
        len1: usize,
        len2: usize,
    ) -> f64 {
        score_confidence(path, std_dev, len1, len2, &self.config)
    }

    /// Run the full alignment and keep the intermediate findings.
    pub fn align_with_diagnostics(&self, track1: &[Entry], track2: &[Entry]) -> AlignmentOutcome {
        let mut diagnostics = AlignmentDiagnostics {
            track1_len: track1.len(),
            track2_len: track2.len(),
            ..Default::default()
        };

        let fail = |reason: FailureReason, diagnostics: AlignmentDiagnostics| {
            info!(%reason, "Alignment failed");
            AlignmentOutcome {
                result: AlignmentResult::failure(reason),
                diagnostics,
            }
        };

        if track1.is_empty() || track2.is_empty() {
            return fail(FailureReason::InsufficientData, diagnostics);
        }

        if let Err(e) = self.config.validate() {
            warn!("{}", e);
            return fail(FailureReason::InvalidInput, diagnostics);
        }

        if let Some(bad) = track1.iter().chain(track2).find(|e| !has_finite_times(e)) {
            warn!(id = %bad.id, start = bad.start, "Entry has a non-finite timestamp");
            return fail(FailureReason::InvalidInput, diagnostics);
        }

        let Some(anchor) = self.find_anchor(track1, track2) else {
            return fail(FailureReason::NoAnchorFound, diagnostics);
        };
        diagnostics.anchor = Some(anchor);

        let walk = self.follow_path(track1, track2, &anchor);
        diagnostics.termination = Some(walk.termination);
        diagnostics.path_length = walk.path.len();
        diagnostics.gap_steps = walk.gap_steps;
        diagnostics.missed_steps = walk.missed_steps;
        diagnostics.smear_groups = walk.smear_groups;

        let stats = self.compute_offset(&walk.path, track1, track2);
        let std_dev = stats.std_dev;
        let median = stats.median;
        diagnostics.offset = Some(stats);

        if let Err(reason) = self.validate_path(&walk.path, std_dev) {
            return fail(reason, diagnostics);
        }

        let components = ConfidenceComponents::compute(
            &walk.path,
            std_dev,
            track1.len(),
            track2.len(),
            &self.config,
        );
        let confidence = components.score();
        diagnostics.confidence_components = Some(components);

        info!(
            offset_seconds = median,
            confidence,
            path_length = walk.path.len(),
            "Alignment succeeded"
        );

        AlignmentOutcome {
            result: AlignmentResult::Success {
                offset_seconds: median,
                confidence,
                alignment_path: walk.path,
            },
            diagnostics,
        }
    }
}

impl Aligner for PhoneticWalk {
    fn name(&self) -> &'static str {
        "Phonetic Walk"
    }

    fn align(&self, track1: &[Entry], track2: &[Entry]) -> AlignmentResult {
        debug!(
            track1_len = track1.len(),
            track2_len = track2.len(),
            "Aligning tracks"
        );
        self.align_with_diagnostics(track1, track2).result
    }
}

fn has_finite_times(entry: &Entry) -> bool {
    entry.start.is_finite() && entry.end.map_or(true, f64::is_finite)
}

/// Align two tracks with the Phonetic Walk.
///
/// `None` uses the default configuration.
pub fn align(
    track1: &[Entry],
    track2: &[Entry],
    config: Option<&AlignmentConfig>,
) -> AlignmentResult {
    let config = config.cloned().unwrap_or_default();
    PhoneticWalk::new(config).align(track1, track2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(k: usize) -> Vec<String> {
        (0..3).map(|n| format!("P{}_{}", k, n)).collect()
    }

    fn track(n: usize, offset: f64) -> Vec<Entry> {
        (0..n)
            .map(|k| {
                let start = k as f64 * 2.5 + offset;
                Entry::new(k, start, Some(start + 2.0), word(k))
            })
            .collect()
    }

    #[test]
    fn uniform_shift_recovers_offset() {
        let t1 = track(12, 0.0);
        let t2 = track(12, 3.25);

        let result = align(&t1, &t2, None);
        assert!(result.is_success());
        assert!((result.offset_seconds().unwrap() - 3.25).abs() < 1e-9);
        assert!(result.confidence().unwrap() > 0.5);
        assert_eq!(result.alignment_path().len(), 12);
    }

    #[test]
    fn negative_offset() {
        let t1 = track(8, 10.0);
        let t2 = track(8, 0.0);

        let result = align(&t1, &t2, None);
        assert!((result.offset_seconds().unwrap() + 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_track_is_insufficient_data() {
        let t1 = track(5, 0.0);
        assert_eq!(
            align(&t1, &[], None).reason(),
            Some(FailureReason::InsufficientData)
        );
        assert_eq!(
            align(&[], &t1, None).reason(),
            Some(FailureReason::InsufficientData)
        );
    }

    #[test]
    fn non_finite_start_is_invalid_input() {
        let t1 = track(6, 0.0);
        let mut t2 = track(6, 1.0);
        t2[3].start = f64::NAN;

        assert_eq!(align(&t1, &t2, None).reason(), Some(FailureReason::InvalidInput));
    }

    #[test]
    fn invalid_config_is_invalid_input() {
        let config = AlignmentConfig {
            phonetic_similarity_threshold: 1.5,
            ..Default::default()
        };
        let t1 = track(6, 0.0);
        assert_eq!(
            align(&t1, &t1, Some(&config)).reason(),
            Some(FailureReason::InvalidInput)
        );
    }

    #[test]
    fn unrelated_tracks_have_no_anchor() {
        let t1 = track(6, 0.0);
        let t2: Vec<Entry> = (0..6)
            .map(|k| Entry::new(k, k as f64, None, [format!("Q{}", k)]))
            .collect();

        assert_eq!(align(&t1, &t2, None).reason(), Some(FailureReason::NoAnchorFound));
    }

    #[test]
    fn short_tracks_give_path_too_short() {
        let t1 = track(3, 0.0);
        let t2 = track(3, 1.0);

        let outcome = PhoneticWalk::default().align_with_diagnostics(&t1, &t2);
        assert_eq!(outcome.result.reason(), Some(FailureReason::PathTooShort));
        assert_eq!(outcome.diagnostics.path_length, 3);
        assert!(outcome.diagnostics.offset.is_some());
    }

    #[test]
    fn dispersion_gate() {
        // Offsets alternate around 4.0; the anchor lands on the first pair
        // with the smaller |Δt|, which is index 1.
        let build = |spread: f64| {
            let t1 = track(10, 0.0);
            let t2: Vec<Entry> = t1
                .iter()
                .enumerate()
                .map(|(k, e)| {
                    let delta = if k % 2 == 0 { spread } else { -spread };
                    e.shifted(4.0 + delta)
                })
                .collect();
            (t1, t2)
        };

        let (t1, t2) = build(0.55);
        let outcome = PhoneticWalk::default().align_with_diagnostics(&t1, &t2);
        assert_eq!(outcome.diagnostics.anchor.map(|a| a.i), Some(1));
        assert_eq!(
            outcome.result.reason(),
            Some(FailureReason::OffsetInconsistent)
        );

        let (t1, t2) = build(0.45);
        assert!(align(&t1, &t2, None).is_success());
    }

    #[test]
    fn diagnostics_describe_the_walk() {
        let t1 = track(10, 0.0);
        let t2 = track(10, 2.0);

        let outcome = PhoneticWalk::default().align_with_diagnostics(&t1, &t2);
        let d = &outcome.diagnostics;
        assert_eq!(d.anchor.map(|a| (a.i, a.j)), Some((0, 0)));
        assert_eq!(d.termination, Some(WalkTermination::Exhausted));
        assert_eq!(d.path_length, 10);
        assert_eq!(d.gap_steps, 0);
        assert!(d.confidence_components.is_some());
    }

    #[test]
    fn strategy_name() {
        let aligner: Box<dyn Aligner> = Box::new(PhoneticWalk::default());
        assert_eq!(aligner.name(), "Phonetic Walk");
    }
}

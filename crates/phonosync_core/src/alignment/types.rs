//! Core types for phonetic alignment.

use serde::{Deserialize, Serialize};

use crate::models::CorrespondencePair;

pub const DEFAULT_PHONETIC_SIMILARITY_THRESHOLD: f64 = 0.7;
pub const DEFAULT_SMEAR_SIMILARITY_THRESHOLD: f64 = 0.5;
pub const DEFAULT_INITIAL_SEARCH_WINDOW_SECONDS: f64 = 120.0;
pub const DEFAULT_STEPS: [usize; 2] = [1, 2];
/// Largest step accepted on either axis.
pub const MAX_STEP: usize = 64;
pub const DEFAULT_MIN_PATH_LENGTH: usize = 5;
pub const DEFAULT_MAX_CONSECUTIVE_GAPS: usize = 2;
pub const DEFAULT_GAP_PENALTY: f64 = 0.1;
pub const DEFAULT_SPEAKER_MISMATCH_PENALTY: f64 = 0.5;
pub const DEFAULT_OFFSET_CONSISTENCY_THRESHOLD_SD: f64 = 0.5;

/// Relative index offsets probed when extending the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchNeighborhood {
    /// Forward steps on track 1.
    #[serde(default = "default_steps")]
    pub i_steps: Vec<usize>,
    /// Forward steps on track 2.
    #[serde(default = "default_steps")]
    pub j_steps: Vec<usize>,
}

fn default_steps() -> Vec<usize> {
    DEFAULT_STEPS.to_vec()
}

impl Default for SearchNeighborhood {
    fn default() -> Self {
        Self {
            i_steps: default_steps(),
            j_steps: default_steps(),
        }
    }
}

impl SearchNeighborhood {
    /// Largest step on track 1 (0 if none configured).
    pub fn max_i_step(&self) -> usize {
        self.i_steps.iter().copied().max().unwrap_or(0)
    }

    /// Largest step on track 2 (0 if none configured).
    pub fn max_j_step(&self) -> usize {
        self.j_steps.iter().copied().max().unwrap_or(0)
    }
}

/// Alignment parameters.
///
/// Built fresh per call from constant defaults; never shared mutably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Minimum score to accept a direct match.
    #[serde(default = "default_phonetic_similarity_threshold")]
    pub phonetic_similarity_threshold: f64,

    /// Minimum combined score to accept a multi-entry smear match.
    #[serde(default = "default_smear_similarity_threshold")]
    pub smear_similarity_threshold: f64,

    /// Max |Δstart| considered when anchoring.
    #[serde(default = "default_initial_search_window_seconds")]
    pub initial_search_window_seconds: f64,

    /// Steps probed per axis when extending the path.
    #[serde(default)]
    pub local_search_neighborhood: SearchNeighborhood,

    /// Minimum accepted pairs for a valid result.
    #[serde(default = "default_min_path_length")]
    pub min_path_length: usize,

    /// Max consecutive unmatched steps before the walk is abandoned.
    #[serde(default = "default_max_consecutive_gaps")]
    pub max_consecutive_gaps: usize,

    /// Penalty per skipped entry.
    #[serde(default = "default_gap_penalty")]
    pub gap_penalty: f64,

    /// Subtracted when both speakers are known and differ.
    #[serde(default = "default_speaker_mismatch_penalty")]
    pub speaker_mismatch_penalty: f64,

    /// Max standard deviation of per-pair offsets (seconds).
    #[serde(default = "default_offset_consistency_threshold_sd")]
    pub offset_consistency_threshold_sd: f64,
}

fn default_phonetic_similarity_threshold() -> f64 {
    DEFAULT_PHONETIC_SIMILARITY_THRESHOLD
}

fn default_smear_similarity_threshold() -> f64 {
    DEFAULT_SMEAR_SIMILARITY_THRESHOLD
}

fn default_initial_search_window_seconds() -> f64 {
    DEFAULT_INITIAL_SEARCH_WINDOW_SECONDS
}

fn default_min_path_length() -> usize {
    DEFAULT_MIN_PATH_LENGTH
}

fn default_max_consecutive_gaps() -> usize {
    DEFAULT_MAX_CONSECUTIVE_GAPS
}

fn default_gap_penalty() -> f64 {
    DEFAULT_GAP_PENALTY
}

fn default_speaker_mismatch_penalty() -> f64 {
    DEFAULT_SPEAKER_MISMATCH_PENALTY
}

fn default_offset_consistency_threshold_sd() -> f64 {
    DEFAULT_OFFSET_CONSISTENCY_THRESHOLD_SD
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            phonetic_similarity_threshold: DEFAULT_PHONETIC_SIMILARITY_THRESHOLD,
            smear_similarity_threshold: DEFAULT_SMEAR_SIMILARITY_THRESHOLD,
            initial_search_window_seconds: DEFAULT_INITIAL_SEARCH_WINDOW_SECONDS,
            local_search_neighborhood: SearchNeighborhood::default(),
            min_path_length: DEFAULT_MIN_PATH_LENGTH,
            max_consecutive_gaps: DEFAULT_MAX_CONSECUTIVE_GAPS,
            gap_penalty: DEFAULT_GAP_PENALTY,
            speaker_mismatch_penalty: DEFAULT_SPEAKER_MISMATCH_PENALTY,
            offset_consistency_threshold_sd: DEFAULT_OFFSET_CONSISTENCY_THRESHOLD_SD,
        }
    }
}

impl AlignmentConfig {
    /// Check every field is inside its meaningful range.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        check_unit("phonetic_similarity_threshold", self.phonetic_similarity_threshold)?;
        check_unit("smear_similarity_threshold", self.smear_similarity_threshold)?;
        check_non_negative(
            "initial_search_window_seconds",
            self.initial_search_window_seconds,
        )?;
        check_non_negative("gap_penalty", self.gap_penalty)?;
        check_non_negative("speaker_mismatch_penalty", self.speaker_mismatch_penalty)?;
        check_non_negative(
            "offset_consistency_threshold_sd",
            self.offset_consistency_threshold_sd,
        )?;

        if self.min_path_length == 0 {
            return Err(InvalidConfig::new("min_path_length", "must be at least 1"));
        }

        let neighborhood = &self.local_search_neighborhood;
        for (field, steps) in [
            ("local_search_neighborhood.i_steps", &neighborhood.i_steps),
            ("local_search_neighborhood.j_steps", &neighborhood.j_steps),
        ] {
            if steps.is_empty() {
                return Err(InvalidConfig::new(field, "must list at least one step"));
            }
            if steps.contains(&0) {
                return Err(InvalidConfig::new(field, "steps must be positive"));
            }
            if let Some(step) = steps.iter().find(|&&s| s > MAX_STEP) {
                return Err(InvalidConfig::new(
                    field,
                    format!("step {} exceeds the maximum of {}", step, MAX_STEP),
                ));
            }
        }

        Ok(())
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), InvalidConfig> {
    if !(0.0..=1.0).contains(&value) {
        return Err(InvalidConfig::new(
            field,
            format!("{} is outside [0, 1]", value),
        ));
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), InvalidConfig> {
    if !value.is_finite() || value < 0.0 {
        return Err(InvalidConfig::new(
            field,
            format!("{} must be a finite non-negative number", value),
        ));
    }
    Ok(())
}

/// A configuration value outside its valid range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid alignment setting '{field}': {message}")]
pub struct InvalidConfig {
    pub field: &'static str,
    pub message: String,
}

impl InvalidConfig {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Which track a multi-entry group was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackSide {
    Track1,
    Track2,
}

impl std::fmt::Display for TrackSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackSide::Track1 => write!(f, "track1"),
            TrackSide::Track2 => write!(f, "track2"),
        }
    }
}

/// The seed correspondence for the walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub i: usize,
    pub j: usize,
    pub score: f64,
}

impl Anchor {
    pub fn pair(&self) -> CorrespondencePair {
        CorrespondencePair::new(self.i, self.j)
    }
}

/// A one-to-many correspondence.
///
/// `anchor_index` indexes the single entry; `other_indices` are consecutive
/// indices on `multi_side` whose concatenated phonemes matched it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmearMatch {
    pub multi_side: TrackSide,
    pub anchor_index: usize,
    pub other_indices: Vec<usize>,
    pub combined_score: f64,
}

impl SmearMatch {
    /// Expand into path pairs, one per grouped entry.
    pub fn pairs(&self) -> Vec<CorrespondencePair> {
        self.other_indices
            .iter()
            .map(|&other| match self.multi_side {
                TrackSide::Track2 => CorrespondencePair::new(self.anchor_index, other),
                TrackSide::Track1 => CorrespondencePair::new(other, self.anchor_index),
            })
            .collect()
    }
}

/// How the path walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkTermination {
    /// No candidate position was left inside either track.
    Exhausted,
    /// Too many consecutive steps without a match.
    GapLimit,
}

impl std::fmt::Display for WalkTermination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkTermination::Exhausted => write!(f, "track exhausted"),
            WalkTermination::GapLimit => write!(f, "gap limit reached"),
        }
    }
}

/// Path produced by the walk, with bookkeeping for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkOutcome {
    pub path: Vec<CorrespondencePair>,
    pub termination: WalkTermination,
    /// Accepted steps that skipped entries.
    pub gap_steps: usize,
    /// Steps where nothing matched.
    pub missed_steps: usize,
    /// Accepted smear groups.
    pub smear_groups: usize,
}

/// Offset statistics over a path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OffsetStatistics {
    /// Median per-pair offset (seconds).
    pub median: f64,
    /// Population standard deviation of per-pair offsets.
    pub std_dev: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Offsets sampled (one per smear group).
    pub sample_count: usize,
    /// Share of samples within the consistency threshold of the median.
    pub inlier_fraction: f64,
}

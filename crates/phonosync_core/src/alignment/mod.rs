//! Phonetic alignment of caption tracks.
//!
//! Two caption tracks for the same audio are matched on phoneme content
//! rather than exact text, and a single global time offset is derived
//! from the matches.
//!
//! # Architecture
//!
//! The pipeline consists of pure functions composed by [`PhoneticWalk`]:
//!
//! 1. **Similarity** (`similarity`): Levenshtein ratio over phoneme tokens,
//!    with a speaker mismatch penalty.
//!
//! 2. **Anchor** (`anchor`): Best-scoring pair inside the initial time window.
//!
//! 3. **Path Walk** (`path`): Greedy forward walk from the anchor with local
//!    search, gap penalties and a consecutive-gap limit.
//!
//! 4. **Smear Detection** (`smear`): One-to-many matches where one track
//!    splits what the other keeps whole.
//!
//! 5. **Offset Statistics** (`offset`): Median and dispersion of per-pair
//!    offsets.
//!
//! 6. **Validation** (`validation`): Path length and dispersion gates, then
//!    the confidence score.
//!
//! # Usage
//!
//! ```ignore
//! use phonosync_core::alignment::{align, AlignmentConfig};
//!
//! let result = align(&track1, &track2, None);
//! if let Some(offset) = result.offset_seconds() {
//!     let shifted = phonosync_core::models::apply_offset(&track1, offset);
//! }
//! ```

mod aligner;
mod anchor;
mod offset;
mod path;
mod similarity;
mod smear;
mod types;
mod validation;

pub use aligner::{align, Aligner, AlignmentDiagnostics, AlignmentOutcome, PhoneticWalk};
pub use anchor::find_anchor;
pub use offset::{calculate_median, calculate_std_dev, compute_offset, group_starts};
pub use path::follow_path;
pub use similarity::{entry_similarity, phonetic_similarity, sequence_similarity};
pub use smear::detect_smear;
pub use types::{
    AlignmentConfig, Anchor, InvalidConfig, OffsetStatistics, SearchNeighborhood, SmearMatch,
    TrackSide, WalkOutcome, WalkTermination, DEFAULT_GAP_PENALTY, DEFAULT_INITIAL_SEARCH_WINDOW_SECONDS,
    DEFAULT_MAX_CONSECUTIVE_GAPS, DEFAULT_MIN_PATH_LENGTH, DEFAULT_OFFSET_CONSISTENCY_THRESHOLD_SD,
    DEFAULT_PHONETIC_SIMILARITY_THRESHOLD, DEFAULT_SMEAR_SIMILARITY_THRESHOLD,
    DEFAULT_SPEAKER_MISMATCH_PENALTY, DEFAULT_STEPS, MAX_STEP,
};
pub use validation::{count_gap_steps, score_confidence, validate_path, ConfidenceComponents};

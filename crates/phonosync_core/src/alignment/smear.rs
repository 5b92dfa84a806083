//! One-to-many ("smear") correspondence detection.
//!
//! One source often splits a long line into several entries that the other
//! source keeps whole. When a direct match at `(i, j)` fails, consecutive
//! entries starting at `j` on track 2 (or at `i` on track 1) are concatenated
//! and rescored against the single entry on the other side.
//!
//! Grouping is strictly one-to-many per call; many-to-many is not attempted.

use tracing::trace;

use super::similarity::{entry_similarity, phonetic_similarity};
use super::types::{AlignmentConfig, SmearMatch, TrackSide};
use crate::models::Entry;

/// Detect a smear match at `(i, j)`.
///
/// Returns `None` when the direct match already meets the primary threshold,
/// when indices are out of range, or when no grouping qualifies. Smaller
/// groups win; at equal size the track 2 grouping is tried first.
pub fn detect_smear(
    track1: &[Entry],
    track2: &[Entry],
    i: usize,
    j: usize,
    config: &AlignmentConfig,
) -> Option<SmearMatch> {
    let (e1, e2) = (track1.get(i)?, track2.get(j)?);

    let direct = entry_similarity(e1, e2, config.speaker_mismatch_penalty);
    if direct >= config.phonetic_similarity_threshold {
        return None;
    }

    // Groups never reach past the end of their track
    let neighborhood = &config.local_search_neighborhood;
    let max_track2_group = neighborhood
        .max_j_step()
        .saturating_add(1)
        .min(track2.len() - j);
    let max_track1_group = neighborhood
        .max_i_step()
        .saturating_add(1)
        .min(track1.len() - i);
    let largest = max_track1_group.max(max_track2_group);

    for size in 2..=largest {
        if size <= max_track2_group && j + size <= track2.len() {
            let members = &track2[j..j + size];
            if let Some(combined) = score_group(e1, members, config) {
                return Some(SmearMatch {
                    multi_side: TrackSide::Track2,
                    anchor_index: i,
                    other_indices: (j..j + size).collect(),
                    combined_score: combined,
                });
            }
        }

        if size <= max_track1_group && i + size <= track1.len() {
            let members = &track1[i..i + size];
            if let Some(combined) = score_group(e2, members, config) {
                return Some(SmearMatch {
                    multi_side: TrackSide::Track1,
                    anchor_index: j,
                    other_indices: (i..i + size).collect(),
                    combined_score: combined,
                });
            }
        }
    }

    None
}

/// Score `single` against the concatenation of `members`.
///
/// Returns the combined score when it meets the smear threshold and beats
/// every single-member score.
fn score_group(single: &Entry, members: &[Entry], config: &AlignmentConfig) -> Option<f64> {
    let concatenated: Vec<&str> = members
        .iter()
        .flat_map(|m| m.phonemes.iter().map(String::as_str))
        .collect();

    let combined = phonetic_similarity(
        &single.phonemes,
        &concatenated,
        single.speaker.as_deref(),
        common_speaker(members),
        config.speaker_mismatch_penalty,
    );

    let best_single = members
        .iter()
        .map(|m| entry_similarity(single, m, config.speaker_mismatch_penalty))
        .fold(0.0, f64::max);

    trace!(
        group_size = members.len(),
        combined,
        best_single,
        "smear group scored"
    );

    if combined >= config.smear_similarity_threshold && combined > best_single {
        Some(combined)
    } else {
        None
    }
}

/// The speaker shared by every member, or `None` if any is unknown or they differ.
fn common_speaker(members: &[Entry]) -> Option<&str> {
    let first = members.first()?.speaker.as_deref()?;
    members
        .iter()
        .all(|m| m.speaker.as_deref() == Some(first))
        .then_some(first)
}

//! Initial anchor search.
//!
//! Finds the best-scoring correspondence whose start times lie within the
//! configured search window. Tracks are sorted by start, so each row of
//! candidates is located with a binary search instead of a full scan.

use tracing::{debug, trace};

use super::similarity::entry_similarity;
use super::types::{AlignmentConfig, Anchor};
use crate::models::Entry;

/// Time differences closer than this are treated as equal.
const TIME_EPSILON: f64 = 1e-9;

/// Find the anchor pair, or `None` if nothing reaches the direct threshold.
///
/// Ties on score are broken by the smaller time difference, then the
/// smaller `i`, then the smaller `j`. Time differences that only differ by
/// floating-point noise count as equal.
pub fn find_anchor(track1: &[Entry], track2: &[Entry], config: &AlignmentConfig) -> Option<Anchor> {
    let window = config.initial_search_window_seconds;

    // (score, |Δt|, i, j)
    let mut best: Option<(f64, f64, usize, usize)> = None;
    let mut candidates = 0usize;

    for (i, e1) in track1.iter().enumerate() {
        let lower = e1.start - window;
        let first = track2.partition_point(|e2| e2.start < lower);

        for (j, e2) in track2.iter().enumerate().skip(first) {
            if e2.start > e1.start + window {
                break;
            }
            let dt = (e2.start - e1.start).abs();
            candidates += 1;

            let score = entry_similarity(e1, e2, config.speaker_mismatch_penalty);
            trace!(i, j, score, dt, "anchor candidate");

            let better = match best {
                None => true,
                Some((best_score, best_dt, _, _)) => {
                    score > best_score || (score == best_score && dt < best_dt - TIME_EPSILON)
                }
            };
            if better {
                best = Some((score, dt, i, j));
            }
        }
    }

    match best {
        Some((score, dt, i, j)) if score >= config.phonetic_similarity_threshold => {
            debug!(i, j, score, dt, candidates, "Anchor found");
            Some(Anchor { i, j, score })
        }
        Some((score, _, i, j)) => {
            debug!(
                i,
                j,
                score,
                threshold = config.phonetic_similarity_threshold,
                candidates,
                "Best anchor candidate below threshold"
            );
            None
        }
        None => {
            debug!("No anchor candidates inside the search window");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: usize, start: f64, phonemes: &[&str]) -> Entry {
        Entry::new(id, start, Some(start + 1.0), phonemes.iter().copied())
    }

    #[test]
    fn picks_highest_scoring_pair() {
        let track1 = vec![
            entry(0, 0.0, &["AA", "B"]),
            entry(1, 2.0, &["K", "AE", "T"]),
        ];
        let track2 = vec![
            entry(0, 5.0, &["D", "AO", "G"]),
            entry(1, 7.0, &["K", "AE", "T"]),
        ];

        let anchor = find_anchor(&track1, &track2, &AlignmentConfig::default()).unwrap();
        assert_eq!((anchor.i, anchor.j), (1, 1));
        assert_eq!(anchor.score, 1.0);
    }

    #[test]
    fn respects_search_window() {
        let track1 = vec![entry(0, 0.0, &["K", "AE", "T"])];
        let track2 = vec![entry(0, 500.0, &["K", "AE", "T"])];

        assert!(find_anchor(&track1, &track2, &AlignmentConfig::default()).is_none());

        let wide = AlignmentConfig {
            initial_search_window_seconds: 600.0,
            ..Default::default()
        };
        assert!(find_anchor(&track1, &track2, &wide).is_some());
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let track1 = vec![entry(0, 10.0, &["K", "AE", "T"])];
        let track2 = vec![entry(0, 130.0, &["K", "AE", "T"])];
        assert!(find_anchor(&track1, &track2, &AlignmentConfig::default()).is_some());
    }

    #[test]
    fn ties_prefer_smaller_time_difference() {
        let track1 = vec![entry(0, 10.0, &["S", "OW"])];
        let track2 = vec![
            entry(0, 2.0, &["S", "OW"]),
            entry(1, 11.0, &["S", "OW"]),
            entry(2, 30.0, &["S", "OW"]),
        ];

        let anchor = find_anchor(&track1, &track2, &AlignmentConfig::default()).unwrap();
        assert_eq!(anchor.j, 1);
    }

    #[test]
    fn full_ties_prefer_smallest_indices() {
        let track1 = vec![entry(0, 0.0, &["N", "OW"]), entry(1, 1.0, &["S", "IY"])];
        let track2 = vec![entry(0, 3.0, &["N", "OW"]), entry(1, 4.0, &["S", "IY"])];

        // (0,0) and (1,1) both have |Δt| = 3
        let anchor = find_anchor(&track1, &track2, &AlignmentConfig::default()).unwrap();
        assert_eq!((anchor.i, anchor.j), (0, 0));
    }

    #[test]
    fn rounding_noise_does_not_move_the_anchor() {
        let offset = 12.345;
        let track1: Vec<Entry> = (0..8)
            .map(|k| entry(k, 0.7 * k as f64, &[["AA", "B", "K", "D", "EH", "F", "G", "HH"][k]]))
            .collect();
        let track2: Vec<Entry> = track1.iter().map(|e| e.shifted(offset)).collect();

        let anchor = find_anchor(&track1, &track2, &AlignmentConfig::default()).unwrap();
        assert_eq!((anchor.i, anchor.j), (0, 0));
    }

    #[test]
    fn below_threshold_returns_none() {
        let track1 = vec![entry(0, 0.0, &["AA", "B", "K"])];
        let track2 = vec![entry(0, 1.0, &["IY", "Z", "K"])];

        assert!(find_anchor(&track1, &track2, &AlignmentConfig::default()).is_none());
    }

    #[test]
    fn threshold_is_inclusive() {
        // One substitution out of four tokens = 0.75
        let track1 = vec![entry(0, 0.0, &["AA", "B", "K", "D"])];
        let track2 = vec![entry(0, 1.0, &["AA", "B", "K", "T"])];

        let at = AlignmentConfig {
            phonetic_similarity_threshold: 0.75,
            ..Default::default()
        };
        assert!(find_anchor(&track1, &track2, &at).is_some());

        let above = AlignmentConfig {
            phonetic_similarity_threshold: 0.75 + 1e-9,
            ..Default::default()
        };
        assert!(find_anchor(&track1, &track2, &above).is_none());
    }
}

//! Greedy path walk from the anchor.
//!
//! The walk is a small state machine: `Walking { i, j, consecutive_gaps }`
//! until it reaches `Done(termination)`. At each step it probes the local
//! neighborhood of the cursor, scores every in-range candidate directly,
//! falls back to smear detection where the direct score fails, and takes
//! the best eligible candidate by net score (score minus gap penalty).
//!
//! Every iteration moves the cursor forward on at least one track, so the
//! walk finishes in at most `len1 + len2` iterations.

use tracing::{debug, trace};

use super::similarity::entry_similarity;
use super::smear::detect_smear;
use super::types::{AlignmentConfig, Anchor, SearchNeighborhood, SmearMatch, WalkOutcome, WalkTermination};
use crate::models::{CorrespondencePair, Entry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    Walking {
        i: usize,
        j: usize,
        consecutive_gaps: usize,
    },
    Done(WalkTermination),
}

/// A relative move from the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepOffset {
    di: usize,
    dj: usize,
}

impl StepOffset {
    /// Entries skipped beyond the minimal advance on each axis.
    fn skipped(&self) -> usize {
        self.di.saturating_sub(1).saturating_add(self.dj.saturating_sub(1))
    }

    fn holds(&self) -> bool {
        self.di == 0 || self.dj == 0
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    offset: StepOffset,
    net: f64,
    smear: Option<SmearMatch>,
}

enum StepResult {
    Accepted(Candidate),
    NoMatch,
    Exhausted,
}

/// Candidate moves in preference order.
///
/// `{0} ∪ steps` on each axis minus `(0, 0)`, ordered by skipped entries,
/// then advancing both tracks before holding one, then `di`, then `dj`.
fn candidate_offsets(neighborhood: &SearchNeighborhood) -> Vec<StepOffset> {
    let with_hold = |steps: &[usize]| {
        let mut all: Vec<usize> = std::iter::once(0).chain(steps.iter().copied()).collect();
        all.sort_unstable();
        all.dedup();
        all
    };

    let i_moves = with_hold(&neighborhood.i_steps);
    let j_moves = with_hold(&neighborhood.j_steps);

    let mut offsets: Vec<StepOffset> = i_moves
        .iter()
        .flat_map(|&di| j_moves.iter().map(move |&dj| StepOffset { di, dj }))
        .filter(|o| o.di != 0 || o.dj != 0)
        .collect();

    offsets.sort_by_key(|o| (o.skipped(), o.holds(), o.di, o.dj));
    offsets
}

/// Walk forward from the anchor and collect the correspondence path.
pub fn follow_path(
    track1: &[Entry],
    track2: &[Entry],
    anchor: &Anchor,
    config: &AlignmentConfig,
) -> WalkOutcome {
    let offsets = candidate_offsets(&config.local_search_neighborhood);

    let mut path = vec![anchor.pair()];
    let mut gap_steps = 0;
    let mut missed_steps = 0;
    let mut smear_groups = 0;

    let mut state = WalkState::Walking {
        i: anchor.i,
        j: anchor.j,
        consecutive_gaps: 0,
    };

    loop {
        let (i, j, consecutive_gaps) = match state {
            WalkState::Walking {
                i,
                j,
                consecutive_gaps,
            } => (i, j, consecutive_gaps),
            WalkState::Done(termination) => {
                debug!(
                    path_length = path.len(),
                    gap_steps,
                    missed_steps,
                    smear_groups,
                    %termination,
                    "Path walk finished"
                );
                return WalkOutcome {
                    path,
                    termination,
                    gap_steps,
                    missed_steps,
                    smear_groups,
                };
            }
        };

        state = match next_step(track1, track2, i, j, &offsets, config) {
            StepResult::Accepted(candidate) => {
                let StepOffset { di, dj } = candidate.offset;
                let (ni, nj) = (i + di, j + dj);

                let (last_i, last_j) = match &candidate.smear {
                    Some(smear) => {
                        smear_groups += 1;
                        let pairs = smear.pairs();
                        let last = pairs
                            .last()
                            .map(|p| (p.i, p.j))
                            .unwrap_or((ni, nj));
                        path.extend(pairs);
                        last
                    }
                    None => {
                        path.push(CorrespondencePair::new(ni, nj));
                        (ni, nj)
                    }
                };

                let consecutive_gaps = if candidate.offset.skipped() > 0 {
                    gap_steps += 1;
                    consecutive_gaps + 1
                } else {
                    0
                };

                trace!(i = last_i, j = last_j, net = candidate.net, "step accepted");
                WalkState::Walking {
                    i: last_i,
                    j: last_j,
                    consecutive_gaps,
                }
            }
            StepResult::NoMatch => {
                missed_steps += 1;
                let consecutive_gaps = consecutive_gaps + 1;

                if consecutive_gaps > config.max_consecutive_gaps {
                    WalkState::Done(WalkTermination::GapLimit)
                } else if i + 1 >= track1.len() || j + 1 >= track2.len() {
                    WalkState::Done(WalkTermination::Exhausted)
                } else {
                    trace!(i, j, consecutive_gaps, "no match, skipping ahead");
                    WalkState::Walking {
                        i: i + 1,
                        j: j + 1,
                        consecutive_gaps,
                    }
                }
            }
            StepResult::Exhausted => WalkState::Done(WalkTermination::Exhausted),
        };
    }
}

/// Evaluate every candidate move from `(i, j)` and pick the best eligible one.
fn next_step(
    track1: &[Entry],
    track2: &[Entry],
    i: usize,
    j: usize,
    offsets: &[StepOffset],
    config: &AlignmentConfig,
) -> StepResult {
    let mut any_in_range = false;
    let mut best: Option<Candidate> = None;

    for &offset in offsets {
        let (Some(ni), Some(nj)) = (i.checked_add(offset.di), j.checked_add(offset.dj)) else {
            continue;
        };
        let (Some(e1), Some(e2)) = (track1.get(ni), track2.get(nj)) else {
            continue;
        };
        any_in_range = true;

        let penalty = config.gap_penalty * offset.skipped() as f64;
        let direct = entry_similarity(e1, e2, config.speaker_mismatch_penalty);
        let net = direct - penalty;

        let candidate = if net >= config.phonetic_similarity_threshold {
            Some(Candidate {
                offset,
                net,
                smear: None,
            })
        } else {
            detect_smear(track1, track2, ni, nj, config).and_then(|smear| {
                let net = smear.combined_score - penalty;
                (net >= config.smear_similarity_threshold).then_some(Candidate {
                    offset,
                    net,
                    smear: Some(smear),
                })
            })
        };

        trace!(
            di = offset.di,
            dj = offset.dj,
            direct,
            eligible = candidate.is_some(),
            "path candidate"
        );

        if let Some(candidate) = candidate {
            if best.as_ref().map_or(true, |b| candidate.net > b.net) {
                best = Some(candidate);
            }
        }
    }

    match best {
        Some(candidate) => StepResult::Accepted(candidate),
        None if any_in_range => StepResult::NoMatch,
        None => StepResult::Exhausted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Phonemes unique to word `k`, sharing nothing with other words.
    fn word(k: usize) -> Vec<String> {
        (0..4).map(|n| format!("W{}_{}", k, n)).collect()
    }

    fn junk(k: usize) -> Vec<String> {
        (0..4).map(|n| format!("J{}_{}", k, n)).collect()
    }

    fn track(words: &[Vec<String>], offset: f64) -> Vec<Entry> {
        words
            .iter()
            .enumerate()
            .map(|(idx, p)| {
                let start = idx as f64 * 3.0 + offset;
                Entry::new(idx, start, Some(start + 2.0), p.clone())
            })
            .collect()
    }

    fn anchor_at(i: usize, j: usize) -> Anchor {
        Anchor { i, j, score: 1.0 }
    }

    fn pairs(path: &[CorrespondencePair]) -> Vec<(usize, usize)> {
        path.iter().map(|p| (p.i, p.j)).collect()
    }

    #[test]
    fn offsets_prefer_diagonal_then_holds_then_skips() {
        let offsets = candidate_offsets(&SearchNeighborhood::default());
        let as_tuples: Vec<(usize, usize)> = offsets.iter().map(|o| (o.di, o.dj)).collect();

        assert_eq!(as_tuples[0], (1, 1));
        assert_eq!(&as_tuples[1..3], &[(0, 1), (1, 0)]);
        assert!(!as_tuples.contains(&(0, 0)));
        assert_eq!(as_tuples.len(), 8);
        assert_eq!(*as_tuples.last().unwrap(), (2, 2));
    }

    #[test]
    fn identical_tracks_walk_the_diagonal() {
        let words: Vec<_> = (0..8).map(word).collect();
        let t1 = track(&words, 0.0);
        let t2 = track(&words, 4.0);

        let outcome = follow_path(&t1, &t2, &anchor_at(0, 0), &AlignmentConfig::default());

        assert_eq!(outcome.path.len(), 8);
        assert!(outcome.path.iter().all(|p| p.i == p.j));
        assert_eq!(outcome.termination, WalkTermination::Exhausted);
        assert_eq!(outcome.gap_steps, 0);
        assert_eq!(outcome.missed_steps, 0);
    }

    #[test]
    fn walk_starts_at_anchor() {
        let words: Vec<_> = (0..6).map(word).collect();
        let t1 = track(&words, 0.0);
        let t2 = track(&words, 0.0);

        let outcome = follow_path(&t1, &t2, &anchor_at(3, 3), &AlignmentConfig::default());
        assert_eq!(pairs(&outcome.path), vec![(3, 3), (4, 4), (5, 5)]);
    }

    #[test]
    fn skips_inserted_entry_with_gap() {
        let words1: Vec<_> = (0..8).map(word).collect();
        let mut words2: Vec<_> = (0..8).map(word).collect();
        words2.insert(3, junk(0));
        let t1 = track(&words1, 0.0);
        let t2 = track(&words2, 10.0);

        let outcome = follow_path(&t1, &t2, &anchor_at(0, 0), &AlignmentConfig::default());

        assert_eq!(
            pairs(&outcome.path),
            vec![(0, 0), (1, 1), (2, 2), (3, 4), (4, 5), (5, 6), (6, 7), (7, 8)]
        );
        assert_eq!(outcome.gap_steps, 1);
        assert_eq!(outcome.termination, WalkTermination::Exhausted);
    }

    #[test]
    fn follows_split_entries_as_smear_group() {
        let mut words1: Vec<_> = (0..6).map(word).collect();
        words1[2] = vec!["A".into(), "B".into(), "C".into(), "D".into()];
        let mut words2: Vec<_> = words1.clone();
        words2.splice(
            2..3,
            [vec!["A".to_string(), "B".to_string()], vec!["C".to_string(), "D".to_string()]],
        );
        let t1 = track(&words1, 0.0);
        let t2 = track(&words2, 1.0);

        let outcome = follow_path(&t1, &t2, &anchor_at(0, 0), &AlignmentConfig::default());

        assert_eq!(
            pairs(&outcome.path),
            vec![(0, 0), (1, 1), (2, 2), (2, 3), (3, 4), (4, 5), (5, 6)]
        );
        assert_eq!(outcome.smear_groups, 1);
    }

    #[test]
    fn stops_after_too_many_consecutive_misses() {
        let words1: Vec<_> = (0..10).map(word).collect();
        let words2: Vec<_> = (0..5).map(word).chain((0..5).map(junk)).collect();
        let t1 = track(&words1, 0.0);
        let t2 = track(&words2, 0.0);

        let outcome = follow_path(&t1, &t2, &anchor_at(0, 0), &AlignmentConfig::default());

        assert_eq!(outcome.path.len(), 5);
        assert_eq!(outcome.termination, WalkTermination::GapLimit);
        assert_eq!(outcome.missed_steps, 3);
    }

    #[test]
    fn recovers_after_a_single_miss() {
        let words1: Vec<_> = (0..8).map(word).collect();
        let mut words2: Vec<_> = (0..8).map(word).collect();
        // Entry 3 garbled on track 2, everything else intact
        words2[3] = junk(3);
        let t1 = track(&words1, 0.0);
        let t2 = track(&words2, 0.0);

        let outcome = follow_path(&t1, &t2, &anchor_at(0, 0), &AlignmentConfig::default());

        // (3,3) cannot match; (2,2) -> (4,4) skips one entry per side
        assert_eq!(
            pairs(&outcome.path),
            vec![(0, 0), (1, 1), (2, 2), (4, 4), (5, 5), (6, 6), (7, 7)]
        );
        assert_eq!(outcome.gap_steps, 1);
        assert_eq!(outcome.missed_steps, 0);
    }

    #[test]
    fn huge_steps_do_not_overflow() {
        let words: Vec<_> = (0..6).map(word).collect();
        let t1 = track(&words, 0.0);
        let t2 = track(&words, 1.0);
        let config = AlignmentConfig {
            local_search_neighborhood: SearchNeighborhood {
                i_steps: vec![1, usize::MAX],
                j_steps: vec![1, usize::MAX],
            },
            ..Default::default()
        };

        let outcome = follow_path(&t1, &t2, &anchor_at(2, 2), &config);
        assert_eq!(pairs(&outcome.path), vec![(2, 2), (3, 3), (4, 4), (5, 5)]);
        assert_eq!(outcome.termination, WalkTermination::Exhausted);
    }

    #[test]
    fn path_is_monotonic() {
        let words1: Vec<_> = (0..12).map(word).collect();
        let mut words2: Vec<_> = (0..12).map(word).collect();
        words2[4] = junk(4);
        words2.insert(7, junk(7));
        let t1 = track(&words1, 0.0);
        let t2 = track(&words2, 2.0);

        let outcome = follow_path(&t1, &t2, &anchor_at(0, 0), &AlignmentConfig::default());

        for window in outcome.path.windows(2) {
            let (a, b) = (window[0], window[1]);
            assert!(b.i >= a.i && b.j >= a.j);
            assert!(b.i > a.i || b.j > a.j);
        }
    }
}

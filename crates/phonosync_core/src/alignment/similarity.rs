//! Phonetic similarity between phoneme sequences.
//!
//! Pure functions - no I/O, no side effects.

use crate::models::Entry;

/// Order-sensitive similarity of two phoneme sequences in `[0, 1]`.
///
/// Defined as `1 - levenshtein / max(len1, len2, 1)` over whole phoneme
/// tokens. Two empty sequences score 1.0, exactly one empty scores 0.0.
pub fn sequence_similarity<A, B>(phonemes1: &[A], phonemes2: &[B]) -> f64
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let a: Vec<&str> = phonemes1.iter().map(AsRef::as_ref).collect();
    let b: Vec<&str> = phonemes2.iter().map(AsRef::as_ref).collect();

    let longest = a.len().max(b.len()).max(1);
    let distance = strsim::generic_levenshtein(&a, &b);

    1.0 - distance as f64 / longest as f64
}

/// Similarity with the speaker mismatch penalty applied.
///
/// The penalty applies only when both speakers are known and differ; a
/// missing speaker on either side leaves the score untouched. The result
/// is clamped to `[0, 1]`.
pub fn phonetic_similarity<A, B>(
    phonemes1: &[A],
    phonemes2: &[B],
    speaker1: Option<&str>,
    speaker2: Option<&str>,
    speaker_mismatch_penalty: f64,
) -> f64
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let base = sequence_similarity(phonemes1, phonemes2);

    let penalized = match (speaker1, speaker2) {
        (Some(s1), Some(s2)) if s1 != s2 => base - speaker_mismatch_penalty,
        _ => base,
    };

    penalized.clamp(0.0, 1.0)
}

/// Similarity of two entries, using their phonemes and speakers.
pub fn entry_similarity(e1: &Entry, e2: &Entry, speaker_mismatch_penalty: f64) -> f64 {
    phonetic_similarity(
        &e1.phonemes,
        &e2.phonemes,
        e1.speaker.as_deref(),
        e2.speaker.as_deref(),
        speaker_mismatch_penalty,
    )
}

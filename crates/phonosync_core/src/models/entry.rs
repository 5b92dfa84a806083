//! Caption entry and track types.
//!
//! All timing values are `f64` seconds. Entries arrive already normalized;
//! nothing here re-validates or re-sorts them.

use serde::{Deserialize, Serialize};

/// Opaque entry identifier, unique within its track.
///
/// Normalizers emit either integers or strings, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryId::Number(n) => write!(f, "{}", n),
            EntryId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for EntryId {
    fn from(value: i64) -> Self {
        EntryId::Number(value)
    }
}

impl From<i32> for EntryId {
    fn from(value: i32) -> Self {
        EntryId::Number(i64::from(value))
    }
}

impl From<usize> for EntryId {
    fn from(value: usize) -> Self {
        EntryId::Number(value as i64)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        EntryId::Text(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        EntryId::Text(value)
    }
}

/// A single normalized caption entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Stable identifier within the track.
    pub id: EntryId,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds, if the source provided one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    /// Cleaned display text (diagnostics only, never matched on).
    #[serde(default)]
    pub text: String,
    /// Ordered phoneme tokens.
    #[serde(default)]
    pub phonemes: Vec<String>,
    /// Speaker identifier. `None` means unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl Entry {
    /// Create an entry with the given timing and phonemes.
    pub fn new<P, S>(id: impl Into<EntryId>, start: f64, end: Option<f64>, phonemes: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            start,
            end,
            text: String::new(),
            phonemes: phonemes.into_iter().map(Into::into).collect(),
            speaker: None,
        }
    }

    /// Set the display text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the speaker.
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// Duration in seconds, when the end time is known.
    pub fn duration(&self) -> Option<f64> {
        self.end.map(|end| end - self.start)
    }

    /// Copy of this entry moved by `offset_seconds`.
    ///
    /// Times are not clamped, so shifting by `x` and then `-x` restores the
    /// original values.
    pub fn shifted(&self, offset_seconds: f64) -> Self {
        Self {
            start: self.start + offset_seconds,
            end: self.end.map(|end| end + offset_seconds),
            ..self.clone()
        }
    }
}

/// An ordered caption track (ascending `start`, caller's responsibility).
pub type Track = Vec<Entry>;

/// Shift every entry of a track by the same signed offset.
///
/// Returns a new track; only `start` and `end` change.
pub fn apply_offset(track: &[Entry], offset_seconds: f64) -> Track {
    track.iter().map(|e| e.shifted(offset_seconds)).collect()
}

//! phonosync core - phonetic alignment of caption tracks
//!
//! Aligns two independently produced caption tracks for the same audio by
//! matching entries on phoneme content, then derives a single global time
//! offset between them. No I/O happens on the alignment path; callers load
//! and save tracks themselves.

pub mod alignment;
pub mod config;
pub mod logging;
pub mod models;

pub use alignment::{align, AlignmentConfig, PhoneticWalk};
pub use models::{apply_offset, AlignmentResult, Entry, Track};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}

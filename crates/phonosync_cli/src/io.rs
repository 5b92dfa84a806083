//! Track and result files.
//!
//! Tracks are JSON arrays of normalized entries, exactly as the upstream
//! normalizer writes them.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use phonosync_core::models::Track;
use serde::Serialize;
use tracing::{debug, warn};

/// Read a track file.
pub fn load_track(path: &Path) -> Result<Track> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read track {}", path.display()))?;
    let track: Track = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse track {}", path.display()))?;

    if track.windows(2).any(|w| w[1].start < w[0].start) {
        warn!("Track {} is not sorted by start time", path.display());
    }
    debug!("Loaded {} entries from {}", track.len(), path.display());

    Ok(track)
}

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    debug!("Wrote {}", path.display());
    Ok(())
}

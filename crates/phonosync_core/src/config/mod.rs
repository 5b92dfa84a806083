//! Configuration management for phonosync.
//!
//! This module provides:
//! - TOML-based configuration with `[alignment]` and `[logging]` sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load
//!
//! # Example
//!
//! ```no_run
//! use phonosync_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/phonosync.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Gap penalty: {}", config.settings().alignment.gap_penalty);
//!
//! config.settings_mut().alignment.max_consecutive_gaps = 3;
//! config.update_section(ConfigSection::Alignment).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{ConfigSection, LoggingSettings, Settings};

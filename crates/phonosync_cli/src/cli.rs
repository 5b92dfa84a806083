//! Command-line interface for phonosync.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use phonosync_core::logging::LogLevel;

/// Config file used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = ".config/phonosync.toml";

/// Align two caption tracks by phonetic content
#[derive(Parser, Debug)]
#[command(name = "phonosync", version, about = "Align two caption tracks by phonetic content")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH", env = "PHONOSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (overrides the config file; RUST_LOG wins over both)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Level requested on the command line, if any.
    pub fn requested_level(&self) -> Option<LogLevel> {
        match self.verbose {
            0 => self.log_level,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }

    /// Config file path, explicit or default.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the offset that maps TRACK1 onto TRACK2
    Align {
        /// Reference track (JSON array of normalized entries)
        track1: PathBuf,

        /// Track to align against the reference
        track2: PathBuf,

        /// Include the correspondence path in the result
        #[arg(long)]
        include_path: bool,

        /// Write the result JSON here instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write TRACK1 shifted by the computed offset here
        #[arg(long, value_name = "FILE")]
        shifted: Option<PathBuf>,

        /// Print alignment diagnostics to stderr
        #[arg(long)]
        diagnostics: bool,
    },

    /// Shift every entry of a track by a fixed offset
    Shift {
        /// Track to shift
        track: PathBuf,

        /// Offset in seconds (may be negative)
        #[arg(long, allow_negative_numbers = true)]
        offset: f64,

        /// Where to write the shifted track
        #[arg(long, short, value_name = "FILE")]
        output: PathBuf,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Create the config file with defaults (existing values are kept)
    Init,
    /// Print the effective configuration
    Show,
}

//! phonosync - align two caption tracks by phonetic content.

mod cli;
mod io;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use phonosync_core::alignment::PhoneticWalk;
use phonosync_core::config::ConfigManager;
use phonosync_core::logging::{init_tracing, init_tracing_with_file};
use phonosync_core::models::apply_offset;

use cli::{Cli, Commands, ConfigAction};

/// Exit status when alignment ran but produced a failure result.
const EXIT_ALIGNMENT_FAILED: u8 = 2;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli.config_path();

    let mut manager = match cli.command {
        // Init creates the file, so it must not require one
        Commands::Config {
            action: ConfigAction::Init,
        } => ConfigManager::new(&config_path),
        _ => load_config(&config_path, cli.config.is_some())?,
    };
    let settings = manager.settings().clone();

    let level = cli.requested_level().unwrap_or(settings.logging.level);
    let _log_guard = if settings.logging.log_to_file {
        Some(
            init_tracing_with_file(level, manager.logs_folder())
                .context("Failed to set up file logging")?,
        )
    } else {
        init_tracing(level);
        None
    };

    tracing::debug!("phonosync core {}", phonosync_core::version());

    match cli.command {
        Commands::Align {
            track1,
            track2,
            include_path,
            output,
            shifted,
            diagnostics,
        } => {
            let track1_entries = io::load_track(&track1)?;
            let track2_entries = io::load_track(&track2)?;

            let aligner = PhoneticWalk::new(settings.alignment);
            let outcome = aligner.align_with_diagnostics(&track1_entries, &track2_entries);

            if diagnostics {
                eprintln!("{}", serde_json::to_string_pretty(&outcome.diagnostics)?);
            }

            let result = if include_path {
                outcome.result
            } else {
                outcome.result.without_path()
            };

            match &output {
                Some(path) => io::write_json(path, &result)?,
                None => println!("{}", serde_json::to_string_pretty(&result)?),
            }

            match (result.offset_seconds(), shifted) {
                (Some(offset), Some(path)) => {
                    io::write_json(&path, &apply_offset(&track1_entries, offset))?;
                    tracing::info!("Shifted track written to {}", path.display());
                }
                (None, Some(path)) => {
                    tracing::warn!("Alignment failed, not writing {}", path.display());
                }
                _ => {}
            }

            if !result.is_success() {
                return Ok(ExitCode::from(EXIT_ALIGNMENT_FAILED));
            }
        }

        Commands::Shift {
            track,
            offset,
            output,
        } => {
            let entries = io::load_track(&track)?;
            io::write_json(&output, &apply_offset(&entries, offset))?;
            tracing::info!(
                "Shifted {} entries by {:+.3}s into {}",
                entries.len(),
                offset,
                output.display()
            );
        }

        Commands::Config { action } => match action {
            ConfigAction::Init => {
                manager
                    .load_or_create()
                    .with_context(|| format!("Failed to initialize {}", config_path.display()))?;
                println!("{}", manager.path().display());
            }
            ConfigAction::Show => {
                print!("{}", toml::to_string_pretty(&settings)?);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

/// Config from the file, or defaults when the default path is absent.
///
/// An explicitly given path must exist.
fn load_config(path: &Path, explicit: bool) -> Result<ConfigManager> {
    let mut manager = ConfigManager::new(path);
    if !explicit && !path.exists() {
        return Ok(manager);
    }

    manager
        .load()
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    Ok(manager)
}

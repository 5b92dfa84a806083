//! Config manager for loading, saving, and atomic updates.
//!
//! Key features:
//! - Atomic writes (write to temp file, then rename)
//! - Section-level updates (only modified section is changed)
//! - Validation on load (alignment values must be in range)
//! - Preserves comments and formatting with toml_edit

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item};
use tracing::{debug, info};

use super::settings::{ConfigSection, Settings};
use crate::alignment::InvalidConfig;

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error(transparent)]
    InvalidValue(#[from] InvalidConfig),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Manages the phonosync settings file.
///
/// Handles loading, saving, and atomic section-level updates.
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
    /// Current settings loaded in memory.
    settings: Settings,
}

impl ConfigManager {
    /// Create a new config manager with the given config file path.
    ///
    /// Does not load the config - call `load()` or `load_or_create()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get a reference to the current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a mutable reference to the current settings.
    ///
    /// Changes stay in memory until `save()` or `update_section()` is called.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Get the logs folder path.
    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.logging.log_dir)
    }

    /// Load config from file.
    ///
    /// Returns error if the file doesn't exist or holds out-of-range values.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = parse_and_validate(&content)?;
        debug!("Loaded config from {}", self.config_path.display());
        Ok(())
    }

    /// Load config from file, creating with defaults if it doesn't exist.
    ///
    /// Unknown sections are dropped and missing keys filled in; the file is
    /// rewritten when that changes anything.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            let (settings, was_modified) = parse_validate_and_clean(&content)?;
            self.settings = settings;

            if was_modified {
                info!("Rewriting config {} with defaults filled in", self.config_path.display());
                self.save()?;
            }
        } else {
            if let Some(parent) = self.config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            info!("Creating default config at {}", self.config_path.display());
            self.settings = Settings::default();
            self.save()?;
        }
        Ok(())
    }

    /// Save the entire config atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.generate_config_with_comments()?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Update a specific section atomically.
    ///
    /// Re-reads the file from disk, replaces only the given section, and
    /// writes back atomically. Comments and other sections are preserved.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        if section == ConfigSection::Alignment {
            self.settings.alignment.validate()?;
        }

        let current_content = if self.config_path.exists() {
            fs::read_to_string(&self.config_path)?
        } else {
            String::new()
        };

        let mut doc: DocumentMut = if current_content.is_empty() {
            DocumentMut::new()
        } else {
            current_content.parse()?
        };

        let section_toml = match section {
            ConfigSection::Alignment => toml::to_string_pretty(&self.settings.alignment)?,
            ConfigSection::Logging => toml::to_string_pretty(&self.settings.logging)?,
        };

        let section_doc: DocumentMut = section_toml.parse()?;
        let mut section_table = section_doc.as_table().clone();

        // Keep the comment that sat above the old section
        let table_name = section.table_name();
        if let Some(old) = doc.get(table_name).and_then(Item::as_table) {
            *section_table.decor_mut() = old.decor().clone();
        }
        section_table.set_implicit(false);
        doc[table_name] = Item::Table(section_table);

        self.atomic_write(&doc.to_string())?;
        debug!("Updated [{}] in {}", table_name, self.config_path.display());

        Ok(())
    }

    /// Generate config content with a comment above each section.
    fn generate_config_with_comments(&self) -> ConfigResult<String> {
        let content = toml::to_string_pretty(&self.settings)?;
        let mut doc: DocumentMut = content.parse()?;

        for (idx, section) in ConfigSection::ALL.iter().enumerate() {
            let Some(table) = doc.get_mut(section.table_name()).and_then(Item::as_table_mut) else {
                continue;
            };
            let mut prefix = String::new();
            if idx == 0 {
                prefix.push_str("# phonosync configuration\n");
                prefix.push_str(
                    "# This file is auto-generated. Comments may be preserved on section updates.\n\n",
                );
            } else {
                prefix.push('\n');
            }
            prefix.push_str(&format!("# {}\n", section.description()));
            table.decor_mut().set_prefix(prefix);
        }

        Ok(doc.to_string())
    }

    /// Write content to config file atomically.
    ///
    /// Writes to a temp file first, then renames.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Temp file in the same directory so the rename stays on one filesystem
        let temp_path = self.config_path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

/// Parse config content and check alignment values.
fn parse_and_validate(content: &str) -> ConfigResult<Settings> {
    let settings: Settings = toml::from_str(content)?;
    settings.alignment.validate()?;
    Ok(settings)
}

/// Parse and validate, reporting whether the file needs rewriting.
fn parse_validate_and_clean(content: &str) -> ConfigResult<(Settings, bool)> {
    let doc: DocumentMut = content.parse()?;
    let settings = parse_and_validate(content)?;

    let has_unknown = doc
        .iter()
        .any(|(key, _)| !ConfigSection::ALL.iter().any(|s| s.table_name() == key));

    // Re-serializing differently means defaults were filled in
    let reserialized = toml::to_string_pretty(&settings)?;
    let normalized: DocumentMut = reserialized.parse()?;
    let was_modified = has_unknown || !same_values(&doc, &normalized);

    Ok((settings, was_modified))
}

/// Compare two documents by value, ignoring comments and layout.
fn same_values(a: &DocumentMut, b: &DocumentMut) -> bool {
    match (
        toml::from_str::<toml::Table>(&a.to_string()),
        toml::from_str::<toml::Table>(&b.to_string()),
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

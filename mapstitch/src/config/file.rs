//! Configuration file handling for ~/.mapstitch/config.ini.
//!
//! Settings structs live in [`super::settings`], parsing in [`super::parser`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::ConfigFile;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    /// Load configuration from the default path (~/.mapstitch/config.ini).
    ///
    /// Returns defaults if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(content: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(content)
            .map_err(|e| ConfigFileError::ReadError(ini::Error::Parse(e)))?;
        super::parser::parse_ini(&ini)
    }
}

/// Get the config directory path (~/.mapstitch).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mapstitch")
}

/// Get the config file path (~/.mapstitch/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

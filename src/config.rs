//!
//! Configuration for placeholder labels and truncation.
//! Settings are read from `.mdfold.toml`, either an explicit path or the
//! first one found walking up from the working directory.
//!

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Configuration file names, in order of precedence
pub const CONFIG_FILES: &[&str] = &[".mdfold.toml", "mdfold.toml"];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Placeholder truncation settings
    pub placeholder: PlaceholderConfig,
    /// Display names prefixed to placeholders
    pub labels: LabelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PlaceholderConfig {
    /// Longest node text shown before it is shortened
    pub max_length: usize,
    /// Characters kept from the end of shortened text
    pub suffix_length: usize,
    /// Marker inserted where text was cut
    pub ellipsis: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            max_length: 30,
            suffix_length: 5,
            ellipsis: "...".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LabelConfig {
    pub h1: String,
    pub h2: String,
    pub h3: String,
    pub h4: String,
    pub h5: String,
    pub h6: String,
    pub ordered_list: String,
    pub unordered_list: String,
    pub block_quote: String,
    pub table: String,
    pub code_fence: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            h1: "Header 1".to_string(),
            h2: "Header 2".to_string(),
            h3: "Header 3".to_string(),
            h4: "Header 4".to_string(),
            h5: "Header 5".to_string(),
            h6: "Header 6".to_string(),
            ordered_list: "Ordered list".to_string(),
            unordered_list: "Unordered list".to_string(),
            block_quote: "Block quote".to_string(),
            table: "Table".to_string(),
            code_fence: "Code fence".to_string(),
        }
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the TOML content
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Values that parse but cannot be used
    #[error("Invalid config value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

impl Config {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            source,
            path: path.display().to_string(),
        })?;
        log::debug!("[mdfold-config] Loading config file: {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Load the explicit `config_path` if given, otherwise the nearest discovered
    /// config file, otherwise the defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::from_file(path);
        }
        let start_dir = match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                log::debug!("[mdfold-config] Failed to get current directory: {e}");
                return Ok(Self::default());
            }
        };
        match discover_config_upward(&start_dir) {
            Some(path) => Self::from_file(&path),
            None => {
                log::debug!("[mdfold-config] No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let placeholder = &self.placeholder;
        let reserved = placeholder.suffix_length + placeholder.ellipsis.chars().count();
        if placeholder.max_length <= reserved {
            return Err(ConfigError::InvalidValue {
                key: "placeholder.max-length",
                message: format!(
                    "{} must exceed suffix-length plus the ellipsis length ({reserved})",
                    placeholder.max_length
                ),
            });
        }
        Ok(())
    }
}

/// Find the first config file walking up from `start_dir`, stopping at a
/// directory that contains `.git`.
pub fn discover_config_upward(start_dir: &Path) -> Option<PathBuf> {
    const MAX_DEPTH: usize = 100;

    let mut current_dir = start_dir.to_path_buf();
    for _ in 0..MAX_DEPTH {
        log::debug!("[mdfold-config] Searching for config in: {}", current_dir.display());

        for config_name in CONFIG_FILES {
            let config_path = current_dir.join(config_name);
            if config_path.is_file() {
                log::debug!("[mdfold-config] Found config file: {}", config_path.display());
                return Some(config_path);
            }
        }

        if current_dir.join(".git").exists() {
            log::debug!("[mdfold-config] Stopping at .git directory");
            return None;
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                log::debug!("[mdfold-config] Reached filesystem root");
                return None;
            }
        }
    }

    log::debug!("[mdfold-config] Maximum traversal depth reached");
    None
}

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::ParserConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl ParserConfig {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/argbind/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("argbind").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// A missing file yields `ParserConfig::default()`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(ParserConfig::default());
        }

        Self::load_from(&path)
    }

    /// Loads and validates configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: ParserConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - Every list extension is non-empty and starts with `.`
    /// - The null sentinel, when set, is non-empty
    /// - The arguments-file name is non-empty and carries no dash prefix
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ext) = self
            .list_extensions
            .iter()
            .find(|ext| ext.len() < 2 || !ext.starts_with('.'))
        {
            return Err(ConfigError::ValidationError {
                message: format!("List extension '{}' must start with '.' and name a suffix", ext),
            });
        }

        if self.null_sentinel.as_deref() == Some("") {
            return Err(ConfigError::ValidationError {
                message: "Null sentinel must not be empty".to_string(),
            });
        }

        if self.arguments_file.is_empty() || self.arguments_file.starts_with('-') {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Arguments file name '{}' must be a bare argument name",
                    self.arguments_file
                ),
            });
        }

        Ok(())
    }
}

//! Configuration for the studybot client.
//!
//! Everything has a default, so a missing file and an empty JSON object both
//! yield a working configuration against `http://localhost:5000`.

use crate::transport::{ReplyMode, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maximum compose box height, in rows.
pub const DEFAULT_MAX_INPUT_HEIGHT: u16 = 200;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the chat service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// How strictly chat replies are decoded.
    #[serde(default)]
    pub reply_mode: ReplyMode,

    /// Upper bound for the compose box height.
    #[serde(default = "default_max_input_height")]
    pub max_input_height: u16,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_max_input_height() -> u16 {
    DEFAULT_MAX_INPUT_HEIGHT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            reply_mode: ReplyMode::default(),
            max_input_height: default_max_input_height(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.max_input_height == 0 {
            return Err(ConfigError::Invalid(
                "max_input_height must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.reply_mode, ReplyMode::Strict);
        assert_eq!(config.max_input_height, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("studybot.json");

        let config = Config {
            base_url: "https://chat.example.edu".into(),
            reply_mode: ReplyMode::Lenient,
            max_input_height: 8,
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_reply_mode_wire_names() {
        let config: Config = serde_json::from_str(r#"{"reply_mode":"lenient"}"#).unwrap();
        assert_eq!(config.reply_mode, ReplyMode::Lenient);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("studybot.json");
        std::fs::write(&path, r#"{"base_url":"localhost:5000"}"#).unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}

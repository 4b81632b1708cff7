//! Configuration management for mivzak
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::detection::{DetectionConfig, Roster, RuleSet, TieBreak};
use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// File locations
    pub paths: PathsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Detection tunables
    pub detection: DetectionConfig,
}

/// File locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Politician roster JSON
    pub roster: PathBuf,

    /// Rule set TOML; built-in rules when unset
    pub rules: Option<PathBuf>,

    /// Portrait directory
    pub images_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            roster: PathBuf::from("data/politicians/politicians.json"),
            rules: None,
            images_dir: PathBuf::from("data/politicians/images"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("MIVZAK_ROSTER_PATH") {
            config.paths.roster = path.into();
        }
        if let Ok(path) = std::env::var("MIVZAK_RULES_PATH") {
            config.paths.rules = Some(path.into());
        }
        if let Ok(path) = std::env::var("MIVZAK_IMAGES_DIR") {
            config.paths.images_dir = path.into();
        }

        let detection = &mut config.detection;
        if let Some(v) = env_parse("MIVZAK_CONTEXT_RADIUS") {
            detection.context_radius = v;
        }
        if let Some(v) = env_parse("MIVZAK_POSITION_WINDOW") {
            detection.position_window = v;
        }
        if let Some(v) = env_parse("MIVZAK_MIN_ALIAS_LENGTH") {
            detection.min_alias_length = v;
        }
        if let Some(v) = env_parse("MIVZAK_CONFIDENCE_THRESHOLD") {
            detection.confidence_threshold = v;
        }
        if let Some(v) = env_parse("MIVZAK_REQUIRE_POSITION_CORROBORATION") {
            detection.require_position_corroboration = v;
        }
        if let Ok(v) = std::env::var("MIVZAK_TIE_BREAK") {
            detection.tie_break = v
                .parse::<TieBreak>()
                .map_err(|e| Error::config(format!("Invalid MIVZAK_TIE_BREAK: {e}")))?;
        }

        if let Ok(level) = std::env::var("MIVZAK_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("MIVZAK_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::with_source(format!("Failed to read config file: {}", path.display()), e)
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.detection.validate()?;

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config(format!("Unknown log level: {}", self.logging.level)));
        }

        if !LOG_FORMATS.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(Error::config(format!("Unknown log format: {}", self.logging.format)));
        }

        Ok(())
    }

    /// Rule set from `paths.rules`, or the built-in tables
    pub fn load_rules(&self) -> Result<RuleSet> {
        match &self.paths.rules {
            Some(path) => Ok(RuleSet::from_path(path)?),
            None => Ok(RuleSet::builtin()),
        }
    }

    /// Roster from `paths.roster`, empty when unavailable
    pub fn load_roster(&self) -> Roster {
        Roster::load_or_empty(&self.paths.roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DetectionError, ErrorCategory, MivzakErrorTrait};

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_detection_config() {
        let mut config = Config::default();
        config.detection.context_radius = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("context_radius"));
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = Config::from_toml_str("[detection\ncontext_radius = 1").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_missing_rules_file() {
        let mut config = Config::default();
        config.paths.rules = Some(PathBuf::from("/nonexistent/rules.toml"));
        let err = config.load_rules().unwrap_err();
        assert!(matches!(err, Error::Detection(DetectionError::IoError { .. })));
        assert_eq!(err.category(), ErrorCategory::Storage);
    }

    #[test]
    fn test_builtin_rules_when_unset() {
        let config = Config::default();
        assert_eq!(config.load_rules().unwrap().version, "v1");
    }
}

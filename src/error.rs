//! Unified error handling for the mivzak crate
//!
//! This module provides a unified error type that consolidates the
//! detection-domain errors and the I/O and serialization errors of the
//! surrounding tooling into a single `Error` enum.
//!
//! # Architecture
//!
//! - [`MivzakErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use mivzak::error::{Error, MivzakErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         eprintln!("Continuing without it: {}", err.hebrew_desc());
//!     } else {
//!         eprintln!("Fatal error: {}", err);
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::detection::error::DetectionError;

/// Common trait for all mivzak error types
pub trait MivzakErrorTrait: std::error::Error {
    /// Check if the run can continue with degraded input
    fn is_recoverable(&self) -> bool;

    /// Hebrew description for user-facing messages
    fn hebrew_desc(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Politician roster loading errors
    Roster,
    /// Rule table errors
    Rules,
    /// Configuration and validation errors
    Config,
    /// File system errors
    Storage,
    /// Input document parsing errors
    Parsing,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Hebrew description for the category
    pub fn hebrew_desc(&self) -> &'static str {
        match self {
            Self::Roster => "שגיאת רשימת פוליטיקאים",
            Self::Rules => "שגיאת טבלת כללים",
            Self::Config => "שגיאת הגדרות",
            Self::Storage => "שגיאת אחסון",
            Self::Parsing => "שגיאת פענוח",
            Self::Other => "שגיאה אחרת",
        }
    }
}

impl MivzakErrorTrait for DetectionError {
    fn is_recoverable(&self) -> bool {
        DetectionError::is_recoverable(self)
    }

    fn hebrew_desc(&self) -> String {
        DetectionError::hebrew_desc(self)
    }

    fn category(&self) -> ErrorCategory {
        match self {
            DetectionError::RosterParseFailed { .. } => ErrorCategory::Roster,
            DetectionError::RulesParseFailed { .. } => ErrorCategory::Rules,
            DetectionError::InvalidConfig { .. } => ErrorCategory::Config,
            DetectionError::IoError { .. } => ErrorCategory::Storage,
            DetectionError::Other { .. } => ErrorCategory::Other,
        }
    }
}

/// Unified error type for the mivzak crate
#[derive(Error, Debug)]
pub enum Error {
    /// Roster, rule table and detection config errors
    #[error("Detection error: {0}")]
    Detection(#[from] DetectionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MivzakErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Detection(e) => e.is_recoverable(),
            Self::Io(_) => true,
            // A single malformed document does not stop a batch
            Self::Json(_) => true,
            Self::Toml(_) => false,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn hebrew_desc(&self) -> String {
        match self {
            Self::Detection(e) => e.hebrew_desc(),
            Self::Io(e) => format!("שגיאת קלט/פלט: {e}"),
            Self::Json(e) => format!("שגיאת JSON: {e}"),
            Self::Toml(e) => format!("שגיאת TOML: {e}"),
            Self::Config(msg) => format!("שגיאת הגדרות: {msg}"),
            Self::Other { context, .. } => context.clone(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Detection(e) => e.category(),
            Self::Io(_) => ErrorCategory::Storage,
            Self::Json(_) => ErrorCategory::Parsing,
            Self::Toml(_) | Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let roster_err = Error::Detection(DetectionError::roster_parse_failed("bad"));
        assert_eq!(roster_err.category(), ErrorCategory::Roster);

        let rules_err: Error = DetectionError::rules_parse_failed("bad").into();
        assert_eq!(rules_err.category(), ErrorCategory::Rules);
    }

    #[test]
    fn test_is_recoverable() {
        let roster_err: Error = DetectionError::roster_parse_failed("bad").into();
        assert!(roster_err.is_recoverable());

        let config_err: Error = DetectionError::invalid_config("x", "0", "bad").into();
        assert!(!config_err.is_recoverable());
    }

    #[test]
    fn test_hebrew_desc() {
        let err: Error = DetectionError::rules_parse_failed("bad").into();
        assert_eq!(err.hebrew_desc(), "כשל בפענוח טבלת הכללים");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let unified: Error = json_err.into();
        assert!(matches!(unified, Error::Json(_)));
        assert_eq!(unified.category(), ErrorCategory::Parsing);
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("missing roster path");
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("Something went wrong");
        assert_eq!(err.category(), ErrorCategory::Other);
    }

    #[test]
    fn test_error_category_hebrew() {
        assert_eq!(ErrorCategory::Roster.hebrew_desc(), "שגיאת רשימת פוליטיקאים");
        assert_eq!(ErrorCategory::Storage.hebrew_desc(), "שגיאת אחסון");
    }
}

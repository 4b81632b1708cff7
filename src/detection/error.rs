//! Error types for roster and rule loading
//!
//! The matching pipeline itself is infallible; these errors only come from
//! the loaders that feed it (roster files, rule tables, configuration).

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for roster, rule and config loading
pub type LoadResult<T> = Result<T, DetectionError>;

/// Errors raised while preparing a detection run
#[derive(Debug)]
pub enum DetectionError {
    // =========================================================================
    // Roster Errors
    // =========================================================================
    /// Roster document is not valid JSON or not an array of records
    RosterParseFailed { reason: String },

    // =========================================================================
    // Rule Table Errors
    // =========================================================================
    /// Rule set TOML could not be parsed or serialized
    RulesParseFailed { reason: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// File I/O error
    IoError {
        operation: String,
        path: Option<PathBuf>,
        source: io::Error,
    },

    /// Generic error with context
    Other { context: String },
}

impl fmt::Display for DetectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionError::RosterParseFailed { reason } => {
                write!(f, "Failed to parse roster: {reason}")
            }
            DetectionError::RulesParseFailed { reason } => {
                write!(f, "Failed to parse rule set: {reason}")
            }
            DetectionError::InvalidConfig {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid config '{field}' = '{value}': {reason}")
            }
            DetectionError::IoError {
                operation,
                path,
                source,
            } => {
                if let Some(p) = path {
                    write!(f, "I/O error during {operation} on {p:?}: {source}")
                } else {
                    write!(f, "I/O error during {operation}: {source}")
                }
            }
            DetectionError::Other { context } => write!(f, "{context}"),
        }
    }
}

impl std::error::Error for DetectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DetectionError::IoError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for DetectionError {
    fn from(err: io::Error) -> Self {
        DetectionError::IoError {
            operation: "unknown".to_string(),
            path: None,
            source: err,
        }
    }
}

impl From<serde_json::Error> for DetectionError {
    fn from(err: serde_json::Error) -> Self {
        DetectionError::RosterParseFailed {
            reason: err.to_string(),
        }
    }
}

impl DetectionError {
    /// Create a roster parse error
    pub fn roster_parse_failed(reason: impl Into<String>) -> Self {
        DetectionError::RosterParseFailed {
            reason: reason.into(),
        }
    }

    /// Create a rule table parse error
    pub fn rules_parse_failed(reason: impl Into<String>) -> Self {
        DetectionError::RulesParseFailed {
            reason: reason.into(),
        }
    }

    /// Create a config validation error
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DetectionError::InvalidConfig {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io_error(operation: impl Into<String>, path: Option<PathBuf>, source: io::Error) -> Self {
        DetectionError::IoError {
            operation: operation.into(),
            path,
            source,
        }
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        DetectionError::Other {
            context: context.into(),
        }
    }

    /// Whether the caller can carry on with degraded input
    ///
    /// A missing or unreadable roster still allows a run (with no detections);
    /// broken rules or config do not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DetectionError::RosterParseFailed { .. } | DetectionError::IoError { .. }
        )
    }

    /// Hebrew description of error
    pub fn hebrew_desc(&self) -> String {
        match self {
            DetectionError::RosterParseFailed { .. } => "כשל בפענוח רשימת הפוליטיקאים".to_string(),
            DetectionError::RulesParseFailed { .. } => "כשל בפענוח טבלת הכללים".to_string(),
            DetectionError::InvalidConfig { .. } => "הגדרה שגויה".to_string(),
            DetectionError::IoError { .. } => "שגיאת קלט/פלט".to_string(),
            DetectionError::Other { .. } => "שגיאה אחרת".to_string(),
        }
    }
}

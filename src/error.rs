//! Custom error types for fieldlog
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for fieldlog operations
#[derive(Error, Debug)]
pub enum FieldLogError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for drafts and CLI input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Hosted backend (Supabase) errors
    #[error("Backend error: {0}")]
    Backend(String),
}

impl FieldLogError {
    /// Create a "not found" error for drafts
    pub fn draft_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Draft",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for repeatable-list entries
    pub fn entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Entry",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for FieldLogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FieldLogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<reqwest::Error> for FieldLogError {
    fn from(err: reqwest::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Result type alias for fieldlog operations
pub type FieldLogResult<T> = Result<T, FieldLogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FieldLogError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = FieldLogError::entry_not_found("soft_spots/abc");
        assert_eq!(err.to_string(), "Entry not found: soft_spots/abc");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FieldLogError = io_err.into();
        assert!(matches!(err, FieldLogError::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: FieldLogError = json_err.into();
        assert!(matches!(err, FieldLogError::Json(_)));
    }
}

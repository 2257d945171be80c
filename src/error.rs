//! Custom error types for budgetwise
//!
//! This module defines the error hierarchy for the library using thiserror
//! for ergonomic error definitions. Every error here is recoverable at the
//! call-site; nothing in the library panics on bad input.

use thiserror::Error;

/// The main error type for budgetwise operations
#[derive(Error, Debug)]
pub enum BudgetError {
    /// Bad input to add/update (negative amount, empty name, unknown type)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// The entity existed in this session but has already been removed
    #[error("{entity_type} already removed: {identifier}")]
    Removed {
        entity_type: &'static str,
        identifier: String,
    },

    /// Non-finite amount passed to the currency formatter
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Transport or collaborator failure (retryable)
    #[error("Sync error: {0}")]
    Sync(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),
}

impl BudgetError {
    /// Create a "not found" error for budget entries
    pub fn entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget entry",
            identifier: identifier.into(),
        }
    }

    /// Create an "already removed" error for budget entries
    pub fn entry_removed(identifier: impl Into<String>) -> Self {
        Self::Removed {
            entity_type: "Budget entry",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error (including already-removed)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Removed { .. })
    }

    /// Check if the target was removed earlier in this session
    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether retrying the operation later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Sync(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for BudgetError {
    fn from(err: csv::Error) -> Self {
        Self::Import(err.to_string())
    }
}

/// Result type alias for budgetwise operations
pub type BudgetResult<T> = Result<T, BudgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BudgetError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = BudgetError::entry_not_found("ent-1234abcd");
        assert_eq!(err.to_string(), "Budget entry not found: ent-1234abcd");
        assert!(err.is_not_found());
        assert!(!err.is_removed());
    }

    #[test]
    fn test_removed_is_a_not_found() {
        let err = BudgetError::entry_removed("ent-1234abcd");
        assert_eq!(err.to_string(), "Budget entry already removed: ent-1234abcd");
        assert!(err.is_not_found());
        assert!(err.is_removed());
    }

    #[test]
    fn test_only_sync_errors_are_retryable() {
        assert!(BudgetError::Sync("connection reset".into()).is_retryable());
        assert!(!BudgetError::Validation("empty name".into()).is_retryable());
        assert!(!BudgetError::entry_not_found("x").is_retryable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BudgetError = io_err.into();
        assert!(matches!(err, BudgetError::Io(_)));
    }
}

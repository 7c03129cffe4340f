//! Error types for the Cardloop application.
//!
//! These cover infrastructure failures (files, encoding, configuration).
//! Session transitions report their own outcome through
//! [`SessionError`](crate::session::SessionError) instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for storage and configuration failures.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum CardloopError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File lock could not be acquired
    #[error("Lock error: {0}")]
    Lock(String),
}

impl CardloopError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Serialization error for the given format
    pub fn serialization(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Lock error
    pub fn lock(message: impl Into<String>) -> Self {
        Self::Lock(message.into())
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CardloopError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CardloopError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CardloopError>`.
pub type Result<T> = std::result::Result<T, CardloopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_conversion_keeps_kind() {
        let err: CardloopError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, CardloopError::Io { .. }));
        assert!(err.to_string().contains("PermissionDenied"));
    }

    #[test]
    fn test_json_conversion() {
        let parse = serde_json::from_str::<u32>("not-a-number").unwrap_err();
        let err: CardloopError = parse.into();
        assert!(matches!(err, CardloopError::Serialization { .. }));
        assert!(err.to_string().starts_with("Serialization error: JSON"));
    }

    #[test]
    fn test_lock_helper_message() {
        let err = CardloopError::lock("held by another process");
        assert_eq!(err.to_string(), "Lock error: held by another process");
    }
}

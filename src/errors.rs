// Copyright 2025 Cowboy AI, LLC.

//! Error types for domain operations

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// Backing file unreadable or unwritable
    #[error("storage error at {path}: {message}")]
    Storage {
        /// Path of the backing file
        path: String,
        /// Underlying I/O failure, rendered as text
        message: String,
    },

    /// Update, delete, or reset targeting a key that does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Registration with a colliding username or email
    #[error("already exists: {0}")]
    DuplicateUser(String),

    /// Malformed input caught before any store mutation
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid state transition
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current state
        from: String,
        /// Attempted target state
        to: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl DomainError {
    /// Build a storage error from an I/O failure at the given path
    pub fn storage(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        DomainError::Storage {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    /// Build a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }

    /// Check if this is a storage error
    pub fn is_storage(&self) -> bool {
        matches!(self, DomainError::Storage { .. })
    }
}

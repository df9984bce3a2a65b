//! Error types for DAK FSH operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sgex operations
#[derive(Debug, Error)]
pub enum SgexError {
    /// Contract violation by the caller (unknown requirement kind, rejected value)
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Repository file or directory does not exist
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// Write was based on a stale file version
    #[error("Conflict on '{path}': expected sha {expected}, found {actual}")]
    Conflict {
        path: String,
        expected: String,
        actual: String,
    },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON/TOML/YAML (de)serialization failures
    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Conflict,
    Config,
    Io,
    Serialization,
}

impl SgexError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SgexError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            SgexError::NotFound { .. } => ErrorKind::NotFound,
            SgexError::Conflict { .. } => ErrorKind::Conflict,
            SgexError::ConfigError { .. } => ErrorKind::Config,
            SgexError::IoError { .. } => ErrorKind::Io,
            SgexError::SerializationError { .. } => ErrorKind::Serialization,
        }
    }

    /// Check if this error is recoverable (can continue processing other files)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::Io | ErrorKind::Serialization
        )
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SgexError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization_error(err.to_string())
    }
}

//! Core error types for ergowellness-core.
//!
//! The store boundary swallows its own failures (see [`crate::storage::Store`]),
//! so these types mostly surface from backend construction, configuration
//! files and user-supplied values.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ergowellness-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage backend errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a [`crate::storage::KvBackend`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database or file
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Backend did not answer within the store's operation timeout
    #[error("Store operation '{op}' timed out after {ms}ms")]
    TimedOut { op: &'static str, ms: u64 },

    /// Backend mutex was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    Poisoned,

    /// Stored document could not be encoded or decoded
    #[error("Failed to encode value for '{key}': {message}")]
    Encoding { key: String, message: String },

    /// File backend IO failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Value outside the accepted range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        value: i64,
    },

    /// Unknown field name
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The platform notification service rejected the request
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),

    /// The blocking delivery task panicked or was cancelled
    #[error("Notification task aborted: {0}")]
    TaskAborted(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for NotifyError {
    fn from(err: tokio::task::JoinError) -> Self {
        NotifyError::TaskAborted(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

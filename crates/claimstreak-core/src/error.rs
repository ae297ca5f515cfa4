//! Core error types for claimstreak-core.
//!
//! Storage faults are absorbed by the two-tier store and only show up here
//! for callers that talk to a single backend directly. Backup and
//! configuration faults are surfaced as typed errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for claimstreak-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a single key-value backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend cannot be used at all (missing directory, poisoned lock, ...)
    #[error("{backend} store unavailable: {message}")]
    Unavailable {
        backend: &'static str,
        message: String,
    },

    /// SQLite query or connection failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Filesystem failure in a file-backed store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn unavailable(backend: &'static str, message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            backend,
            message: message.into(),
        }
    }
}

/// Reasons a backup code is rejected.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("backup code is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("backup code does not contain UTF-8 text")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("backup payload is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("backup payload is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("backup payload has an empty user key")]
    EmptyUserKey,

    #[error("unsupported backup format version '{0}'")]
    UnsupportedVersion(String),

    #[error("backup record is inconsistent: {0}")]
    InvalidRecord(String),

    #[error("backup record failed its integrity check")]
    IntegrityMismatch,
}

/// Errors surfaced by the backup/restore workflow.
#[derive(Error, Debug)]
pub enum BackupError {
    /// Export requested but nothing is stored for the user
    #[error("no streak data found for {user}")]
    NoData { user: String },

    /// The payload could not be serialized for export
    #[error("failed to encode backup: {0}")]
    Encode(#[from] serde_json::Error),

    /// Import given a malformed or corrupted code
    #[error("invalid backup code: {0}")]
    Decode(#[from] DecodeError),

    /// The restored record could not be written to either tier
    #[error("failed to persist restored record: {0}")]
    Store(#[from] StoreError),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

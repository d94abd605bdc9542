//! Error types for runconf-core

use std::path::PathBuf;

/// Result type for runconf-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, reading or mutating settings
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A name outside the schema was read or written
    #[error("Unknown setting: {key}")]
    UnknownKey { key: String },

    /// A mutation was attempted after the store was frozen
    #[error("Settings object is frozen")]
    Frozen,

    /// Settings file not found at the given path
    #[error("Settings file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Settings file too large: {path} is {size} bytes (max {max})")]
    ConfigTooLarge { path: PathBuf, size: u64, max: u64 },

    /// Settings file could not be parsed
    #[error("Failed to parse {format} settings at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// Settings file parsed, but its top level is not a table of settings
    #[error("Invalid settings file at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Unsupported settings file format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn unknown_key(key: impl Into<String>) -> Self {
        Self::UnknownKey { key: key.into() }
    }

    /// Whether this error is a contract violation on the store itself
    /// (as opposed to a problem reading a settings file).
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::UnknownKey { .. } | Self::Frozen)
    }
}

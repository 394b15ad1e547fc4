//! Error types for the settings and history store.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::SettingsError;

/// Store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Home directory not found.
    #[error("Failed to get home directory")]
    HomeDirectoryNotFound,

    /// Failed to create the data directory.
    #[error("Failed to create directory {path:?}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read a stored file.
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write a stored file.
    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stored file is not valid JSON for its schema.
    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize data for storage.
    #[error("Failed to serialize: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Stored settings are outside the accepted ranges.
    #[error("Stored settings are invalid: {0}")]
    InvalidSettings(#[source] SettingsError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Structured error types for dropdesk-core.
///
/// Uses `thiserror` so library consumers get composable errors. The CLI
/// wraps these in `anyhow` for context.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dropdesk-core operations
#[derive(Error, Debug)]
pub enum DeskError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// JSON parsing or serialization failed
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// Durable key-value storage could not be read or written
    #[error("Storage error for key '{key}': {reason}")]
    Storage { key: String, reason: String },

    /// A save-as action failed
    #[error("Download of '{name}' failed: {reason}")]
    Download { name: String, reason: String },

    /// File or directory not found
    #[error("Path not found: {path:?}")]
    PathNotFound { path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for dropdesk-core operations
pub type Result<T> = std::result::Result<T, DeskError>;

impl DeskError {
    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create a storage error
    pub fn storage(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a download error
    pub fn download(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Download {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a path not found error
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

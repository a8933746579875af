//! Error types for annotation document and persistence operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, writing or converting annotation
/// documents.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid document structure or content
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },

    /// Output folder missing or not a directory
    #[error("Annotation folder not usable: {path:?}")]
    FolderUnavailable {
        /// Folder that was expected
        path: PathBuf,
    },
}

impl FormatError {
    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }
}

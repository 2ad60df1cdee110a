//! Error handling module for TrimDesk

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Top-level error for library callers and the CLI
#[derive(Error, Debug)]
pub enum TrimDeskError {
    /// Domain rule or port failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A preview or export run did not complete
    #[error("Transcode failed: {0}")]
    Transcode(String),

    /// Another run was already in flight
    #[error("A transcode is already running")]
    Busy,

    /// Timeline snapshot or event file error
    #[error("Timeline file {path}: {message}")]
    TimelineFile { path: String, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON encoding/decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for TrimDesk operations
pub type TrimDeskResult<T> = std::result::Result<T, TrimDeskError>;

// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),
    /// Save form rejected; carries the first field message verbatim
    #[error("{0}")]
    Validation(String),
    /// Clip lane reassignment violated the media type rule
    #[error("{0}")]
    TrackRejected(String),
    /// No clip with the given id in the registry
    #[error("Clip not found: {0}")]
    ClipNotFound(String),
    /// No source reference to operate on
    #[error("No source video found.")]
    MissingSource,
    /// Source bytes could not be fetched
    #[error("Failed to fetch source: {0}")]
    SourceFetch(String),
    /// Engine failed to load
    #[error("Failed to load FFmpeg: {0}")]
    EngineLoad(String),
    /// Staging a file into the engine filesystem failed
    #[error("Failed to write engine file: {0}")]
    EngineWrite(String),
    /// Command execution failed or returned a non-zero status
    #[error("FFmpeg execution failed: {0}")]
    EngineExec(String),
    /// Reading a file back from the engine filesystem failed
    #[error("Failed to read engine file: {0}")]
    EngineRead(String),
    /// Engine returned something other than a binary buffer
    #[error("FFmpeg readFile returned unexpected data type.")]
    UnexpectedOutput,
    /// Filmstrip extraction produced nothing
    #[error("No frames were extracted.")]
    NoFrames,
    /// Run abandoned before it settled
    #[error("Run was cancelled.")]
    Cancelled,
    /// Media metadata could not be read
    #[error("Failed to probe media: {0}")]
    Probe(String),
    /// Handing the result to the user failed
    #[error("Failed to deliver output: {0}")]
    Delivery(String),
    /// Persistence gateway failure
    #[error("Storage failure: {0}")]
    Storage(String),
    /// Human verification endpoint unreachable or malformed
    #[error("Verification failure: {0}")]
    Verification(String),
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

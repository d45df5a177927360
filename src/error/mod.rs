//! Error handling module for ClipMerge

use serde::Serialize;
use thiserror::Error;

/// Machine-readable classification of a failed merge job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    EngineUnavailable,
    ClipProcessing,
    Concatenation,
    CoverEmbed,
    Engine,
    Busy,
}

/// Main error type for merge jobs
#[derive(Error, Debug)]
pub enum MergeError {
    /// Bad input set or invalid clip settings, raised before any engine call
    #[error("{message}")]
    Validation { message: String },

    /// Engine failed to load or did not become ready in time
    #[error("Engine unavailable: {message}")]
    EngineUnavailable { message: String },

    /// A per-clip trim/fade pass failed (index is 1-based)
    #[error("Processing clip {index} failed: {message}")]
    ClipProcessing { index: usize, message: String },

    /// Concatenation failed, including the re-encode fallback when one applied
    #[error("Merging failed: {message}")]
    Concatenation { message: String },

    /// Muxing the cover image into the merged audio failed
    #[error("Embedding cover art failed: {message}")]
    CoverEmbed { message: String },

    /// Staging or reading files through the engine failed
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Another merge job is still running
    #[error("A merge is already in progress")]
    Busy,
}

impl MergeError {
    pub fn validation(message: impl Into<String>) -> Self {
        MergeError::Validation {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MergeError::Validation { .. } => ErrorKind::Validation,
            MergeError::EngineUnavailable { .. } => ErrorKind::EngineUnavailable,
            MergeError::ClipProcessing { .. } => ErrorKind::ClipProcessing,
            MergeError::Concatenation { .. } => ErrorKind::Concatenation,
            MergeError::CoverEmbed { .. } => ErrorKind::CoverEmbed,
            MergeError::Engine(_) => ErrorKind::Engine,
            MergeError::Busy => ErrorKind::Busy,
        }
    }
}

/// Errors reported by an engine implementation
#[derive(Error, Debug)]
pub enum EngineError {
    /// Engine could not be started or loaded
    #[error("failed to load engine: {message}")]
    Load { message: String },

    /// File missing from the engine filesystem
    #[error("file not found in engine filesystem: {name}")]
    FileNotFound { name: String },

    /// Name rejected by the engine filesystem
    #[error("invalid engine file name: {name}")]
    InvalidName { name: String },

    /// Operation exited with a non-zero status
    #[error("operation exited with code {code}")]
    ExitCode { code: i32 },

    /// Engine process could not be driven
    #[error("engine execution failed: {message}")]
    Exec { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for merge operations
pub type MergeResult<T> = std::result::Result<T, MergeError>;

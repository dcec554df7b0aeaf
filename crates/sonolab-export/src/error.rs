//! Error types for sonolab-export

use std::io;
use thiserror::Error;

/// Export error type
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unreadable or malformed WAV file
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// State dump serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data that cannot be written or used as loaded
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

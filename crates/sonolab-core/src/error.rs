//! Error types for sonolab-core.

use thiserror::Error;

/// Error type for sonolab-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Sample block has {actual} samples, expected {expected}")]
    BlockLength { expected: usize, actual: usize },

    #[error("Filter index {index} out of range (bank has {count} filters)")]
    FilterIndex { index: usize, count: usize },

    #[error("Invalid reference waveform: {0}")]
    InvalidReference(String),

    #[error("Transmit failed: {0}")]
    Transmit(String),

    #[cfg(feature = "capture")]
    #[error("No input device available")]
    NoInputDevice,

    #[cfg(feature = "capture")]
    #[error("Input device config unavailable")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),

    #[cfg(feature = "capture")]
    #[error("Failed to build input stream")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[cfg(feature = "capture")]
    #[error("Failed to start input stream")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[cfg(feature = "capture")]
    #[error("Failed to pause input stream")]
    PauseStream(#[from] cpal::PauseStreamError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;

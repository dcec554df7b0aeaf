//! Session plumbing for the sonolab streaming DSP core.
//!
//! # Primary API
//!
//! - [`SessionConfig`] / [`Application`]: session-constant parameters and presets
//! - [`LatestBlock`]: last-write-wins hand-off from capture to processing
//! - [`TransmitControl`]: play/pause state for the chirp transmitter
//!
//! # Feature-gated APIs
//!
//! - `"capture"`: [`CaptureStream`] feeding a [`LatestBlock`] from a CPAL input device

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{Application, DisplayGeometry, SessionConfig, AVERAGING_WINDOW_STEP};

mod exchange;
pub use exchange::LatestBlock;

pub(crate) mod lockfree;
pub use lockfree::{AtomicCounter, AtomicFlag};

pub mod transmit;
pub use transmit::{
    NullTransmit, TransitionResult, TransmitControl, TransmitEvent, TransmitSink, TransmitState,
};

#[cfg(feature = "capture")]
pub mod capture;

#[cfg(feature = "capture")]
pub use capture::{CaptureStream, Chunker};

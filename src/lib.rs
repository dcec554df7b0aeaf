//! # Sonolab - Real-time Spectrum, Matched-Filter and Sonar Analysis
//!
//! Streaming DSP core shared by four front-ends: a spectrum analyzer, a
//! matched-filter bank, a 1-D range sounder and a range-Doppler sounder.
//!
//! ## Architecture
//!
//! Sonolab is an umbrella crate that coordinates:
//! - **sonolab-core** - Session config and presets, latest-block exchange, transmit state machine, capture adapter
//! - **sonolab-analysis** - Sliding window, FFT, display modes, filter bank, range/Doppler processing, pipeline
//! - **sonolab-export** - Snapshot tables, JSON state dumps, reference WAV files
//!
//! A producer delivers raw `i16` half-blocks; only the latest one is kept.
//! Each tick runs one pass over it and publishes a [`Frame`] of plain data
//! (magnitude vectors, byte images, axis labels). Nothing here draws.
//!
//! ## Quick Start
//!
//! ```
//! use sonolab::prelude::*;
//!
//! let session = Session::builder()
//!     .application(Application::SpectrumAnalyzer)
//!     .build()?;
//!
//! session.configure(Control::SetMode(DisplayMode::Spectrum));
//! session.submit_samples(vec![0; 1024]);
//!
//! if let Some(frame) = session.compute_frame() {
//!     if let FrameView::Display(display) = &frame.view {
//!         assert_eq!(display.mode, DisplayMode::Spectrum);
//!     }
//! }
//! # Ok::<(), sonolab::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Core plus export
//! - `export` - Snapshot tables, state dumps, WAV reference loading
//! - `capture` - Live input from the default CPAL device

/// Re-export of sonolab-core for direct access
pub use sonolab_core as core;

// Session plumbing
pub use sonolab_core::{
    Application, DisplayGeometry, LatestBlock, NullTransmit, SessionConfig, TransitionResult,
    TransmitControl, TransmitEvent, TransmitSink, TransmitState,
};

// Analysis
pub use sonolab_analysis as analysis;

pub use sonolab_analysis::{
    AxisLabel, AxisUnit, Control, DisplayFrame, DisplayMode, DisplayView, FilterBankFrame,
    FilterReading, Frame, FrameView, GrayImage, LiveFrameState, Marker, MarkerReadout,
    PassOutcome, SonarFrame, SonarProjection, SonarView, TrackPoint,
};

// Export
#[cfg(feature = "export")]
pub use sonolab_export as export;

#[cfg(feature = "export")]
pub use sonolab_export::StateDump;

mod builder;
mod error;
mod session;

pub use builder::SessionBuilder;
pub use error::{Error, Result};
pub use session::{ReferenceLoad, Session};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Error, Result, Session, SessionBuilder};

    pub use crate::{Application, SessionConfig, TransmitSink, TransmitState};

    pub use crate::{
        Control, DisplayMode, DisplayView, Frame, FrameView, Marker, SonarProjection, SonarView,
    };

    pub use crate::ReferenceLoad;
}

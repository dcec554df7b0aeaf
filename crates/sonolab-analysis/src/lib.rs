//! # Sonolab Analysis
//!
//! Streaming spectral analysis over a sliding, 50%-overlapped sample window.
//!
//! This crate provides:
//! - **Display modes**: power spectrum, autocorrelation, spectrogram waterfall and XY feature track
//! - **Matched-filter bank**: N parallel correlators with SNR/SINR scoring and detection
//! - **Sonar**: pulse-aligned range profiles and range-Doppler images
//! - **Pipeline**: one pass per tick, controls queued from other threads
//! - **Live loop**: skip-if-busy ticks with lock-free frame publishing
//!
//! Every view is plain data (magnitude vectors, byte images, labels); nothing
//! here draws.
//!
//! ## Example
//!
//! ```rust
//! use sonolab_analysis::{Control, DisplayMode, FrameView, Pipeline};
//! use sonolab_core::{Application, SessionConfig};
//!
//! let config = SessionConfig::for_application(Application::SpectrumAnalyzer);
//! let mut pipeline = Pipeline::new(config).unwrap();
//!
//! pipeline.apply(Control::SetMode(DisplayMode::Spectrum)).unwrap();
//!
//! // Feed one half-block of raw samples
//! let chunk = vec![0i16; 1024];
//! let frame = pipeline.compute_frame(Some(&chunk)).unwrap();
//! assert!(matches!(frame.view, FrameView::Display(_)));
//! ```

pub mod accumulator;
pub mod axis;
pub mod conditioning;
pub mod display;
pub mod fft;
pub mod filter_bank;
pub mod history;
pub mod live;
pub mod pipeline;
pub mod reference;
pub mod result_log;
pub mod sonar;

pub use accumulator::SampleBlockAccumulator;
pub use axis::{AxisLabel, AxisUnit};
pub use conditioning::{disp_mag, sonar_scale, GrayImage, SonarScale};
pub use display::{
    DisplayFrame, DisplayMode, DisplayModeProcessor, DisplayView, Marker, MarkerReadout,
    TrackHistory, TrackPoint,
};
pub use fft::SpectralTransform;
pub use filter_bank::{
    detect, snr_score, FilterBankFrame, FilterBankSettings, FilterReading, MatchedFilterBank,
};
pub use history::PulseHistory;
pub use live::{run_pass, run_pipeline_loop, LiveFrameState, PassOutcome};
pub use pipeline::{Control, Frame, FrameView, Pipeline, Processor};
pub use reference::ReferenceSignalStore;
pub use result_log::ResultLog;
pub use sonar::{
    range_step, RangeDopplerProcessor, SonarFrame, SonarProjection, SonarSettings, SonarView,
};

pub use rustfft::num_complex::Complex64;

//! Session configuration.
//!
//! Block size, sample rate, filter count and averaging window are fixed for
//! the lifetime of a session and carried here rather than as ambient state.
//! [`Application`] presets reproduce the defaults of the four front-ends.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which front-end the core is feeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Application {
    /// Spectrum / autocorrelation / spectrogram / XY-track analyzer.
    #[default]
    SpectrumAnalyzer,
    /// Bank of matched filters with SNR scoring.
    MatchedFilterBank,
    /// 1-D sounder: averaged range profile.
    RangeSounder,
    /// Range-Doppler sounder: pulse waterfall with optional Doppler axis.
    RangeDopplerSounder,
}

/// Pixel extent of the surface the renderer draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayGeometry {
    pub width: usize,
    pub height: usize,
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self {
            width: 512,
            height: 380,
        }
    }
}

/// Configuration for one analysis session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub application: Application,
    /// Sliding window length L. Each delivery carries L/2 samples.
    pub block_size: usize,
    pub sample_rate: f64,
    /// Number of matched filters (reference slots).
    pub filter_count: usize,
    /// Pulses kept in the slow-time history (M).
    pub averaging_window: usize,
    pub display: DisplayGeometry,
    pub tick_interval_ms: u64,
    /// Gain applied when converting raw i16 samples.
    pub input_scale: f64,
    /// Maximum XY-track points kept before the oldest are dropped.
    pub track_capacity: usize,
}

/// Smallest allowed averaging window; also the resize increment.
pub const AVERAGING_WINDOW_STEP: usize = 10;

impl Default for SessionConfig {
    fn default() -> Self {
        Self::for_application(Application::SpectrumAnalyzer)
    }
}

impl SessionConfig {
    pub fn for_application(application: Application) -> Self {
        let base = Self {
            application,
            block_size: 2048,
            sample_rate: 44100.0,
            filter_count: 8,
            averaging_window: 100,
            display: DisplayGeometry::default(),
            tick_interval_ms: 50,
            input_scale: 1.0,
            track_capacity: 10_000,
        };

        match application {
            Application::SpectrumAnalyzer => Self {
                input_scale: 190.0 / 65536.0,
                ..base
            },
            Application::MatchedFilterBank => Self {
                block_size: 32768,
                ..base
            },
            Application::RangeSounder => Self {
                block_size: 3000,
                averaging_window: 10,
                ..base
            },
            Application::RangeDopplerSounder => Self {
                block_size: 3000,
                averaging_window: 100,
                ..base
            },
        }
    }

    /// Samples expected per delivery.
    pub fn chunk_size(&self) -> usize {
        self.block_size / 2
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size < 16 || self.block_size % 2 != 0 {
            return Err(Error::InvalidConfig(format!(
                "block_size {} must be even and at least 16",
                self.block_size
            )));
        }
        if self.sample_rate < 8000.0 || self.sample_rate > 384000.0 {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if self.filter_count == 0 {
            return Err(Error::InvalidConfig("filter_count must be nonzero".into()));
        }
        if self.averaging_window < AVERAGING_WINDOW_STEP {
            return Err(Error::InvalidConfig(format!(
                "averaging_window {} below minimum {}",
                self.averaging_window, AVERAGING_WINDOW_STEP
            )));
        }
        if self.display.width == 0 || self.display.height == 0 {
            return Err(Error::InvalidConfig("display has zero extent".into()));
        }
        if !self.input_scale.is_finite() || self.input_scale <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "input_scale {} must be positive",
                self.input_scale
            )));
        }
        Ok(())
    }
}

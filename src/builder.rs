//! Builder for configuring and constructing a `Session`.

use crate::{Result, Session};
use sonolab_core::{Application, DisplayGeometry, SessionConfig, TransmitSink};
use std::time::Duration;

/// Starts from the spectrum analyzer preset. Calling `.application()`
/// swaps in another preset and discards earlier overrides, so call it first.
///
/// Audio capture requires explicit opt-in via `.capture()` (feature
/// `capture`). A device that fails to open is logged and the session is
/// built anyway; blocks can still be submitted by hand.
///
/// # Example
///
/// ```
/// use sonolab::prelude::*;
///
/// let session = Session::builder()
///     .application(Application::MatchedFilterBank)
///     .block_size(4096)
///     .filter_count(4)
///     .build()?;
///
/// assert_eq!(session.config().chunk_size(), 2048);
/// # Ok::<(), sonolab::Error>(())
/// ```
pub struct SessionBuilder {
    config: SessionConfig,
    transmit: Option<Box<dyn TransmitSink>>,

    #[cfg(feature = "capture")]
    enable_capture: bool,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self {
            config: SessionConfig::default(),
            transmit: None,

            #[cfg(feature = "capture")]
            enable_capture: false,
        }
    }
}

impl SessionBuilder {
    /// Replace the whole configuration with the preset for `application`.
    pub fn application(mut self, application: Application) -> Self {
        self.config = SessionConfig::for_application(application);
        self
    }

    /// Use a fully specified configuration.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn block_size(mut self, samples: usize) -> Self {
        self.config.block_size = samples;
        self
    }

    pub fn sample_rate(mut self, hz: f64) -> Self {
        self.config.sample_rate = hz;
        self
    }

    pub fn filter_count(mut self, count: usize) -> Self {
        self.config.filter_count = count;
        self
    }

    /// Initial pulse-history depth for the sonar applications.
    pub fn averaging_window(mut self, pulses: usize) -> Self {
        self.config.averaging_window = pulses;
        self
    }

    /// Default: 512 x 380
    pub fn display(mut self, width: usize, height: usize) -> Self {
        self.config.display = DisplayGeometry { width, height };
        self
    }

    /// Default: 50 ms. Rounded down to whole milliseconds, minimum 1.
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval_ms = (interval.as_millis() as u64).max(1);
        self
    }

    pub fn input_scale(mut self, scale: f64) -> Self {
        self.config.input_scale = scale;
        self
    }

    /// Default: 10 000 points
    pub fn track_capacity(mut self, points: usize) -> Self {
        self.config.track_capacity = points;
        self
    }

    /// Playback collaborator for the transmit waveform. Without one the
    /// transmit state machine runs against a sink that does nothing.
    pub fn transmit_sink(mut self, sink: impl TransmitSink + 'static) -> Self {
        self.transmit = Some(Box::new(sink));
        self
    }

    /// Open the default input device once the session is built.
    #[cfg(feature = "capture")]
    pub fn capture(mut self) -> Self {
        self.enable_capture = true;
        self
    }

    pub fn build(self) -> Result<Session> {
        let session = Session::from_parts(self.config, self.transmit)?;

        #[cfg(feature = "capture")]
        if self.enable_capture && !session.start_capture() {
            tracing::info!("Session built without live input");
        }

        Ok(session)
    }
}

//! Session: the complete analysis core behind one front-end.

use crate::{Error, Result};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use sonolab_analysis::{
    run_pass, run_pipeline_loop, Control, Frame, LiveFrameState, PassOutcome, Pipeline,
};
use sonolab_core::{
    AtomicFlag, LatestBlock, NullTransmit, SessionConfig, TransitionResult, TransmitControl,
    TransmitEvent, TransmitSink, TransmitState,
};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

#[cfg(feature = "export")]
use std::path::{Path, PathBuf};

#[cfg(feature = "capture")]
use sonolab_core::CaptureStream;

/// Outcome of a reference load. Failures never propagate: the filter keeps
/// whatever it held before and the reason is reported here and in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceLoad {
    Loaded { samples: usize },
    Kept { reason: String },
}

impl ReferenceLoad {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ReferenceLoad::Loaded { .. })
    }
}

/// Streaming analysis session.
///
/// Samples arrive through [`submit_samples`](Self::submit_samples) (or the
/// shared [`input`](Self::input) slot), configuration through
/// [`configure`](Self::configure), and frames come out of
/// [`compute_frame`](Self::compute_frame) or the live loop. Only the latest
/// delivered block is ever processed; a tick that finds a pass already in
/// flight is skipped.
///
/// With the `capture` feature the session owns a platform input stream
/// and is no longer `Send`.
///
/// # Example
///
/// ```
/// use sonolab::prelude::*;
///
/// let session = Session::builder()
///     .application(Application::SpectrumAnalyzer)
///     .build()?;
///
/// session.configure(Control::SetMode(DisplayMode::Autocorrelation));
/// session.submit_samples(vec![0; session.config().chunk_size()]);
///
/// let frame = session.compute_frame().expect("one block was submitted");
/// assert_eq!(frame.sequence, 1);
/// # Ok::<(), sonolab::Error>(())
/// ```
pub struct Session {
    config: SessionConfig,

    /// All mutable analysis state; locked for the duration of one pass
    pipeline: Arc<Mutex<Pipeline>>,

    /// Last-write-wins hand-off from the producer
    input: Arc<LatestBlock>,

    controls: Sender<Control>,

    /// Published frames and tick counters, shared with the live thread
    frames: Arc<LiveFrameState>,

    live: Mutex<Option<JoinHandle<()>>>,

    transmit: Mutex<TransmitControl>,

    #[cfg(feature = "capture")]
    capture: Mutex<Option<CaptureStream>>,

    shut_down: AtomicFlag,
}

impl Session {
    /// Create a new session builder
    pub fn builder() -> crate::SessionBuilder {
        crate::SessionBuilder::default()
    }

    /// Build a session from a complete configuration.
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // =========================================================================
    // Input and control
    // =========================================================================

    /// Deliver the next L/2 raw samples. Replaces any block not yet
    /// processed.
    pub fn submit_samples(&self, block: Vec<i16>) {
        self.input.publish(block);
    }

    /// Shared input slot for producers running on their own thread.
    pub fn input(&self) -> Arc<LatestBlock> {
        self.input.clone()
    }

    /// Queue a configuration change for the start of the next pass.
    pub fn configure(&self, control: Control) {
        if let Err(e) = self.controls.send(control) {
            tracing::warn!("Control dropped: {}", e);
        }
    }

    /// Run closure with exclusive access to the pipeline. Blocks until any
    /// pass in flight has finished.
    pub fn with_pipeline<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Pipeline) -> R,
    {
        f(&mut self.pipeline.lock())
    }

    // =========================================================================
    // Processing
    // =========================================================================

    /// Run at most one pass now, without waiting for a pass in flight.
    pub fn tick(&self) -> PassOutcome {
        run_pass(&self.pipeline, &self.input, &self.frames)
    }

    /// Run one pass over the latest block and return its frame. `None` when
    /// no usable block arrived or another pass held the pipeline.
    pub fn compute_frame(&self) -> Option<Arc<Frame>> {
        match self.tick() {
            PassOutcome::Processed => self.frames.latest(),
            PassOutcome::NoInput | PassOutcome::Busy => None,
        }
    }

    /// Most recently published frame, from either manual or live ticks.
    pub fn latest_frame(&self) -> Option<Arc<Frame>> {
        self.frames.latest()
    }

    /// Tick counters and the published frame.
    pub fn frame_state(&self) -> &Arc<LiveFrameState> {
        &self.frames
    }

    /// Start ticking on a background thread at the configured interval.
    ///
    /// Does nothing if the loop is already running.
    pub fn start_live(&self) -> Result<()> {
        let mut guard = self.live.lock();
        if guard.is_some() {
            return Ok(());
        }

        self.frames.resume();
        let pipeline = self.pipeline.clone();
        let input = self.input.clone();
        let frames = self.frames.clone();
        let tick = Duration::from_millis(self.config.tick_interval_ms);

        let handle = std::thread::Builder::new()
            .name("sonolab-live".into())
            .spawn(move || run_pipeline_loop(pipeline, input, frames, tick))?;

        tracing::info!("Live analysis started ({:?} tick)", tick);
        *guard = Some(handle);
        Ok(())
    }

    /// Stop the background loop and wait for its last pass.
    pub fn stop_live(&self) {
        let handle = self.live.lock().take();
        if let Some(handle) = handle {
            self.frames.stop();
            if handle.join().is_err() {
                tracing::warn!("Live analysis thread panicked");
            }
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.lock().is_some()
    }

    // =========================================================================
    // References and snapshots
    // =========================================================================

    /// Replace filter `index` with a time-domain waveform. Applied
    /// immediately, after any controls already queued.
    pub fn load_reference_samples(&self, samples: &[f64], index: usize) -> ReferenceLoad {
        let control = Control::LoadReference {
            index,
            samples: samples.to_vec(),
        };
        let result = {
            let mut pipeline = self.pipeline.lock();
            pipeline.apply_pending();
            pipeline.apply(control)
        };
        match result {
            Ok(()) => {
                tracing::info!("Loaded {} samples into filter {}", samples.len(), index);
                ReferenceLoad::Loaded {
                    samples: samples.len(),
                }
            }
            Err(e) => {
                tracing::warn!("Filter {} unchanged: {}", index, e);
                ReferenceLoad::Kept {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Load filter `index` from a mono WAV file.
    #[cfg(feature = "export")]
    pub fn load_reference(&self, path: impl AsRef<Path>, index: usize) -> ReferenceLoad {
        let path = path.as_ref();
        match sonolab_export::read_reference_wav(path) {
            Ok(samples) => self.load_reference_samples(&samples, index),
            Err(e) => {
                tracing::warn!(
                    "Could not read reference {}, filter {} unchanged: {}",
                    path.display(),
                    index,
                    e
                );
                ReferenceLoad::Kept {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Copy the current sample window into filter `index` on the next pass.
    pub fn capture_reference(&self, index: usize) {
        self.configure(Control::CaptureReference(index));
    }

    /// Ask the next filter-bank pass to store its scores.
    pub fn store_snapshot(&self) {
        self.configure(Control::StoreSnapshot);
    }

    pub fn delete_last_snapshot(&self) {
        self.configure(Control::DeleteLastSnapshot);
    }

    /// Reset filter `index` to all zeros on the next pass.
    pub fn clear_reference(&self, index: usize) {
        self.configure(Control::ClearReference(index));
    }

    /// Stored snapshot rows, oldest first, after any queued deletes.
    pub fn snapshots(&self) -> Vec<Vec<f64>> {
        let mut pipeline = self.pipeline.lock();
        pipeline.apply_pending();
        pipeline.result_log().rows().to_vec()
    }

    /// Write every stored snapshot to `path` and clear the log. Queued
    /// controls are applied first; a store request still pending is dropped
    /// with the rows. The log is left untouched if the write fails. Returns
    /// the number of rows written.
    #[cfg(feature = "export")]
    pub fn export_snapshots(&self, path: impl AsRef<Path>) -> Result<usize> {
        let mut pipeline = self.pipeline.lock();
        pipeline.apply_pending();
        let log = pipeline.result_log_mut();
        sonolab_export::write_snapshot_table(path.as_ref(), log.rows())?;
        let written = log.len();
        log.clear();
        Ok(written)
    }

    /// Dump the sonar pulse history into `dir` as timestamped JSON.
    #[cfg(feature = "export")]
    pub fn dump_state(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dump = {
            let pipeline = self.pipeline.lock();
            let sonolab_analysis::Processor::Sonar(sonar) = pipeline.processor() else {
                return Err(Error::Unsupported("state dump", self.config.application));
            };
            sonolab_export::StateDump::new(
                sonar.history().rows().to_vec(),
                self.config.block_size,
                sonar.averaging_window(),
                self.config.sample_rate,
            )
        };
        Ok(sonolab_export::write_state_dump(dir.as_ref(), &dump)?)
    }

    // =========================================================================
    // Transmit
    // =========================================================================

    /// Start or stop the transmit waveform. A sink failure leaves the state
    /// unchanged and is logged as well as returned.
    pub fn set_transmit(&self, active: bool) -> Result<TransitionResult> {
        self.transmit_event(if active {
            TransmitEvent::Play
        } else {
            TransmitEvent::Pause
        })
    }

    /// Called by the playback collaborator when the looped waveform ends.
    pub fn on_transmit_end_of_stream(&self) -> Result<TransitionResult> {
        self.transmit_event(TransmitEvent::EndOfStream)
    }

    fn transmit_event(&self, event: TransmitEvent) -> Result<TransitionResult> {
        self.transmit.lock().transition(event).map_err(|e| {
            tracing::warn!("Transmit {:?} failed: {}", event, e);
            Error::from(e)
        })
    }

    /// Swap in a new playback collaborator. The current state is kept.
    pub fn attach_transmit_sink(&self, sink: impl TransmitSink + 'static) {
        self.transmit.lock().replace_sink(Box::new(sink));
    }

    pub fn transmit_state(&self) -> TransmitState {
        self.transmit.lock().state()
    }

    // =========================================================================
    // Capture
    // =========================================================================

    /// Open the default input device and feed it into the input slot.
    ///
    /// Returns `false` (after logging) if the device cannot be opened; the
    /// session keeps working on manually submitted blocks.
    #[cfg(feature = "capture")]
    pub fn start_capture(&self) -> bool {
        let mut guard = self.capture.lock();
        if guard.is_some() {
            return true;
        }
        match CaptureStream::start(
            self.config.chunk_size(),
            self.config.sample_rate as u32,
            self.input.clone(),
        ) {
            Ok(stream) => {
                *guard = Some(stream);
                true
            }
            Err(e) => {
                tracing::warn!("Audio capture unavailable, continuing without input: {}", e);
                false
            }
        }
    }

    #[cfg(feature = "capture")]
    pub fn stop_capture(&self) {
        if let Some(stream) = self.capture.lock().take() {
            if let Err(e) = stream.stop() {
                tracing::warn!("Failed to stop capture: {}", e);
            }
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Stop the live loop, release capture and silence the transmitter.
    ///
    /// Best effort: every failure is logged and the remaining steps still
    /// run. Safe to call more than once; also runs on drop.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true) {
            return;
        }

        self.stop_live();

        #[cfg(feature = "capture")]
        self.stop_capture();

        let mut transmit = self.transmit.lock();
        if let Err(e) = transmit.set_active(false) {
            tracing::warn!("Failed to pause transmit during shutdown: {}", e);
        }
        transmit.replace_sink(Box::new(NullTransmit));

        tracing::info!(
            "Session shut down after {} passes ({} ticks skipped)",
            self.frames.passes(),
            self.frames.skipped()
        );
    }

    pub(crate) fn from_parts(
        config: SessionConfig,
        transmit: Option<Box<dyn TransmitSink>>,
    ) -> Result<Self> {
        let pipeline = Pipeline::new(config.clone())?;
        let controls = pipeline.controller();

        Ok(Self {
            config,
            pipeline: Arc::new(Mutex::new(pipeline)),
            input: Arc::new(LatestBlock::new()),
            controls,
            frames: Arc::new(LiveFrameState::new()),
            live: Mutex::new(None),
            transmit: Mutex::new(
                transmit.map_or_else(TransmitControl::default, TransmitControl::new),
            ),
            #[cfg(feature = "capture")]
            capture: Mutex::new(None),
            shut_down: AtomicFlag::new(false),
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

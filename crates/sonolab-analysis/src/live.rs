//! Periodic pipeline ticks on a background thread.
//!
//! Each tick takes the latest delivered block and runs one pass. A tick
//! that finds the pipeline busy is skipped, never queued. Frames are
//! published via `ArcSwap` for lock-free reads from the UI thread.

use crate::pipeline::{Frame, Pipeline};
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use sonolab_core::{AtomicCounter, AtomicFlag, LatestBlock};
use std::sync::Arc;
use std::time::Duration;

/// Shared state between the tick thread and its readers.
pub struct LiveFrameState {
    frame: ArcSwapOption<Frame>,
    running: AtomicFlag,
    passes: AtomicCounter,
    skipped: AtomicCounter,
}

impl LiveFrameState {
    pub fn new() -> Self {
        Self {
            frame: ArcSwapOption::empty(),
            running: AtomicFlag::new(true),
            passes: AtomicCounter::new(),
            skipped: AtomicCounter::new(),
        }
    }

    /// Most recently published frame.
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.frame.load_full()
    }

    pub fn publish(&self, frame: Frame) {
        self.frame.store(Some(Arc::new(frame)));
    }

    /// Signal the tick thread to stop.
    pub fn stop(&self) {
        self.running.set(false);
    }

    /// Clear a previous stop so the loop can be started again.
    pub fn resume(&self) {
        self.running.set(true);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Passes that produced a frame.
    pub fn passes(&self) -> u64 {
        self.passes.get()
    }

    /// Ticks dropped because a pass was already in flight.
    pub fn skipped(&self) -> u64 {
        self.skipped.get()
    }
}

impl Default for LiveFrameState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// A frame was computed and published.
    Processed,
    /// No usable block arrived since the last pass.
    NoInput,
    /// Another pass held the pipeline; this tick was skipped.
    Busy,
}

/// Run at most one pass. Never waits for the pipeline lock.
pub fn run_pass(
    pipeline: &Mutex<Pipeline>,
    input: &LatestBlock,
    state: &LiveFrameState,
) -> PassOutcome {
    let Some(mut pipeline) = pipeline.try_lock() else {
        let skipped = state.skipped.increment();
        tracing::trace!("Pipeline busy, skipped tick ({} total)", skipped);
        return PassOutcome::Busy;
    };

    let block = input.take();
    match pipeline.compute_frame(block.as_deref().map(Vec::as_slice)) {
        Some(frame) => {
            state.publish(frame);
            state.passes.increment();
            PassOutcome::Processed
        }
        None => PassOutcome::NoInput,
    }
}

/// Tick until `state.stop()` is called.
pub fn run_pipeline_loop(
    pipeline: Arc<Mutex<Pipeline>>,
    input: Arc<LatestBlock>,
    state: Arc<LiveFrameState>,
    tick: Duration,
) {
    tracing::debug!("Live loop started ({:?} tick)", tick);
    while state.is_running() {
        run_pass(&pipeline, &input, &state);
        std::thread::sleep(tick);
    }
    tracing::debug!("Live loop stopped after {} passes", state.passes());
}

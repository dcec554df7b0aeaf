//! Single-slot hand-off between the capture callback and the processing tick.
//!
//! Last write wins: a block the consumer never took is replaced by the next
//! delivery and counted as dropped. Neither side ever blocks.

use crate::lockfree::AtomicCounter;
use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// Latest delivered sample block.
#[derive(Debug, Default)]
pub struct LatestBlock {
    slot: ArcSwapOption<Vec<i16>>,
    published: AtomicCounter,
    superseded: AtomicCounter,
}

impl LatestBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer side. Replaces any block still waiting in the slot.
    pub fn publish(&self, block: Vec<i16>) {
        self.published.increment();
        if self.slot.swap(Some(Arc::new(block))).is_some() {
            self.superseded.increment();
        }
    }

    /// Consumer side. Empties the slot.
    pub fn take(&self) -> Option<Arc<Vec<i16>>> {
        self.slot.swap(None)
    }

    pub fn is_pending(&self) -> bool {
        self.slot.load().is_some()
    }

    /// Blocks delivered since construction.
    pub fn published(&self) -> u64 {
        self.published.get()
    }

    /// Blocks overwritten before the consumer read them.
    pub fn superseded(&self) -> u64 {
        self.superseded.get()
    }
}

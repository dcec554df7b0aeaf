//! Sliding time-domain window with 50% overlap.
//!
//! Each update drops the oldest half of the window and appends a freshly
//! delivered half-length chunk, so every sample is analysed in exactly two
//! consecutive windows.

use sonolab_core::{Error, Result};

pub struct SampleBlockAccumulator {
    window: Vec<f64>,
    scale: f64,
    updates: u64,
}

impl SampleBlockAccumulator {
    /// `block_size` is the window length L; updates carry L/2 samples.
    /// Raw samples are multiplied by `scale` on the way in.
    pub fn new(block_size: usize, scale: f64) -> Self {
        Self {
            window: vec![0.0; block_size],
            scale,
            updates: 0,
        }
    }

    pub fn block_size(&self) -> usize {
        self.window.len()
    }

    pub fn chunk_size(&self) -> usize {
        self.window.len() / 2
    }

    pub fn window(&self) -> &[f64] {
        &self.window
    }

    /// Number of accepted updates.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Shift in a new chunk. A chunk of the wrong length is rejected and the
    /// previous window is kept.
    pub fn update(&mut self, chunk: &[i16]) -> Result<&[f64]> {
        let half = self.chunk_size();
        if chunk.len() != half {
            return Err(Error::BlockLength {
                expected: half,
                actual: chunk.len(),
            });
        }

        let len = self.window.len();
        self.window.copy_within(len - half.., 0);
        // Odd lengths never pass config validation, but keep the tail aligned.
        let tail = len - half;
        for (dst, &src) in self.window[tail..].iter_mut().zip(chunk) {
            *dst = src as f64 * self.scale;
        }

        self.updates += 1;
        Ok(&self.window)
    }
}

//! Slow-time buffer of recent pulse magnitudes.

use sonolab_core::{Error, Result};

/// `M` rows of one pulse each; row 0 is the newest. Resizing discards every
/// stored pulse.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseHistory {
    rows: Vec<Vec<f64>>,
    width: usize,
}

impl PulseHistory {
    pub fn new(pulses: usize, width: usize) -> Self {
        Self {
            rows: vec![vec![0.0; width]; pulses],
            width,
        }
    }

    /// Number of pulses held (`M`).
    pub fn pulses(&self) -> usize {
        self.rows.len()
    }

    /// Samples per pulse.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn latest(&self) -> Option<&[f64]> {
        self.rows.first().map(|r| r.as_slice())
    }

    /// Insert `pulse` as the newest row, dropping the oldest.
    pub fn push(&mut self, pulse: Vec<f64>) -> Result<()> {
        if pulse.len() != self.width {
            return Err(Error::BlockLength {
                expected: self.width,
                actual: pulse.len(),
            });
        }
        if self.rows.is_empty() {
            return Ok(());
        }
        self.rows.rotate_right(1);
        self.rows[0] = pulse;
        Ok(())
    }

    pub fn resize(&mut self, pulses: usize) {
        *self = Self::new(pulses, self.width);
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(0.0);
        }
    }

    /// Mean over pulses for every range bin.
    pub fn column_mean(&self) -> Vec<f64> {
        let mut mean = vec![0.0; self.width];
        if self.rows.is_empty() {
            return mean;
        }
        for row in &self.rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        let n = self.rows.len() as f64;
        for m in &mut mean {
            *m /= n;
        }
        mean
    }
}

//! Forward and inverse DFT of a fixed-length block.
//!
//! Rectangular window (no tapering). The inverse is normalised by `1/L`, so
//! `inverse(forward(x))` reproduces `x` up to rounding.

use rustfft::{num_complex::Complex64, Fft, FftPlanner};
use std::sync::Arc;

/// Planned transform pair for one length.
pub struct SpectralTransform {
    len: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
}

impl SpectralTransform {
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        Self {
            len,
            forward,
            inverse,
            scratch: vec![Complex64::new(0.0, 0.0); scratch_len],
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Transform a real block. Shorter input is zero-padded, longer input is
    /// cropped to the transform length.
    pub fn forward(&mut self, block: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = block
            .iter()
            .take(self.len)
            .map(|&s| Complex64::new(s, 0.0))
            .collect();
        buffer.resize(self.len, Complex64::new(0.0, 0.0));

        self.forward.process_with_scratch(&mut buffer, &mut self.scratch);
        buffer
    }

    /// Transform a complex block of exactly the transform length.
    pub fn forward_complex(&mut self, block: &[Complex64]) -> Vec<Complex64> {
        debug_assert_eq!(block.len(), self.len);
        let mut buffer = block.to_vec();
        self.forward.process_with_scratch(&mut buffer, &mut self.scratch);
        buffer
    }

    pub fn inverse(&mut self, spectrum: &[Complex64]) -> Vec<Complex64> {
        debug_assert_eq!(spectrum.len(), self.len);
        let mut buffer = spectrum.to_vec();
        self.inverse.process_with_scratch(&mut buffer, &mut self.scratch);

        let norm = 1.0 / self.len as f64;
        for value in &mut buffer {
            *value *= norm;
        }
        buffer
    }

    /// `inverse(a · b)` element-wise: circular cross-correlation when `b` is
    /// a conjugated spectrum.
    pub fn correlate(&mut self, spectrum: &[Complex64], reference: &[Complex64]) -> Vec<Complex64> {
        let product: Vec<Complex64> = spectrum
            .iter()
            .zip(reference.iter())
            .map(|(a, b)| a * b)
            .collect();
        self.inverse(&product)
    }
}

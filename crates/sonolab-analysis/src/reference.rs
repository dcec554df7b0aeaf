//! Conjugated reference spectra for every correlation-based view.
//!
//! Slots start out all-zero and are replaced wholesale, either from a loaded
//! waveform or from the live window. A failed load leaves the slot as it was.

use crate::fft::SpectralTransform;
use rustfft::num_complex::Complex64;
use sonolab_core::{Error, Result};

pub struct ReferenceSignalStore {
    spectra: Vec<Vec<Complex64>>,
    len: usize,
}

impl ReferenceSignalStore {
    pub fn new(count: usize, len: usize) -> Self {
        Self {
            spectra: vec![vec![Complex64::new(0.0, 0.0); len]; count],
            len,
        }
    }

    pub fn count(&self) -> usize {
        self.spectra.len()
    }

    pub fn spectrum(&self, index: usize) -> Option<&[Complex64]> {
        self.spectra.get(index).map(|s| s.as_slice())
    }

    /// All slots, in filter order.
    pub fn spectra(&self) -> impl Iterator<Item = &[Complex64]> {
        self.spectra.iter().map(|s| s.as_slice())
    }

    /// Whether a slot holds anything other than zeros.
    pub fn is_loaded(&self, index: usize) -> bool {
        self.spectra
            .get(index)
            .is_some_and(|s| s.iter().any(|c| c.norm_sqr() > 0.0))
    }

    /// Store `conj(forward(samples))`, zero-padding or cropping the waveform
    /// to the block length.
    pub fn load_from_waveform(
        &mut self,
        samples: &[f64],
        index: usize,
        transform: &mut SpectralTransform,
    ) -> Result<()> {
        self.check_index(index)?;
        if samples.is_empty() {
            return Err(Error::InvalidReference("waveform is empty".into()));
        }
        if samples.iter().any(|s| !s.is_finite()) {
            return Err(Error::InvalidReference(
                "waveform contains non-finite samples".into(),
            ));
        }

        self.store(index, samples, transform);
        tracing::debug!(
            "Reference {} loaded from {} samples",
            index,
            samples.len()
        );
        Ok(())
    }

    /// Store `conj(forward(window))` of the current live window.
    pub fn capture_current(
        &mut self,
        window: &[f64],
        index: usize,
        transform: &mut SpectralTransform,
    ) -> Result<()> {
        self.check_index(index)?;
        self.store(index, window, transform);
        tracing::debug!("Reference {} captured from live window", index);
        Ok(())
    }

    pub fn clear(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.spectra[index].fill(Complex64::new(0.0, 0.0));
        Ok(())
    }

    fn store(&mut self, index: usize, samples: &[f64], transform: &mut SpectralTransform) {
        debug_assert_eq!(transform.len(), self.len);
        let mut spectrum = transform.forward(samples);
        for c in &mut spectrum {
            *c = c.conj();
        }
        self.spectra[index] = spectrum;
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.spectra.len() {
            return Err(Error::FilterIndex {
                index,
                count: self.spectra.len(),
            });
        }
        Ok(())
    }
}

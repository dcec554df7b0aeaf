//! Bank of matched filters sharing one spectral block.
//!
//! Every filter correlates the block against its reference, scores the peak
//! and keeps a persistent trace. The loudest filter is reported as detected.

use crate::axis::{filter_bank_labels, AxisLabel};
use crate::conditioning::{argmax, disp_mag, mean, std_dev, MAG_EPSILON};
use crate::fft::SpectralTransform;
use crate::reference::ReferenceSignalStore;
use crate::result_log::ResultLog;
use rustfft::num_complex::Complex64;
use sonolab_core::SessionConfig;

/// Only this many leading filters carry a rendered trace.
pub const TRACE_LIMIT: usize = 4;

/// Distance of the score baseline from the bottom of the display.
pub const BASELINE_MARGIN: usize = 10;

/// Stored snapshot values are scores divided by this.
pub const SNAPSHOT_DIVISOR: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct FilterBankSettings {
    pub averaging: bool,
    pub centering: bool,
    pub sinr: bool,
}

/// Peak score of one correlation magnitude trace.
///
/// Plain: `100·log10(max + 0.01)`.
/// SINR: `100·log10((max + 0.01) / (std + mean + 0.01))`.
pub fn snr_score(magnitudes: &[f64], sinr: bool) -> f64 {
    let peak = magnitudes.iter().copied().fold(0.0, f64::max) + MAG_EPSILON;
    if sinr {
        let noise = std_dev(magnitudes) + mean(magnitudes) + MAG_EPSILON;
        100.0 * (peak / noise).log10()
    } else {
        100.0 * peak.log10()
    }
}

/// Index of the highest score. A score must strictly beat the running
/// maximum (starting at zero), so ties go to the lower index and a bank
/// with no positive score detects nothing.
pub fn detect(scores: &[f64]) -> Option<usize> {
    let mut best = 0.0;
    let mut detected = None;
    for (i, &score) in scores.iter().enumerate() {
        if score > best {
            best = score;
            detected = Some(i);
        }
    }
    detected
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct FilterReading {
    pub index: usize,
    pub score: f64,
    /// Largest correlation magnitude this pass.
    pub peak: f64,
    pub marker_x: f64,
    pub marker_y: f64,
    /// Display magnitudes of the accumulated trace, first filters only.
    pub trace: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct FilterBankFrame {
    pub readings: Vec<FilterReading>,
    pub detected: Option<usize>,
    /// A snapshot row was appended this pass.
    pub stored: bool,
    pub next_store_number: usize,
    pub labels: Vec<AxisLabel>,
}

pub struct MatchedFilterBank {
    settings: FilterBankSettings,
    accumulators: Vec<Vec<Complex64>>,
    block_size: usize,
    width: usize,
    baseline: f64,
    labels: Vec<AxisLabel>,
}

impl MatchedFilterBank {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            settings: FilterBankSettings::default(),
            accumulators: vec![
                vec![Complex64::new(0.0, 0.0); config.block_size];
                config.filter_count
            ],
            block_size: config.block_size,
            width: config.display.width,
            baseline: config.display.height.saturating_sub(BASELINE_MARGIN) as f64,
            labels: filter_bank_labels(config.block_size, config.sample_rate),
        }
    }

    pub fn settings(&self) -> FilterBankSettings {
        self.settings
    }

    pub fn filter_count(&self) -> usize {
        self.accumulators.len()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn set_averaging(&mut self, enabled: bool) {
        if self.settings.averaging != enabled {
            self.settings.averaging = enabled;
            self.reset();
        }
    }

    pub fn set_centering(&mut self, enabled: bool) {
        if self.settings.centering != enabled {
            self.settings.centering = enabled;
            self.reset();
        }
    }

    pub fn set_sinr(&mut self, enabled: bool) {
        self.settings.sinr = enabled;
    }

    pub fn accumulator(&self, index: usize) -> Option<&[Complex64]> {
        self.accumulators.get(index).map(|a| a.as_slice())
    }

    /// Zero every accumulated trace.
    pub fn reset(&mut self) {
        for acc in &mut self.accumulators {
            acc.fill(Complex64::new(0.0, 0.0));
        }
    }

    pub fn process(
        &mut self,
        spectrum: &[Complex64],
        references: &ReferenceSignalStore,
        transform: &mut SpectralTransform,
        log: &mut ResultLog,
    ) -> FilterBankFrame {
        let count = self.accumulators.len();
        let spacing = self.width as f64 / (count + 1) as f64;
        let mut readings = Vec::with_capacity(count);

        for (i, reference) in references.spectra().take(count).enumerate() {
            let mut corr = transform.correlate(spectrum, reference);
            let magnitudes: Vec<f64> = corr.iter().map(|c| c.norm()).collect();
            let score = snr_score(&magnitudes, self.settings.sinr);
            let peak = magnitudes.iter().copied().fold(0.0, f64::max);

            if self.settings.centering {
                let idx = argmax(&magnitudes);
                corr.rotate_left(idx);
            }

            let acc = &mut self.accumulators[i];
            if self.settings.averaging {
                for (a, c) in acc.iter_mut().zip(&corr) {
                    *a += c;
                }
            } else {
                *acc = corr;
            }

            let trace =
                (i < TRACE_LIMIT).then(|| acc.iter().map(|c| disp_mag(c.norm())).collect());
            let marker_y = if self.settings.sinr {
                self.baseline - score
            } else {
                self.baseline - score / 10.0
            };

            readings.push(FilterReading {
                index: i,
                score,
                peak,
                marker_x: (i + 1) as f64 * spacing,
                marker_y,
                trace,
            });
        }

        let scores: Vec<f64> = readings.iter().map(|r| r.score).collect();
        let detected = detect(&scores);

        let stored = log.take_pending();
        if stored {
            log.push(scores.iter().map(|s| s / SNAPSHOT_DIVISOR).collect());
            tracing::debug!("Stored snapshot #{}", log.len());
        }

        FilterBankFrame {
            readings,
            detected,
            stored,
            next_store_number: log.next_store_number(),
            labels: self.labels.clone(),
        }
    }
}

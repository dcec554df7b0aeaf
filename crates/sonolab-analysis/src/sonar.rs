//! Range and range-Doppler sonar processing.
//!
//! Each pass turns the current window into one pulse (optionally matched
//! filtered and aligned on its strongest echo), pushes it into the pulse
//! history and renders one of two projections of that history:
//!
//! - [`SonarProjection::Waterfall`]: pulses × range image, optionally
//!   transformed across pulses into Doppler
//! - [`SonarProjection::Profile`]: a single range trace, optionally the mean
//!   over every stored pulse

use crate::axis::{doppler_labels, range_labels, AxisLabel};
use crate::conditioning::{argmax, sonar_scale, to_byte, GrayImage, SonarScale};
use crate::fft::SpectralTransform;
use crate::history::PulseHistory;
use rustfft::num_complex::Complex64;
use sonolab_core::{Application, Result, SessionConfig, AVERAGING_WINDOW_STEP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum SonarProjection {
    Waterfall,
    Profile,
}

impl SonarProjection {
    fn scale(self) -> SonarScale {
        match self {
            SonarProjection::Waterfall => SonarScale::Image,
            SonarProjection::Profile => SonarScale::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SonarSettings {
    pub matched_filter: bool,
    pub centering: bool,
    /// Waterfall only: transform across pulses.
    pub doppler: bool,
    /// Profile only: mean over stored pulses instead of the latest one.
    pub averaging: bool,
}

impl Default for SonarSettings {
    fn default() -> Self {
        Self {
            matched_filter: true,
            centering: true,
            doppler: true,
            averaging: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum SonarView {
    /// Rows are pulses (newest first) or Doppler bins (zero in the middle).
    Image(GrayImage),
    Profile(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SonarFrame {
    pub view: SonarView,
    /// Range samples per pixel column.
    pub step: usize,
    pub zoom: i32,
    pub averaging_window: usize,
    pub range_labels: Vec<AxisLabel>,
    /// Empty unless the waterfall shows Doppler.
    pub doppler_labels: Vec<AxisLabel>,
}

/// Range samples per display column: `round(half_len / width / zoom)`.
///
/// A non-positive zoom is reset to 1. When the step would fall to 1 or below
/// it is held at 1 and a zoom above 1 is backed off by one level.
pub fn range_step(half_len: usize, width: usize, zoom: &mut i32) -> usize {
    if *zoom <= 0 {
        *zoom = 1;
    }
    let step = (half_len as f64 / width.max(1) as f64 / *zoom as f64).round();
    if step <= 1.0 {
        if *zoom > 1 {
            *zoom -= 1;
        }
        return 1;
    }
    step as usize
}

/// Every `step`-th sample of `row`.
pub fn decimate(row: &[f64], step: usize) -> Vec<f64> {
    row.iter().step_by(step.max(1)).copied().collect()
}

/// Magnitude of the transform of every column across rows, rotated so the
/// zero-Doppler bin lands at row `⌊rows/2⌋`.
pub fn doppler_magnitudes(rows: &[Vec<f64>], transform: &mut SpectralTransform) -> Vec<Vec<f64>> {
    let pulses = rows.len();
    let width = rows.first().map_or(0, |r| r.len());
    let mut out = vec![vec![0.0; width]; pulses];
    if pulses == 0 {
        return out;
    }

    for col in 0..width {
        let column: Vec<Complex64> = rows.iter().map(|r| Complex64::new(r[col], 0.0)).collect();
        let mut spectrum = transform.forward_complex(&column);
        spectrum.rotate_right(pulses / 2);
        for (row, value) in out.iter_mut().zip(&spectrum) {
            row[col] = value.norm();
        }
    }
    out
}

/// Nearest-row resample to `count` rows: output row `r` takes input row
/// `⌊r · len / count⌋`.
pub fn resample_rows(rows: &[Vec<f64>], count: usize) -> Vec<Vec<f64>> {
    if rows.is_empty() || count == 0 {
        return Vec::new();
    }
    let ratio = rows.len() as f64 / count as f64;
    (0..count)
        .map(|r| {
            let src = ((r as f64 * ratio) as usize).min(rows.len() - 1);
            rows[src].clone()
        })
        .collect()
}

pub struct RangeDopplerProcessor {
    projection: SonarProjection,
    settings: SonarSettings,
    history: PulseHistory,
    doppler: SpectralTransform,
    zoom: i32,
    block_size: usize,
    sample_rate: f64,
    width: usize,
    height: usize,
}

impl RangeDopplerProcessor {
    pub fn new(config: &SessionConfig) -> Self {
        let projection = match config.application {
            Application::RangeSounder => SonarProjection::Profile,
            _ => SonarProjection::Waterfall,
        };
        let pulses = config.averaging_window;
        Self {
            projection,
            settings: SonarSettings::default(),
            history: PulseHistory::new(pulses, config.block_size / 2),
            doppler: SpectralTransform::new(pulses),
            zoom: 1,
            block_size: config.block_size,
            sample_rate: config.sample_rate,
            width: config.display.width,
            height: config.display.height,
        }
    }

    pub fn projection(&self) -> SonarProjection {
        self.projection
    }

    pub fn settings(&self) -> SonarSettings {
        self.settings
    }

    pub fn history(&self) -> &PulseHistory {
        &self.history
    }

    pub fn averaging_window(&self) -> usize {
        self.history.pulses()
    }

    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    pub fn set_matched_filter(&mut self, enabled: bool) {
        if self.settings.matched_filter != enabled {
            self.settings.matched_filter = enabled;
            self.history.clear();
        }
    }

    pub fn set_centering(&mut self, enabled: bool) {
        self.settings.centering = enabled;
    }

    pub fn set_doppler(&mut self, enabled: bool) {
        if self.settings.doppler != enabled {
            self.settings.doppler = enabled;
            self.history.clear();
        }
    }

    pub fn set_averaging(&mut self, enabled: bool) {
        if self.settings.averaging != enabled {
            self.settings.averaging = enabled;
            self.history.clear();
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom += 1;
    }

    pub fn zoom_out(&mut self) {
        self.zoom -= 1;
    }

    /// Hold [`AVERAGING_WINDOW_STEP`] more pulses. Discards history.
    pub fn widen_averaging(&mut self) {
        self.resize_history(self.history.pulses() + AVERAGING_WINDOW_STEP);
    }

    /// Hold [`AVERAGING_WINDOW_STEP`] fewer pulses, never fewer than that
    /// step. Discards history.
    pub fn narrow_averaging(&mut self) {
        let pulses = self
            .history
            .pulses()
            .saturating_sub(AVERAGING_WINDOW_STEP)
            .max(AVERAGING_WINDOW_STEP);
        self.resize_history(pulses);
    }

    fn resize_history(&mut self, pulses: usize) {
        tracing::debug!(
            "Averaging window {} -> {} pulses",
            self.history.pulses(),
            pulses
        );
        self.history.resize(pulses);
        self.doppler = SpectralTransform::new(pulses);
    }

    /// Run one pass. `spectrum` is the transform of `window`; `reference` is
    /// the conjugated chirp used when matched filtering is on.
    pub fn process(
        &mut self,
        window: &[f64],
        spectrum: &[Complex64],
        reference: &[Complex64],
        transform: &mut SpectralTransform,
    ) -> Result<SonarFrame> {
        let pulse = self.pulse(window, spectrum, reference, transform);
        self.history.push(pulse)?;

        let step = range_step(self.block_size / 2, self.width, &mut self.zoom);
        let show_doppler =
            self.projection == SonarProjection::Waterfall && self.settings.doppler;

        let view = match self.projection {
            SonarProjection::Waterfall => {
                let mut rows: Vec<Vec<f64>> = self
                    .history
                    .rows()
                    .iter()
                    .map(|r| decimate(r, step))
                    .collect();
                if show_doppler {
                    let doppler = doppler_magnitudes(&rows, &mut self.doppler);
                    rows = resample_rows(&doppler, self.height);
                }
                SonarView::Image(scale_image(&rows))
            }
            SonarProjection::Profile => {
                let trace = if self.settings.averaging {
                    decimate(&self.history.column_mean(), step)
                } else {
                    decimate(self.history.latest().unwrap_or_default(), step)
                };
                SonarView::Profile(sonar_scale(&trace, SonarScale::Trace))
            }
        };

        Ok(SonarFrame {
            view,
            step,
            zoom: self.zoom,
            averaging_window: self.history.pulses(),
            range_labels: range_labels(self.width, self.sample_rate, step),
            doppler_labels: if show_doppler {
                doppler_labels(self.height, self.block_size)
            } else {
                Vec::new()
            },
        })
    }

    /// Magnitude of the aligned, optionally matched-filtered window, cropped
    /// to the pulse width.
    fn pulse(
        &self,
        window: &[f64],
        spectrum: &[Complex64],
        reference: &[Complex64],
        transform: &mut SpectralTransform,
    ) -> Vec<f64> {
        let mut magnitudes: Vec<f64> = if self.settings.matched_filter {
            let gain = 4.0 / (self.block_size as f64 * self.block_size as f64);
            transform
                .correlate(spectrum, reference)
                .iter()
                .map(|c| (c * gain).norm())
                .collect()
        } else {
            window.iter().map(|s| s.abs()).collect()
        };

        if self.settings.centering {
            let idx = argmax(&magnitudes);
            magnitudes.rotate_left(idx);
        }
        magnitudes.truncate(self.history.width());
        magnitudes
    }
}

fn scale_image(rows: &[Vec<f64>]) -> GrayImage {
    let width = rows.first().map_or(0, |r| r.len());
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    let scaled = sonar_scale(&flat, SonarProjection::Waterfall.scale());
    GrayImage {
        width,
        height: rows.len(),
        pixels: scaled.into_iter().map(to_byte).collect(),
    }
}

//! Numeric conditioning that turns raw spectral data into renderable values.
//!
//! Every logarithm in this crate goes through one of the floors defined
//! here, so no non-finite value reaches the display path.

use rustfft::num_complex::Complex64;

/// Added to magnitudes before the dB conversion used by trace views.
pub const MAG_EPSILON: f64 = 0.01;

/// Lower clip of the trace dB scale, before the offset that moves it to 0.
pub const DISP_FLOOR_DB: f64 = -20.0;

/// Substituted for exact zeros before the sonar log scale.
pub const LOG_FLOOR: f64 = 1e-10;

/// Canonical display magnitude: `clip(20·log10(0.01 + m), -20) + 20`.
///
/// Monotonic in `magnitude` and never negative.
#[inline]
pub fn disp_mag(magnitude: f64) -> f64 {
    (20.0 * (MAG_EPSILON + magnitude).log10()).max(DISP_FLOOR_DB) - DISP_FLOOR_DB
}

/// [`disp_mag`] of the first `bins` entries of a complex sequence.
pub fn disp_mag_bins(values: &[Complex64], bins: usize) -> Vec<f64> {
    values.iter().take(bins).map(|v| disp_mag(v.norm())).collect()
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Clip/offset convention applied after the sonar log scale. The two sonar
/// front-ends quantise differently and each keeps its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum SonarScale {
    /// Range-Doppler waterfall: clip to `[0, 255]`.
    Image,
    /// 1-D range profile: clip to `[-10, 500]`, then shift by +20.
    Trace,
}

impl SonarScale {
    #[inline]
    fn apply(self, value: f64) -> f64 {
        match self {
            SonarScale::Image => value.clamp(0.0, 255.0),
            SonarScale::Trace => value.clamp(-10.0, 500.0) + 20.0,
        }
    }
}

/// `60·log10|x| + 100 − 60·mean(log10|x|)` over the whole input, then the
/// clip convention of `scale`. Zeros are floored to [`LOG_FLOOR`].
pub fn sonar_scale(magnitudes: &[f64], scale: SonarScale) -> Vec<f64> {
    let db: Vec<f64> = magnitudes
        .iter()
        .map(|&m| {
            let m = m.abs();
            if m == 0.0 {
                LOG_FLOOR.log10()
            } else {
                m.log10()
            }
        })
        .collect();
    let offset = 100.0 - 60.0 * mean(&db);

    db.iter().map(|d| scale.apply(60.0 * d + offset)).collect()
}

/// Row-major 8-bit grayscale image. Row 0 is the top of the display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl GrayImage {
    pub fn from_rows(rows: &[Vec<u8>]) -> Self {
        let width = rows.first().map_or(0, |r| r.len());
        let mut pixels = Vec::with_capacity(width * rows.len());
        for row in rows {
            pixels.extend_from_slice(row);
        }
        Self {
            width,
            height: rows.len(),
            pixels,
        }
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }
}

/// Saturating float to byte (truncates toward zero).
#[inline]
pub fn to_byte(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

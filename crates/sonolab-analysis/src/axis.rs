//! Pixel and bin to physical unit conversions for display labels.

/// Speed of sound used by every range conversion, in cm/s.
pub const SPEED_OF_SOUND_CM_S: f64 = 34029.0;

/// Spacing of range gridlines, in pixels.
pub const RANGE_LABEL_SPACING: usize = 50;

/// Spacing of Doppler gridlines, in pixels.
pub const DOPPLER_LABEL_SPACING: usize = 30;

/// A gridline position and the physical value it stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AxisLabel {
    pub pixel: usize,
    pub value: f64,
}

/// Unit of a marker readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum AxisUnit {
    Hertz,
    Milliseconds,
}

impl AxisUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            AxisUnit::Hertz => "Hz",
            AxisUnit::Milliseconds => "ms",
        }
    }
}

#[inline]
pub fn bin_to_hz(bin: usize, sample_rate: f64, block_size: usize) -> f64 {
    bin as f64 * sample_rate / block_size as f64 * 2.0
}

/// Lag of a correlation bin.
#[inline]
pub fn bin_to_ms(bin: usize, sample_rate: f64) -> f64 {
    bin as f64 * 1000.0 / sample_rate
}

/// Monostatic range of a decimated pixel column.
#[inline]
pub fn pixels_to_cm(pixels: usize, sample_rate: f64, step: usize) -> f64 {
    pixels as f64 * SPEED_OF_SOUND_CM_S / sample_rate / 2.0 * step as f64
}

/// Radial velocity of a Doppler row offset from the centre line.
#[inline]
pub fn pixels_to_cmps(pixels: usize, block_size: usize, height: usize, dstep: usize) -> f64 {
    pixels as f64 * SPEED_OF_SOUND_CM_S * 2.0 / (block_size as f64 * height as f64) * dstep as f64
}

/// Range of a filter-bank pixel column.
#[inline]
pub fn filter_bank_range_cm(pixels: usize, block_size: usize, sample_rate: f64) -> f64 {
    block_size as f64 * 340.0 / sample_rate * 100.0 * pixels as f64 / 1024.0
}

/// Range gridlines every [`RANGE_LABEL_SPACING`] pixels across `width`.
pub fn range_labels(width: usize, sample_rate: f64, step: usize) -> Vec<AxisLabel> {
    (1..width / RANGE_LABEL_SPACING)
        .map(|i| {
            let pixel = i * RANGE_LABEL_SPACING;
            AxisLabel {
                pixel,
                value: pixels_to_cm(pixel, sample_rate, step),
            }
        })
        .collect()
}

/// Doppler gridlines every [`DOPPLER_LABEL_SPACING`] pixels below the centre.
pub fn doppler_labels(height: usize, block_size: usize) -> Vec<AxisLabel> {
    (0..height / DOPPLER_LABEL_SPACING)
        .map(|i| {
            let pixel = i * DOPPLER_LABEL_SPACING;
            AxisLabel {
                pixel,
                value: pixels_to_cmps(pixel, block_size, height, 1),
            }
        })
        .collect()
}

pub fn filter_bank_labels(block_size: usize, sample_rate: f64) -> Vec<AxisLabel> {
    (1..10)
        .map(|i| {
            let pixel = i * RANGE_LABEL_SPACING;
            AxisLabel {
                pixel,
                value: filter_bank_range_cm(pixel, block_size, sample_rate),
            }
        })
        .collect()
}

//! Spectrum analyzer views.
//!
//! One processor renders whichever of the four views is selected. The XY
//! track survives mode changes except entry into Spectrum or
//! Autocorrelation; the spectrogram history exists only while it is shown.

use crate::axis::{bin_to_hz, bin_to_ms, AxisUnit};
use crate::conditioning::{disp_mag, disp_mag_bins, to_byte, GrayImage};
use crate::fft::SpectralTransform;
use rustfft::num_complex::Complex64;
use sonolab_core::SessionConfig;
use std::collections::VecDeque;

/// Half-width of the bin window searched around a track marker.
pub const TRACK_PEAK_HALF_WIDTH: usize = 5;

/// Default marker bins.
pub const DEFAULT_MARKERS: [usize; 3] = [100, 200, 300];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum DisplayMode {
    Spectrum,
    Track,
    Autocorrelation,
    #[default]
    Spectrogram,
}

impl DisplayMode {
    pub fn unit(self) -> AxisUnit {
        match self {
            DisplayMode::Autocorrelation => AxisUnit::Milliseconds,
            _ => AxisUnit::Hertz,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Marker {
    First,
    Second,
    Third,
}

impl Marker {
    pub fn index(self) -> usize {
        match self {
            Marker::First => 0,
            Marker::Second => 1,
            Marker::Third => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct MarkerReadout {
    pub bin: usize,
    /// Display magnitude at the marker bin.
    pub magnitude: f64,
    /// Marker position in `unit`.
    pub position: f64,
    pub unit: AxisUnit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
}

/// Bounded XY history, oldest point evicted first.
#[derive(Debug, Clone)]
pub struct TrackHistory {
    points: VecDeque<TrackPoint>,
    capacity: usize,
}

impl TrackHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, point: TrackPoint) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<TrackPoint> {
        self.points.back().copied()
    }

    pub fn points(&self) -> impl Iterator<Item = &TrackPoint> {
        self.points.iter()
    }

    /// `min(width / rms_x, height / rms_y)`. An axis with zero RMS does not
    /// constrain the scale; with both zero the scale is 1.
    pub fn scale(&self, width: usize, height: usize) -> f64 {
        if self.points.is_empty() {
            return 1.0;
        }
        let n = self.points.len() as f64;
        let rms_x = (self.points.iter().map(|p| p.x * p.x).sum::<f64>() / n).sqrt();
        let rms_y = (self.points.iter().map(|p| p.y * p.y).sum::<f64>() / n).sqrt();

        let mut scale = f64::INFINITY;
        if rms_x > 0.0 {
            scale = scale.min(width as f64 / rms_x);
        }
        if rms_y > 0.0 {
            scale = scale.min(height as f64 / rms_y);
        }
        if scale.is_finite() {
            scale
        } else {
            1.0
        }
    }
}

/// Waterfall of past spectra; row 0 is the newest.
#[derive(Debug, Clone)]
pub struct SpectrogramHistory {
    rows: VecDeque<Vec<u8>>,
}

impl SpectrogramHistory {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            rows: (0..height).map(|_| vec![0; width]).collect(),
        }
    }

    pub fn push(&mut self, row: Vec<u8>) {
        self.rows.pop_back();
        self.rows.push_front(row);
    }

    pub fn image(&self) -> GrayImage {
        let rows: Vec<Vec<u8>> = self.rows.iter().cloned().collect();
        GrayImage::from_rows(&rows)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum DisplayView {
    Spectrum(Vec<f64>),
    Autocorrelation(Vec<f64>),
    Spectrogram(GrayImage),
    Track {
        /// Every stored point, multiplied by `scale`.
        points: Vec<TrackPoint>,
        scale: f64,
        /// Newest point (scaled), drawn with a crosshair.
        latest: Option<TrackPoint>,
    },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct DisplayFrame {
    pub mode: DisplayMode,
    pub view: DisplayView,
    pub markers: [MarkerReadout; 3],
}

pub struct DisplayModeProcessor {
    mode: DisplayMode,
    markers: [usize; 3],
    track: TrackHistory,
    spectrogram: Option<SpectrogramHistory>,
    block_size: usize,
    sample_rate: f64,
    width: usize,
    height: usize,
}

impl DisplayModeProcessor {
    pub fn new(config: &SessionConfig) -> Self {
        let mode = DisplayMode::default();
        let mut processor = Self {
            mode,
            markers: DEFAULT_MARKERS,
            track: TrackHistory::new(config.track_capacity),
            spectrogram: None,
            block_size: config.block_size,
            sample_rate: config.sample_rate,
            width: config.display.width,
            height: config.display.height,
        };
        processor.enter(mode);
        processor
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn markers(&self) -> [usize; 3] {
        self.markers
    }

    pub fn track(&self) -> &TrackHistory {
        &self.track
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        if mode == self.mode {
            return;
        }
        tracing::debug!("Display mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.enter(mode);
    }

    fn enter(&mut self, mode: DisplayMode) {
        match mode {
            DisplayMode::Spectrum | DisplayMode::Autocorrelation => {
                self.track.clear();
                self.spectrogram = None;
            }
            DisplayMode::Spectrogram => {
                self.spectrogram = Some(SpectrogramHistory::new(self.height, self.block_size / 2));
            }
            DisplayMode::Track => {
                self.spectrogram = None;
            }
        }
    }

    /// Move a marker to `bin`. Markers are fixed while tracking; returns
    /// whether the marker moved.
    pub fn set_marker(&mut self, marker: Marker, bin: usize) -> bool {
        if self.mode == DisplayMode::Track {
            return false;
        }
        self.markers[marker.index()] = bin;
        true
    }

    pub fn process(
        &mut self,
        spectrum: &[Complex64],
        transform: &mut SpectralTransform,
    ) -> DisplayFrame {
        let half = self.block_size / 2;

        let (view, readout_source) = match self.mode {
            DisplayMode::Spectrum => {
                let mags = disp_mag_bins(spectrum, half);
                (DisplayView::Spectrum(mags.clone()), mags)
            }
            DisplayMode::Autocorrelation => {
                let conj: Vec<Complex64> = spectrum.iter().map(|c| c.conj()).collect();
                let corr = transform.correlate(spectrum, &conj);
                let mags = disp_mag_bins(&corr, half);
                (DisplayView::Autocorrelation(mags.clone()), mags)
            }
            DisplayMode::Spectrogram => {
                let mags = disp_mag_bins(spectrum, half);
                let row: Vec<u8> = mags.iter().map(|m| to_byte(m * 2.0)).collect();
                let history = self
                    .spectrogram
                    .get_or_insert_with(|| SpectrogramHistory::new(self.height, half));
                history.push(row);
                (DisplayView::Spectrogram(history.image()), mags)
            }
            DisplayMode::Track => {
                let point = TrackPoint {
                    x: peak_near(spectrum, self.markers[0]),
                    y: peak_near(spectrum, self.markers[1]),
                };
                self.track.push(point);
                let scale = self.track.scale(self.width, self.height);
                let scaled = |p: &TrackPoint| TrackPoint {
                    x: p.x * scale,
                    y: p.y * scale,
                };
                let view = DisplayView::Track {
                    points: self.track.points().map(scaled).collect(),
                    scale,
                    latest: self.track.latest().as_ref().map(scaled),
                };
                (view, disp_mag_bins(spectrum, half))
            }
        };

        DisplayFrame {
            mode: self.mode,
            view,
            markers: self.readouts(&readout_source),
        }
    }

    fn readouts(&self, mags: &[f64]) -> [MarkerReadout; 3] {
        let unit = self.mode.unit();
        self.markers.map(|bin| {
            let magnitude = if mags.is_empty() {
                disp_mag(0.0)
            } else {
                mags[bin.min(mags.len() - 1)]
            };
            let position = match unit {
                AxisUnit::Hertz => bin_to_hz(bin, self.sample_rate, self.block_size),
                AxisUnit::Milliseconds => bin_to_ms(bin, self.sample_rate),
            };
            MarkerReadout {
                bin,
                magnitude,
                position,
                unit,
            }
        })
    }
}

/// Largest `|S|` over bins `[bin - 5, bin + 5)`, truncated to an integer.
fn peak_near(spectrum: &[Complex64], bin: usize) -> f64 {
    let start = bin.saturating_sub(TRACK_PEAK_HALF_WIDTH).min(spectrum.len());
    let end = (bin + TRACK_PEAK_HALF_WIDTH).min(spectrum.len());
    spectrum[start..end]
        .iter()
        .map(|c| c.norm())
        .fold(0.0, f64::max)
        .trunc()
}

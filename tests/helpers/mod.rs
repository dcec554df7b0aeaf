//! Test helpers and fixtures for sonolab integration tests
//!
//! Sessions are built without capture; every block is fed by hand so each
//! pass is deterministic.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-9): transform round trips
//! - `FLOOR_EPSILON` (1e-9): bins that should sit on the display floor
//! - `TABLE_EPSILON` (5e-5): values read back from a four-decimal table

#![allow(dead_code)]


use sonolab::prelude::*;
use std::path::Path;

/// Build a session from a preset with a few overrides for fast tests.
pub fn test_session(application: Application, block_size: usize, filters: usize) -> Session {
    Session::builder()
        .application(application)
        .block_size(block_size)
        .filter_count(filters)
        .build()
        .expect("Failed to create test session")
}

/// Feed `signal` in half-block chunks, running one pass per chunk. Returns
/// the frame of the last pass.
pub fn feed(session: &Session, signal: &[i16]) -> std::sync::Arc<Frame> {
    let chunk = session.config().chunk_size();
    assert_eq!(signal.len() % chunk, 0, "signal must be whole chunks");

    let mut last = None;
    for block in signal.chunks(chunk) {
        session.submit_samples(block.to_vec());
        last = Some(session.compute_frame().expect("pass should produce a frame"));
    }
    last.expect("signal must not be empty")
}

/// Sine with an integer number of cycles per `period` samples.
pub fn generate_sine_bin(
    bin: usize,
    period: usize,
    amplitude: f64,
    num_samples: usize,
) -> Vec<i16> {
    (0..num_samples)
        .map(|n| {
            let phase = 2.0 * std::f64::consts::PI * bin as f64 * n as f64 / period as f64;
            (amplitude * phase.sin()).round() as i16
        })
        .collect()
}

/// Uniform noise in `-amplitude..amplitude` from a seeded LCG.
pub fn generate_noise(num_samples: usize, amplitude: f64, seed: u64) -> Vec<i16> {
    let mut rng = seed.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
    (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
            let unit = (rng >> 33) as f64 / (1u64 << 31) as f64;
            ((unit * 2.0 - 1.0) * amplitude).round() as i16
        })
        .collect()
}

/// Linear chirp sweeping from `start` to `end` cycles per sample.
pub fn generate_chirp(num_samples: usize, start: f64, end: f64, amplitude: f64) -> Vec<i16> {
    let rate = (end - start) / num_samples as f64;
    (0..num_samples)
        .map(|n| {
            let n = n as f64;
            let phase = 2.0 * std::f64::consts::PI * (start * n + 0.5 * rate * n * n);
            (amplitude * phase.sin()).round() as i16
        })
        .collect()
}

/// Single nonzero sample at `position`.
pub fn generate_impulse(num_samples: usize, position: usize, amplitude: i16) -> Vec<i16> {
    let mut samples = vec![0; num_samples];
    if position < num_samples {
        samples[position] = amplitude;
    }
    samples
}

pub fn to_f64(samples: &[i16]) -> Vec<f64> {
    samples.iter().map(|&s| s as f64).collect()
}

/// Write a 16-bit WAV fixture.
pub fn write_wav(path: &Path, channels: u16, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV fixture");
    for &s in samples {
        writer.write_sample(s).expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize WAV fixture");
}

/// Index of the largest value.
pub fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| {
            if v > bv {
                (i, v)
            } else {
                (bi, bv)
            }
        })
        .0
}

/// Wait up to `max_wait_ms` for `condition`.
pub fn wait_for(max_wait_ms: u64, mut condition: impl FnMut() -> bool) -> bool {
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(max_wait_ms);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
    false
}

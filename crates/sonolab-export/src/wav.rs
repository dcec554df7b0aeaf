//! Reference waveform loading using hound
//!
//! Accepts mono PCM (8 to 32 bit integer) and 32-bit float files. Integer
//! samples keep their raw integer value.

use crate::error::{ExportError, Result};
use hound::{SampleFormat, WavReader};
use std::path::Path;

/// Read a mono WAV file fully into memory.
pub fn read_reference_wav(path: &Path) -> Result<Vec<f64>> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(ExportError::InvalidData(format!(
            "expected a mono file, found {} channels",
            spec.channels
        )));
    }

    let samples: Vec<f64> = match spec.sample_format {
        SampleFormat::Int => {
            if !(8..=32).contains(&spec.bits_per_sample) {
                return Err(ExportError::InvalidData(format!(
                    "unsupported bit depth {}",
                    spec.bits_per_sample
                )));
            }
            reader
                .into_samples::<i32>()
                .map(|s| s.map(f64::from))
                .collect::<std::result::Result<_, _>>()?
        }
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>()?,
    };

    if samples.is_empty() {
        return Err(ExportError::InvalidData("file has no samples".into()));
    }

    tracing::debug!(
        "Read {} reference samples ({} Hz) from {}",
        samples.len(),
        spec.sample_rate,
        path.display()
    );
    Ok(samples)
}

//! CPAL input adapter.
//!
//! Opens the default input device, reframes whatever the driver delivers
//! into fixed half-block chunks of mono `i16`, and publishes each chunk into
//! a [`LatestBlock`]. Only the first channel of multi-channel input is kept.

use crate::{Error, LatestBlock, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use std::sync::Arc;

/// Regroups interleaved driver buffers into fixed-size mono chunks.
pub struct Chunker {
    chunk_size: usize,
    channels: usize,
    frame_pos: usize,
    pending: Vec<i16>,
    sink: Arc<LatestBlock>,
}

impl Chunker {
    pub fn new(chunk_size: usize, channels: usize, sink: Arc<LatestBlock>) -> Self {
        Self {
            chunk_size,
            channels: channels.max(1),
            frame_pos: 0,
            pending: Vec::with_capacity(chunk_size),
            sink,
        }
    }

    pub fn push(&mut self, interleaved: impl Iterator<Item = i16>) {
        for sample in interleaved {
            let keep = self.frame_pos == 0;
            self.frame_pos = (self.frame_pos + 1) % self.channels;
            if !keep {
                continue;
            }

            self.pending.push(sample);
            if self.pending.len() == self.chunk_size {
                let chunk =
                    core::mem::replace(&mut self.pending, Vec::with_capacity(self.chunk_size));
                self.sink.publish(chunk);
            }
        }
    }
}

#[inline]
fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Running input stream. Dropping it closes the device.
pub struct CaptureStream {
    stream: Stream,
}

impl CaptureStream {
    pub fn start(chunk_size: usize, sample_rate: u32, sink: Arc<LatestBlock>) -> Result<Self> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(Error::NoInputDevice)?;
        let supported = device.default_input_config()?;
        let format = supported.sample_format();
        let channels = supported.channels() as usize;

        let mut config: cpal::StreamConfig = supported.into();
        config.sample_rate = cpal::SampleRate(sample_rate);

        let mut chunker = Chunker::new(chunk_size, channels, sink);
        let err_fn = |e: cpal::StreamError| tracing::warn!("Capture stream error: {}", e);

        let stream = match format {
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    chunker.push(data.iter().copied())
                },
                err_fn,
                None,
            )?,
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    chunker.push(data.iter().map(|&s| f32_to_i16(s)))
                },
                err_fn,
                None,
            )?,
            other => {
                return Err(Error::InvalidConfig(format!(
                    "unsupported input sample format {:?}",
                    other
                )))
            }
        };

        stream.play()?;
        tracing::info!(
            "Capture started: {} Hz, {} channel(s), {} samples per chunk",
            sample_rate,
            channels,
            chunk_size
        );

        Ok(Self { stream })
    }

    pub fn stop(&self) -> Result<()> {
        self.stream.pause()?;
        tracing::info!("Capture stopped");
        Ok(())
    }
}

//! Transmit state machine for the chirp playback path.
//!
//! Playback itself belongs to an external [`TransmitSink`]. The core only
//! tracks `Playing`/`Paused`, forwards transitions, and rewinds the sink to
//! time zero whenever the looped waveform reaches end of stream.

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransmitState {
    #[default]
    Paused,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitEvent {
    Play,
    Pause,
    Toggle,
    EndOfStream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    None,
    StateChanged(TransmitState),
    Rewound,
}

/// Playback collaborator driven by [`TransmitControl`].
pub trait TransmitSink: Send {
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    /// Seek back to the start of the transmit waveform.
    fn rewind(&mut self) -> Result<()>;
}

/// Sink that does nothing. Used before a real sink is attached and after
/// shutdown.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransmit;

impl TransmitSink for NullTransmit {
    fn play(&mut self) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        Ok(())
    }

    fn rewind(&mut self) -> Result<()> {
        Ok(())
    }
}

pub struct TransmitControl {
    state: TransmitState,
    sink: Box<dyn TransmitSink>,
    rewinds: u64,
}

impl Default for TransmitControl {
    fn default() -> Self {
        Self::new(Box::new(NullTransmit))
    }
}

impl TransmitControl {
    /// Starts paused; nothing is sent to the sink until the first `Play`.
    pub fn new(sink: Box<dyn TransmitSink>) -> Self {
        Self {
            state: TransmitState::Paused,
            sink,
            rewinds: 0,
        }
    }

    pub fn state(&self) -> TransmitState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransmitState::Playing
    }

    /// Number of end-of-stream rewinds performed.
    pub fn rewinds(&self) -> u64 {
        self.rewinds
    }

    /// Replace the sink, returning the old one. The current state is kept
    /// but not replayed into the new sink.
    pub fn replace_sink(&mut self, sink: Box<dyn TransmitSink>) -> Box<dyn TransmitSink> {
        core::mem::replace(&mut self.sink, sink)
    }

    pub fn set_active(&mut self, active: bool) -> Result<TransitionResult> {
        self.transition(if active {
            TransmitEvent::Play
        } else {
            TransmitEvent::Pause
        })
    }

    /// Apply an event. A sink failure leaves the state unchanged.
    pub fn transition(&mut self, event: TransmitEvent) -> Result<TransitionResult> {
        use TransmitEvent::*;

        match event {
            Play => match self.state {
                TransmitState::Paused => {
                    self.sink.play().map_err(into_transmit_error)?;
                    self.state = TransmitState::Playing;
                    tracing::debug!("Transmit playing");
                    Ok(TransitionResult::StateChanged(TransmitState::Playing))
                }
                TransmitState::Playing => Ok(TransitionResult::None),
            },

            Pause => match self.state {
                TransmitState::Playing => {
                    self.sink.pause().map_err(into_transmit_error)?;
                    self.state = TransmitState::Paused;
                    tracing::debug!("Transmit paused");
                    Ok(TransitionResult::StateChanged(TransmitState::Paused))
                }
                TransmitState::Paused => Ok(TransitionResult::None),
            },

            Toggle => {
                let next = match self.state {
                    TransmitState::Paused => Play,
                    TransmitState::Playing => Pause,
                };
                self.transition(next)
            }

            EndOfStream => {
                // Rearm for the next pulse train regardless of state.
                self.sink.rewind().map_err(into_transmit_error)?;
                self.rewinds += 1;
                Ok(TransitionResult::Rewound)
            }
        }
    }
}

fn into_transmit_error(e: Error) -> Error {
    match e {
        Error::Transmit(_) => e,
        other => Error::Transmit(other.to_string()),
    }
}

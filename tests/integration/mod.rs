//! Integration test modules for sonolab
//!
//! Test categories:
//! - spectrum: spectrum, autocorrelation, spectrogram and track views
//! - filter_bank: detection, ties, snapshots, reference handling
//! - sonar: range profile, waterfall, Doppler, zoom and averaging window
//! - session: input hand-off, skipped ticks, live loop, transmit, shutdown

pub mod filter_bank;
pub mod session;
pub mod sonar;
pub mod spectrum;

//! # Sonolab Export
//!
//! File formats at the edge of the sonolab core:
//! - **Snapshot tables**: whitespace-delimited fixed-point score rows
//! - **State dumps**: sonar pulse history and parameters as JSON, named by timestamp
//! - **Reference waveforms**: mono PCM WAV reading via hound
//!
//! This crate is typically used through the `sonolab` session API, which
//! decides what to write and when to clear in-memory buffers.

pub mod dump;
pub mod error;
pub mod table;
pub mod wav;

pub use dump::{dump_file_name, read_state_dump, write_state_dump, write_state_dump_to, StateDump};
pub use error::{ExportError, Result};
pub use table::{format_snapshot_table, write_snapshot_table};
pub use wav::read_reference_wav;

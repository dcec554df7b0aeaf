//! Full sonar state dumps, named by the local time they were taken.

use crate::error::{ExportError, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Pulse history plus the parameters needed to interpret it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDump {
    /// Pulses × range samples, newest pulse first.
    pub corr_data: Vec<Vec<f64>>,
    pub block_size: usize,
    pub averaging_window: usize,
    pub sample_rate: f64,
    pub blocks: usize,
}

impl StateDump {
    pub fn new(
        corr_data: Vec<Vec<f64>>,
        block_size: usize,
        averaging_window: usize,
        sample_rate: f64,
    ) -> Self {
        Self {
            corr_data,
            block_size,
            averaging_window,
            sample_rate,
            blocks: 1,
        }
    }
}

/// `YYYYMMDDHHMMSS.json`
pub fn dump_file_name(time: &DateTime<Local>) -> String {
    time.format("%Y%m%d%H%M%S.json").to_string()
}

/// Write `dump` into `dir` under a name taken from the current local time.
pub fn write_state_dump(dir: &Path, dump: &StateDump) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(ExportError::InvalidData(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    let path = dir.join(dump_file_name(&Local::now()));
    write_state_dump_to(&path, dump)?;
    Ok(path)
}

pub fn write_state_dump_to(path: &Path, dump: &StateDump) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, dump)?;
    tracing::info!(
        "Dumped {} pulses to {}",
        dump.corr_data.len(),
        path.display()
    );
    Ok(())
}

pub fn read_state_dump(path: &Path) -> Result<StateDump> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}

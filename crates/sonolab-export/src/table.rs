//! Whitespace-delimited snapshot tables.
//!
//! One row per snapshot, one fixed-point value (4 decimals) per filter.

use crate::error::{ExportError, Result};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Render rows as text. Every row must have the same width.
pub fn format_snapshot_table(rows: &[Vec<f64>]) -> Result<String> {
    let width = rows.first().map_or(0, |r| r.len());
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(ExportError::InvalidData(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                width
            )));
        }
        let line: Vec<String> = row.iter().map(|v| format!("{:2.4}", v)).collect();
        // Writing to a String cannot fail
        let _ = writeln!(out, "{}", line.join(" "));
    }
    Ok(out)
}

pub fn write_snapshot_table(path: &Path, rows: &[Vec<f64>]) -> Result<()> {
    let text = format_snapshot_table(rows)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    tracing::info!("Wrote {} snapshots to {}", rows.len(), path.display());
    Ok(())
}

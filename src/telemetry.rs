use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Flight telemetry log: CSV, one row per control tick
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("telemetry record failed: {0}")]
    Csv(#[from] csv::Error),
}

/// One sampled row. Written once, never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub time: f64,     // s since ignition
    pub altitude: f64, // m above the sea-level reference
    pub speed: f64,    // m/s
    pub mass: f64,     // kg
    pub delta_v: f64,  // m/s still available
}

/// Incremental CSV writer. Every appended row is flushed, so a crash loses
/// at most the row being written.
pub struct TelemetryLog<W: Write> {
    writer: csv::Writer<W>,
}

impl TelemetryLog<File> {
    pub fn create(path: &Path) -> Result<Self, TelemetryError> {
        Ok(Self::from_writer(File::create(path)?))
    }
}

impl<W: Write> TelemetryLog<W> {
    pub fn from_writer(writer: W) -> Self {
        TelemetryLog {
            writer: csv::Writer::from_writer(writer),
        }
    }

    /// Append one row, rounded the way the live link reports values.
    pub fn append(&mut self, sample: &TelemetrySample) -> Result<(), TelemetryError> {
        let row = TelemetrySample {
            time: round_to(sample.time, 3),
            altitude: round_to(sample.altitude, 1),
            speed: round_to(sample.speed, 1),
            mass: round_to(sample.mass, 3),
            delta_v: round_to(sample.delta_v, 1),
        };
        self.writer.serialize(row)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, TelemetryError> {
        self.writer.into_inner().map_err(|e| {
            TelemetryError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
        })
    }
}

/// `telemetry_<timestamp>.csv` in the working directory.
pub fn default_log_path() -> PathBuf {
    PathBuf::from(format!(
        "telemetry_{}.csv",
        chrono::Local::now().format("%d-%m-%Y_%H-%M-%S")
    ))
}

/// Read a complete log back for offline analysis.
pub fn read_log<R: Read>(reader: R) -> Result<Vec<TelemetrySample>, TelemetryError> {
    let mut rows = Vec::new();
    for record in csv::Reader::from_reader(reader).deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

pub fn read_log_file(path: &Path) -> Result<Vec<TelemetrySample>, TelemetryError> {
    read_log(File::open(path)?)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

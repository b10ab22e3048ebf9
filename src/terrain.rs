use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::config::SurveyConfig;
use crate::vessel::{Vessel, VesselError};

// ---------------------------------------------------------------------------
// Surface survey: lowest-pass height map keyed by rounded coordinates
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("terrain map I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("terrain map record failed: {0}")]
    Csv(#[from] csv::Error),
}

/// One retained surface sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerrainPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub sea_level_altitude: f64,
    pub surface_altitude: f64,
    pub terrain_height: f64,
}

/// Map keyed by (lat, lon) rounded to three decimal places. An entry is
/// replaced only by a sample taken from a lower sea-level altitude, so the
/// retained observation per key is the closest pass.
#[derive(Debug, Default)]
pub struct TerrainMap {
    points: HashMap<(i64, i64), TerrainPoint>,
}

impl TerrainMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn key(lat: f64, lon: f64) -> (i64, i64) {
        ((lat * 1_000.0).round() as i64, (lon * 1_000.0).round() as i64)
    }

    /// Record a sample. Returns true when the map changed.
    pub fn record(&mut self, point: TerrainPoint) -> bool {
        let key = Self::key(point.latitude, point.longitude);
        match self.points.get(&key) {
            Some(existing) if existing.sea_level_altitude <= point.sea_level_altitude => false,
            _ => {
                self.points.insert(key, point);
                true
            }
        }
    }

    pub fn points(&self) -> impl Iterator<Item = &TerrainPoint> {
        self.points.values()
    }

    /// Write the map as CSV, sorted by key for reproducible files.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TerrainError> {
        let mut w = csv::Writer::from_writer(writer);
        let mut rows: Vec<_> = self.points.iter().collect();
        rows.sort_by_key(|(key, _)| **key);
        for (_, point) in rows {
            w.serialize(point)?;
        }
        w.flush()?;
        Ok(())
    }

    pub fn write_csv_file(&self, path: &Path) -> Result<(), TerrainError> {
        self.write_csv(File::create(path)?)
    }
}

/// Sample the surface every `sample_interval` seconds until the unique-point
/// target is met or `stop` is raised. A raised stop flag is a clean stop
/// requested by the operator, not a fault; whatever was collected is kept.
pub fn survey(
    vessel: &mut dyn Vessel,
    cfg: &SurveyConfig,
    stop: &AtomicBool,
) -> Result<TerrainMap, VesselError> {
    let mut map = TerrainMap::new();
    let mut sampled = 0u64;

    while map.len() < cfg.target_points {
        if stop.load(Ordering::Relaxed) {
            info!("survey interrupted; keeping {} points", map.len());
            break;
        }

        let latitude = vessel.latitude()?;
        let longitude = vessel.longitude()?;
        let sea_level_altitude = vessel.mean_altitude()?;
        let surface_altitude = vessel.surface_altitude()?;
        map.record(TerrainPoint {
            latitude,
            longitude,
            sea_level_altitude,
            surface_altitude,
            terrain_height: sea_level_altitude - surface_altitude,
        });

        sampled += 1;
        if sampled % cfg.progress_every == 0 {
            info!("{sampled} samples taken, {} unique points", map.len());
        }

        vessel.tick(cfg.sample_interval)?;
    }

    Ok(map)
}

/// `height_map_<date>.csv` in the working directory.
pub fn default_map_path() -> PathBuf {
    PathBuf::from(format!(
        "height_map_{}.csv",
        chrono::Local::now().format("%d-%m-%Y")
    ))
}

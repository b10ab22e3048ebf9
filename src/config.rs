use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Mission configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Ascent thresholds and cadences. Distances in m, times in s, angles in deg.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AscentConfig {
    pub target_apoapsis: f64,
    pub turn_start_altitude: f64,
    pub turn_end_altitude: f64,
    pub min_pitch: f64,
    pub coast_pitch: f64,
    pub apoapsis_near_fraction: f64,
    pub apoapsis_margin: f64,
    pub booster_stages: Vec<u8>,
    pub fuel_empty_threshold: f64,
    pub loop_dt: f64,
    pub jettison_count: u32,
    pub jettison_pause: f64,
    pub burn: BurnConfig,
    pub survey: SurveyConfig,
}

impl Default for AscentConfig {
    fn default() -> Self {
        Self {
            target_apoapsis: 102_000.0,
            turn_start_altitude: 1_000.0,
            turn_end_altitude: 45_000.0,
            min_pitch: 10.0,
            coast_pitch: 7.0,
            apoapsis_near_fraction: 0.9,
            apoapsis_margin: 1_000.0,
            booster_stages: vec![6, 5, 4],
            fuel_empty_threshold: 0.1,
            loop_dt: 0.1,           // 10 Hz control loop
            jettison_count: 3,
            jettison_pause: 1.0,
            burn: BurnConfig::default(),
            survey: SurveyConfig::default(),
        }
    }
}

/// Circularization burn execution parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BurnConfig {
    pub lead_time: f64,      // warp margin ahead of ignition, s
    pub wait_tick: f64,      // polling cadence around the burn, s
    pub trim_throttle: f64,  // fine-trim throttle fraction
    pub gap_threshold: f64,  // apoapsis-periapsis convergence target, m
    pub stall_ticks: u32,    // give up after this many ticks without progress
    pub trim_budget: f64,    // hard ceiling on trim time, s
}

impl Default for BurnConfig {
    fn default() -> Self {
        Self {
            lead_time: 5.0,
            wait_tick: 0.1,
            trim_throttle: 0.05,
            gap_threshold: 2_000.0,
            stall_ticks: 100,
            trim_budget: 180.0,
        }
    }
}

/// Terrain survey parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    pub target_points: usize, // unique map cells to collect
    pub sample_interval: f64, // s between samples
    pub progress_every: u64,  // progress message cadence, in samples
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            target_points: 20_000,
            sample_interval: 0.001,
            progress_every: 1_000,
        }
    }
}

/// Load a config from a TOML file; unset keys keep their defaults.
pub fn load(path: &Path) -> Result<AscentConfig, ConfigError> {
    Ok(toml::from_str(&fs::read_to_string(path)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_all_defaults() {
        let cfg: AscentConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.target_apoapsis, 102_000.0);
        assert_eq!(cfg.booster_stages, vec![6, 5, 4]);
        assert_eq!(cfg.burn.gap_threshold, 2_000.0);
        assert_eq!(cfg.survey.target_points, 20_000);
    }

    #[test]
    fn partial_override_keeps_the_rest() {
        let cfg: AscentConfig = toml::from_str(
            r#"
            target_apoapsis = 250000.0

            [burn]
            trim_throttle = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(cfg.target_apoapsis, 250_000.0);
        assert_eq!(cfg.burn.trim_throttle, 0.1);
        assert_eq!(cfg.burn.gap_threshold, 2_000.0);
        assert_eq!(cfg.turn_end_altitude, 45_000.0);
    }
}

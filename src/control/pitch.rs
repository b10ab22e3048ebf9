use crate::config::AscentConfig;

// ---------------------------------------------------------------------------
// Gravity-turn pitch program
// ---------------------------------------------------------------------------

/// Piecewise pitch target as a function of altitude and apoapsis.
///
/// Vertical below the turn-start altitude, a linear slide from 90 toward the
/// floor through the turn band, a shallow coast hold until the apoapsis
/// nears the target, then prograde.
#[derive(Debug, Clone)]
pub struct PitchProgram {
    pub turn_start: f64,       // m
    pub turn_end: f64,         // m
    pub min_pitch: f64,        // deg, floor inside the turn band
    pub coast_pitch: f64,      // deg, hold above the band
    pub target_apoapsis: f64,  // m
    pub near_fraction: f64,    // switch to prograde past this share of target
}

impl PitchProgram {
    pub fn from_config(cfg: &AscentConfig) -> Self {
        Self {
            turn_start: cfg.turn_start_altitude,
            turn_end: cfg.turn_end_altitude,
            min_pitch: cfg.min_pitch,
            coast_pitch: cfg.coast_pitch,
            target_apoapsis: cfg.target_apoapsis,
            near_fraction: cfg.apoapsis_near_fraction,
        }
    }

    /// Commanded pitch above the horizon, deg.
    pub fn target_pitch(&self, altitude: f64, apoapsis: f64) -> f64 {
        if altitude < self.turn_start {
            90.0
        } else if altitude < self.turn_end {
            let progress = (altitude - self.turn_start) / (self.turn_end - self.turn_start);
            (90.0 - progress * 80.0).max(self.min_pitch)
        } else if apoapsis < self.near_fraction * self.target_apoapsis {
            self.coast_pitch
        } else {
            0.0
        }
    }
}

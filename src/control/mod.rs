use thiserror::Error;

use crate::telemetry::TelemetryError;
use crate::vessel::VesselError;

pub mod ascent;
pub mod circularize;
pub mod pitch;
pub mod staging;

pub use ascent::{fly, AscentReport};
pub use circularize::BurnPlan;
pub use pitch::PitchProgram;
pub use staging::BoosterStaging;

/// Errors that abort a mission.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Vessel(#[from] VesselError),

    #[error("telemetry log failure: {0}")]
    Telemetry(#[from] TelemetryError),
}

pub mod config;
pub mod control;
pub mod model;
pub mod orbital;
pub mod physics;
pub mod plot;
pub mod telemetry;
pub mod terrain;
pub mod vessel;

pub use config::AscentConfig;
pub use control::{fly, AscentReport, ControlError};
pub use vessel::{SimVessel, Vessel, VesselError};

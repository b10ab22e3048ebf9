pub mod api;
pub mod sim;
pub mod spec;

pub use api::{Vessel, VesselError};
pub use sim::{ManeuverNode, SimVessel};
pub use spec::{presets, Block, BlockBuilder, StagingAction, VehicleSpec};

pub mod elements;
pub mod maneuvers;

pub use elements::Orbit;
pub use maneuvers::{available_delta_v, burn_duration, circularization_delta_v, vis_viva_speed};

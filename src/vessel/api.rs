use thiserror::Error;

// ---------------------------------------------------------------------------
// Remote-control vessel interface
// ---------------------------------------------------------------------------

/// Errors surfaced by a vessel backend. Connection-class failures are fatal
/// to the mission; the binaries let them propagate and terminate.
#[derive(Debug, Error)]
pub enum VesselError {
    #[error("connection to the simulation lost: {0}")]
    ConnectionLost(String),

    #[error("no staging action left to activate")]
    StagingExhausted,

    #[error("no maneuver node to remove")]
    NoManeuverNode,

    #[error("rejected command: {0}")]
    RejectedCommand(String),
}

/// Remote-control surface of a launch vehicle.
///
/// Mirrors the synchronous getter/command semantics of the game link: every
/// call is a round trip that can fail. `tick` hands the collaborator a slice
/// of time; a live link would sleep, the bundled simulation integrates.
pub trait Vessel {
    // --- time ---------------------------------------------------------

    /// Universal time, s.
    fn ut(&self) -> Result<f64, VesselError>;

    /// Let `dt` seconds pass.
    fn tick(&mut self, dt: f64) -> Result<(), VesselError>;

    /// Time-warp to the given universal time. Engines are shut down for the
    /// duration of the warp.
    fn warp_to(&mut self, ut: f64) -> Result<(), VesselError>;

    // --- flight telemetry ---------------------------------------------

    /// Altitude above the sea-level reference sphere, m.
    fn mean_altitude(&self) -> Result<f64, VesselError>;

    /// Altitude above the terrain directly below, m.
    fn surface_altitude(&self) -> Result<f64, VesselError>;

    fn latitude(&self) -> Result<f64, VesselError>;

    fn longitude(&self) -> Result<f64, VesselError>;

    fn speed(&self) -> Result<f64, VesselError>;

    fn mass(&self) -> Result<f64, VesselError>;

    fn dry_mass(&self) -> Result<f64, VesselError>;

    /// Combined specific impulse of the running engines, s.
    fn specific_impulse(&self) -> Result<f64, VesselError>;

    /// Maximum thrust of the running engines at full throttle, N.
    fn available_thrust(&self) -> Result<f64, VesselError>;

    // --- orbit --------------------------------------------------------

    fn gravitational_parameter(&self) -> Result<f64, VesselError>;

    fn apoapsis_altitude(&self) -> Result<f64, VesselError>;

    fn periapsis_altitude(&self) -> Result<f64, VesselError>;

    fn apoapsis_radius(&self) -> Result<f64, VesselError>;

    fn semi_major_axis(&self) -> Result<f64, VesselError>;

    fn time_to_apoapsis(&self) -> Result<f64, VesselError>;

    // --- resources ----------------------------------------------------

    /// Liquid fuel remaining in the blocks that separate at `stage`, units.
    /// Reads 0 once the stage is gone.
    fn liquid_fuel_in_stage(&self, stage: u8) -> Result<f64, VesselError>;

    // --- commands -----------------------------------------------------

    fn set_throttle(&mut self, throttle: f64) -> Result<(), VesselError>;

    /// Point the autopilot at a pitch angle above the horizon, deg, flown
    /// along the ascent plane.
    fn set_target_pitch(&mut self, pitch_deg: f64) -> Result<(), VesselError>;

    /// Hold the velocity vector.
    fn hold_prograde(&mut self) -> Result<(), VesselError>;

    fn activate_next_stage(&mut self) -> Result<(), VesselError>;

    /// Place a maneuver node at `ut` with the given prograde delta-v, m/s.
    fn add_maneuver_node(&mut self, ut: f64, prograde: f64) -> Result<(), VesselError>;

    fn remove_maneuver_node(&mut self) -> Result<(), VesselError>;

    fn deploy_solar_panels(&mut self) -> Result<(), VesselError>;
}

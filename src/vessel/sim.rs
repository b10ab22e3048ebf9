use std::collections::VecDeque;

use nalgebra::Vector3;

use crate::orbital::Orbit;
use crate::physics::{Body, G0};

use super::api::{Vessel, VesselError};
use super::spec::{StagingAction, VehicleSpec, FUEL_UNIT_MASS};

// ---------------------------------------------------------------------------
// Physics-backed vessel: point mass over a rotating body
// ---------------------------------------------------------------------------

/// Integration step ceiling in live flight, s.
const MAX_FLIGHT_STEP: f64 = 0.02;
/// Integration step ceiling while time-warping (coast only), s.
const MAX_WARP_STEP: f64 = 1.0;

/// Flight stays in the X-Z inertial plane (a polar launch); this is the
/// plane normal, oriented so the tangential direction at the pad points
/// toward the pole.
fn plane_normal() -> Vector3<f64> {
    Vector3::new(0.0, -1.0, 0.0)
}

#[derive(Debug, Clone)]
struct BlockState {
    name: String,
    dry_mass: f64,
    fuel: f64, // units remaining
    thrust: f64,
    isp: f64,
    decouple_stage: Option<u8>,
    ignited: bool,
    attached: bool,
}

impl BlockState {
    fn burning(&self) -> bool {
        self.attached && self.ignited && self.thrust > 0.0 && self.fuel > 0.0
    }

    fn mass(&self) -> f64 {
        self.dry_mass + self.fuel * FUEL_UNIT_MASS
    }
}

/// A single planned prograde impulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManeuverNode {
    pub ut: f64,
    pub prograde: f64, // m/s
}

#[derive(Debug, Clone, Copy)]
enum AttitudeMode {
    /// Degrees above the horizon, flown along the ascent plane.
    Pitch(f64),
    /// Follow the velocity vector.
    Prograde,
}

/// In-process stand-in for the game link: the same getter/command surface,
/// backed by point-mass physics in vacuum over a rotating body.
pub struct SimVessel {
    body: Body,
    name: String,
    blocks: Vec<BlockState>,
    staging: VecDeque<StagingAction>,
    ut: f64,
    pos: Vector3<f64>,
    vel: Vector3<f64>,
    throttle: f64,
    attitude: AttitudeMode,
    node: Option<ManeuverNode>,
    panels_deployed: bool,
    landed: bool,
}

impl SimVessel {
    /// Place a vehicle on the pad at the equator of `body`.
    pub fn on_launch_pad(body: Body, spec: VehicleSpec) -> Self {
        let pad_radius = body.radius + terrain_height(0.0, 0.0);
        let mut vessel = Self::from_spec(body, spec);
        vessel.pos = Vector3::new(pad_radius, 0.0, 0.0);
        vessel.landed = true;
        vessel
    }

    /// Start already coasting on a circular polar orbit at `altitude`.
    pub fn in_circular_orbit(body: Body, spec: VehicleSpec, altitude: f64) -> Self {
        let r = body.radius + altitude;
        let v = (body.mu / r).sqrt();
        let mut vessel = Self::from_spec(body, spec);
        vessel.pos = Vector3::new(r, 0.0, 0.0);
        vessel.vel = Vector3::new(0.0, 0.0, v);
        vessel.landed = false;
        vessel
    }

    fn from_spec(body: Body, spec: VehicleSpec) -> Self {
        let blocks = spec
            .blocks
            .into_iter()
            .map(|b| BlockState {
                name: b.name,
                dry_mass: b.dry_mass,
                fuel: b.fuel,
                thrust: b.thrust,
                isp: b.isp,
                decouple_stage: b.decouple_stage,
                ignited: false,
                attached: true,
            })
            .collect();

        SimVessel {
            body,
            name: spec.name,
            blocks,
            staging: spec.staging.into(),
            ut: 0.0,
            pos: Vector3::zeros(),
            vel: Vector3::zeros(),
            throttle: 0.0,
            attitude: AttitudeMode::Pitch(90.0),
            node: None,
            panels_deployed: false,
            landed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn panels_deployed(&self) -> bool {
        self.panels_deployed
    }

    pub fn maneuver_node(&self) -> Option<ManeuverNode> {
        self.node
    }

    fn total_thrust(&self) -> f64 {
        self.blocks.iter().filter(|b| b.burning()).map(|b| b.thrust).sum()
    }

    /// Thrust-weighted combined Isp of the running engines, s.
    fn combined_isp(&self) -> f64 {
        let thrust = self.total_thrust();
        if thrust <= 0.0 {
            return 0.0;
        }
        let weighted: f64 = self
            .blocks
            .iter()
            .filter(|b| b.burning())
            .map(|b| b.thrust / b.isp)
            .sum();
        thrust / weighted
    }

    fn total_mass(&self) -> f64 {
        self.blocks.iter().filter(|b| b.attached).map(|b| b.mass()).sum()
    }

    fn attached_dry_mass(&self) -> f64 {
        self.blocks.iter().filter(|b| b.attached).map(|b| b.dry_mass).sum()
    }

    fn radial_up(&self) -> Vector3<f64> {
        self.pos / self.pos.norm()
    }

    fn thrust_direction(&self) -> Vector3<f64> {
        match self.attitude {
            AttitudeMode::Prograde => {
                let speed = self.vel.norm();
                if speed > 1e-6 {
                    self.vel / speed
                } else {
                    self.radial_up()
                }
            }
            AttitudeMode::Pitch(deg) => {
                let up = self.radial_up();
                let horizontal = plane_normal().cross(&up);
                let angle = deg.to_radians();
                up * angle.sin() + horizontal * angle.cos()
            }
        }
    }

    fn orbit(&self) -> Orbit {
        Orbit::from_state_vector(&self.pos, &self.vel, self.body.mu)
    }

    fn latitude_deg(&self) -> f64 {
        (self.pos.z / self.pos.norm()).clamp(-1.0, 1.0).asin().to_degrees()
    }

    fn longitude_deg(&self) -> f64 {
        let inertial = self.pos.y.atan2(self.pos.x);
        let lon = inertial - self.body.rotation_angle(self.ut);
        normalize_deg(lon.to_degrees())
    }

    /// One integration step: RK4 over position and velocity with the thrust
    /// direction and mass flow held constant across the step.
    fn flight_step(&mut self, h: f64) {
        let thrust = self.total_thrust() * self.throttle;
        let direction = self.thrust_direction();
        let isp = self.combined_isp();
        let mdot = if thrust > 0.0 && isp > 0.0 {
            thrust / (isp * G0)
        } else {
            0.0
        };

        let mu = self.body.mu;
        let accel = |pos: &Vector3<f64>, mass: f64| -> Vector3<f64> {
            let r = pos.norm();
            let mut a = -mu / (r * r * r) * pos;
            if thrust > 0.0 && mass > 0.0 {
                a += direction * (thrust / mass);
            }
            a
        };

        let m0 = self.total_mass();
        let p0 = self.pos;
        let v0 = self.vel;

        let k1v = accel(&p0, m0);
        let k1p = v0;
        let k2v = accel(&(p0 + k1p * (h / 2.0)), m0 - mdot * h / 2.0);
        let k2p = v0 + k1v * (h / 2.0);
        let k3v = accel(&(p0 + k2p * (h / 2.0)), m0 - mdot * h / 2.0);
        let k3p = v0 + k2v * (h / 2.0);
        let k4v = accel(&(p0 + k3p * h), m0 - mdot * h);
        let k4p = v0 + k3v * h;

        self.pos = p0 + (k1p + 2.0 * k2p + 2.0 * k3p + k4p) * (h / 6.0);
        self.vel = v0 + (k1v + 2.0 * k2v + 2.0 * k3v + k4v) * (h / 6.0);

        if mdot > 0.0 {
            let throttle = self.throttle;
            for block in self.blocks.iter_mut() {
                if block.burning() {
                    let flow = throttle * block.thrust / (block.isp * G0);
                    block.fuel = (block.fuel - flow * h / FUEL_UNIT_MASS).max(0.0);
                }
            }
        }

        self.ut += h;
    }

    fn advance(&mut self, dt: f64, max_step: f64) {
        let mut remaining = dt;
        while remaining > 1e-9 {
            let h = remaining.min(max_step);
            if self.landed {
                self.ut += h;
            } else {
                self.flight_step(h);
            }
            remaining -= h;
        }
    }
}

fn normalize_deg(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Synthetic terrain profile, m above the reference sphere.
fn terrain_height(lat_deg: f64, lon_deg: f64) -> f64 {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    380.0 * (3.0 * lat).sin() * (2.0 * lon).cos()
        + 140.0 * (5.0 * lon).sin()
        + 60.0 * (11.0 * lat).cos()
}

impl Vessel for SimVessel {
    fn ut(&self) -> Result<f64, VesselError> {
        Ok(self.ut)
    }

    fn tick(&mut self, dt: f64) -> Result<(), VesselError> {
        self.advance(dt, MAX_FLIGHT_STEP);
        Ok(())
    }

    fn warp_to(&mut self, ut: f64) -> Result<(), VesselError> {
        if ut > self.ut {
            self.throttle = 0.0;
            self.advance(ut - self.ut, MAX_WARP_STEP);
        }
        Ok(())
    }

    fn mean_altitude(&self) -> Result<f64, VesselError> {
        Ok(self.pos.norm() - self.body.radius)
    }

    fn surface_altitude(&self) -> Result<f64, VesselError> {
        let mean = self.pos.norm() - self.body.radius;
        Ok(mean - terrain_height(self.latitude_deg(), self.longitude_deg()))
    }

    fn latitude(&self) -> Result<f64, VesselError> {
        Ok(self.latitude_deg())
    }

    fn longitude(&self) -> Result<f64, VesselError> {
        Ok(self.longitude_deg())
    }

    fn speed(&self) -> Result<f64, VesselError> {
        Ok(self.vel.norm())
    }

    fn mass(&self) -> Result<f64, VesselError> {
        Ok(self.total_mass())
    }

    fn dry_mass(&self) -> Result<f64, VesselError> {
        Ok(self.attached_dry_mass())
    }

    fn specific_impulse(&self) -> Result<f64, VesselError> {
        Ok(self.combined_isp())
    }

    fn available_thrust(&self) -> Result<f64, VesselError> {
        Ok(self.total_thrust())
    }

    fn gravitational_parameter(&self) -> Result<f64, VesselError> {
        Ok(self.body.mu)
    }

    fn apoapsis_altitude(&self) -> Result<f64, VesselError> {
        Ok(self.orbit().apoapsis_radius() - self.body.radius)
    }

    fn periapsis_altitude(&self) -> Result<f64, VesselError> {
        Ok(self.orbit().periapsis_radius() - self.body.radius)
    }

    fn apoapsis_radius(&self) -> Result<f64, VesselError> {
        Ok(self.orbit().apoapsis_radius())
    }

    fn semi_major_axis(&self) -> Result<f64, VesselError> {
        Ok(self.orbit().sma)
    }

    fn time_to_apoapsis(&self) -> Result<f64, VesselError> {
        Ok(self.orbit().time_to_apoapsis())
    }

    fn liquid_fuel_in_stage(&self, stage: u8) -> Result<f64, VesselError> {
        Ok(self
            .blocks
            .iter()
            .filter(|b| b.attached && b.decouple_stage == Some(stage))
            .map(|b| b.fuel)
            .sum())
    }

    fn set_throttle(&mut self, throttle: f64) -> Result<(), VesselError> {
        self.throttle = throttle.clamp(0.0, 1.0);
        Ok(())
    }

    fn set_target_pitch(&mut self, pitch_deg: f64) -> Result<(), VesselError> {
        self.attitude = AttitudeMode::Pitch(pitch_deg);
        Ok(())
    }

    fn hold_prograde(&mut self) -> Result<(), VesselError> {
        self.attitude = AttitudeMode::Prograde;
        Ok(())
    }

    fn activate_next_stage(&mut self) -> Result<(), VesselError> {
        let action = self.staging.pop_front().ok_or(VesselError::StagingExhausted)?;
        match action {
            StagingAction::Ignite(names) => {
                for name in &names {
                    let block = self
                        .blocks
                        .iter_mut()
                        .find(|b| b.attached && &b.name == name)
                        .ok_or_else(|| {
                            VesselError::RejectedCommand(format!("no block '{name}' to ignite"))
                        })?;
                    block.ignited = true;
                }
                self.landed = false;
            }
            StagingAction::Jettison(name) => {
                let block = self
                    .blocks
                    .iter_mut()
                    .find(|b| b.attached && b.name == name)
                    .ok_or_else(|| {
                        VesselError::RejectedCommand(format!("no block '{name}' to jettison"))
                    })?;
                block.attached = false;
            }
        }
        Ok(())
    }

    fn add_maneuver_node(&mut self, ut: f64, prograde: f64) -> Result<(), VesselError> {
        self.node = Some(ManeuverNode { ut, prograde });
        Ok(())
    }

    fn remove_maneuver_node(&mut self) -> Result<(), VesselError> {
        self.node.take().map(|_| ()).ok_or(VesselError::NoManeuverNode)
    }

    fn deploy_solar_panels(&mut self) -> Result<(), VesselError> {
        self.panels_deployed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vessel::presets;
    use approx::assert_relative_eq;

    fn pad_vessel() -> SimVessel {
        SimVessel::on_launch_pad(Body::kerbin(), presets::satellite_lifter())
    }

    #[test]
    fn pad_state_is_quiet() {
        let vessel = pad_vessel();
        assert_relative_eq!(vessel.speed().unwrap(), 0.0);
        assert!(vessel.mean_altitude().unwrap() > 0.0, "pad sits on terrain");
        assert_relative_eq!(vessel.mass().unwrap(), presets::satellite_lifter().wet_mass());
        assert_relative_eq!(vessel.latitude().unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn vertical_climb_after_ignition() {
        let mut vessel = pad_vessel();
        vessel.set_throttle(1.0).unwrap();
        vessel.set_target_pitch(90.0).unwrap();
        vessel.activate_next_stage().unwrap();

        let fuel_before = vessel.liquid_fuel_in_stage(6).unwrap();
        let alt_before = vessel.mean_altitude().unwrap();
        vessel.tick(10.0).unwrap();

        assert!(vessel.mean_altitude().unwrap() > alt_before + 100.0);
        assert!(vessel.speed().unwrap() > 20.0);
        assert!(vessel.liquid_fuel_in_stage(6).unwrap() < fuel_before);
    }

    #[test]
    fn jettisoned_stage_reads_empty() {
        let mut vessel = pad_vessel();
        vessel.activate_next_stage().unwrap(); // ignition
        let mass_before = vessel.mass().unwrap();
        vessel.activate_next_stage().unwrap(); // drop stage-6 bank
        assert_eq!(vessel.liquid_fuel_in_stage(6).unwrap(), 0.0);
        assert!(vessel.mass().unwrap() < mass_before);
    }

    #[test]
    fn staging_plan_runs_out() {
        let mut vessel = pad_vessel();
        for _ in 0..7 {
            vessel.activate_next_stage().unwrap();
        }
        assert!(matches!(
            vessel.activate_next_stage(),
            Err(VesselError::StagingExhausted)
        ));
    }

    #[test]
    fn maneuver_node_lifecycle() {
        let mut vessel = pad_vessel();
        assert!(matches!(
            vessel.remove_maneuver_node(),
            Err(VesselError::NoManeuverNode)
        ));
        vessel.add_maneuver_node(120.0, 42.0).unwrap();
        assert_eq!(
            vessel.maneuver_node(),
            Some(ManeuverNode { ut: 120.0, prograde: 42.0 })
        );
        vessel.remove_maneuver_node().unwrap();
        assert_eq!(vessel.maneuver_node(), None);
    }

    #[test]
    fn warp_coasts_without_burning_fuel() {
        let body = Body::kerbin();
        let mut vessel = SimVessel::in_circular_orbit(body, presets::satellite_lifter(), 100_000.0);
        let fuel = vessel.liquid_fuel_in_stage(6).unwrap();
        let alt = vessel.mean_altitude().unwrap();

        vessel.warp_to(500.0).unwrap();

        assert_relative_eq!(vessel.ut().unwrap(), 500.0, epsilon = 1e-6);
        assert_eq!(vessel.liquid_fuel_in_stage(6).unwrap(), fuel);
        // Circular orbit stays circular through the warp
        assert_relative_eq!(vessel.mean_altitude().unwrap(), alt, epsilon = 50.0);
    }

    #[test]
    fn circular_orbit_getters_agree() {
        let body = Body::kerbin();
        let altitude = 100_000.0;
        let vessel = SimVessel::in_circular_orbit(body.clone(), presets::satellite_lifter(), altitude);

        assert_relative_eq!(vessel.apoapsis_altitude().unwrap(), altitude, epsilon = 1.0);
        assert_relative_eq!(vessel.periapsis_altitude().unwrap(), altitude, epsilon = 1.0);
        assert_relative_eq!(
            vessel.semi_major_axis().unwrap(),
            body.radius + altitude,
            epsilon = 1.0
        );
        assert_relative_eq!(vessel.gravitational_parameter().unwrap(), body.mu);
    }

    #[test]
    fn combined_isp_sits_between_engine_extremes() {
        let mut vessel = pad_vessel();
        vessel.activate_next_stage().unwrap();
        let isp = vessel.specific_impulse().unwrap();
        assert!(isp > 280.0 && isp < 320.0, "combined Isp {isp} out of range");
    }

    #[test]
    fn longitude_drifts_with_body_rotation() {
        let mut vessel = pad_vessel();
        let lon_before = vessel.longitude().unwrap();
        vessel.tick(60.0).unwrap(); // still clamped to the pad
        let lon_after = vessel.longitude().unwrap();
        assert!(
            (lon_after - lon_before).abs() > 0.1,
            "a minute of rotation should move the ground track"
        );
    }
}

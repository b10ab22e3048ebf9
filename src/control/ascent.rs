use std::io::Write;

use log::info;

use crate::config::AscentConfig;
use crate::orbital::available_delta_v;
use crate::physics::G0;
use crate::telemetry::{TelemetryLog, TelemetrySample};
use crate::vessel::Vessel;

use super::circularize;
use super::pitch::PitchProgram;
use super::staging::BoosterStaging;
use super::ControlError;

// ---------------------------------------------------------------------------
// Closed-loop ascent: liftoff to circular orbit
// ---------------------------------------------------------------------------

/// What the mission ended with.
#[derive(Debug, Clone)]
pub struct AscentReport {
    pub apoapsis: f64,  // m
    pub periapsis: f64, // m
    pub elapsed: f64,   // s since ignition
    pub samples: u64,   // telemetry rows written
}

/// Fly the full launch sequence: staged ascent with a gravity turn, engine
/// cutoff at the apoapsis target, payload separation, and a circularization
/// burn at apoapsis. One telemetry row is appended per control tick.
pub fn fly<W: Write>(
    vessel: &mut dyn Vessel,
    cfg: &AscentConfig,
    telemetry: &mut TelemetryLog<W>,
) -> Result<AscentReport, ControlError> {
    vessel.set_throttle(1.0)?;
    vessel.set_target_pitch(90.0)?;

    for s in (1..=3).rev() {
        info!("liftoff in {s}...");
        vessel.tick(1.0)?;
    }
    info!("ignition");
    vessel.activate_next_stage()?;
    let ignition_ut = vessel.ut()?;

    let mut staging = BoosterStaging::new(&cfg.booster_stages);
    let pitch = PitchProgram::from_config(cfg);
    let mut samples = 0u64;

    loop {
        // Booster banks drop the moment their fuel reads empty
        if let Some(stage) = staging.current() {
            let fuel = vessel.liquid_fuel_in_stage(stage)?;
            if staging.next_if_exhausted(fuel, cfg.fuel_empty_threshold).is_some() {
                vessel.activate_next_stage()?;
                info!("stage {stage} boosters separated");
            }
        }

        let elapsed = vessel.ut()? - ignition_ut;
        let wet_mass = vessel.mass()?;
        let delta_v = available_delta_v(
            wet_mass,
            vessel.dry_mass()?,
            vessel.specific_impulse()? * G0,
        );
        telemetry.append(&TelemetrySample {
            time: elapsed,
            altitude: vessel.mean_altitude()?,
            speed: vessel.speed()?,
            mass: wet_mass,
            delta_v,
        })?;
        samples += 1;

        let altitude = vessel.mean_altitude()?;
        let apoapsis = vessel.apoapsis_altitude()?;
        vessel.set_target_pitch(pitch.target_pitch(altitude, apoapsis))?;

        if apoapsis > cfg.target_apoapsis - cfg.apoapsis_margin {
            info!("apoapsis target reached; engine cutoff and payload separation");
            vessel.set_throttle(0.0)?;
            break;
        }

        vessel.tick(cfg.loop_dt)?;
    }

    // Fairing, spent core and payload separate on a fixed cadence
    for _ in 0..cfg.jettison_count {
        vessel.tick(cfg.jettison_pause)?;
        vessel.activate_next_stage()?;
    }

    let plan = circularize::plan(vessel)?;
    info!(
        "circularization planned: {:.1} m/s over {:.1} s",
        plan.delta_v, plan.duration
    );
    circularize::execute(vessel, &plan, &cfg.burn)?;

    info!("deploying solar panels");
    vessel.deploy_solar_panels()?;

    let report = AscentReport {
        apoapsis: vessel.apoapsis_altitude()?,
        periapsis: vessel.periapsis_altitude()?,
        elapsed: vessel.ut()? - ignition_ut,
        samples,
    };
    info!(
        "orbit reached: apoapsis {:.0} m, periapsis {:.0} m after {:.1} s",
        report.apoapsis, report.periapsis, report.elapsed
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Body;
    use crate::telemetry::read_log;
    use crate::vessel::{presets, SimVessel};

    #[test]
    fn preset_lifter_reaches_the_target_orbit() {
        let cfg = AscentConfig::default();
        let mut vessel = SimVessel::on_launch_pad(Body::kerbin(), presets::satellite_lifter());
        let mut telemetry = TelemetryLog::from_writer(Vec::new());

        let report = fly(&mut vessel, &cfg, &mut telemetry).unwrap();

        assert!(
            report.apoapsis > cfg.target_apoapsis - 2_000.0,
            "apoapsis fell short: {:.0} m",
            report.apoapsis
        );
        assert!(
            report.apoapsis - report.periapsis < cfg.burn.gap_threshold,
            "orbit not circular: apsis gap {:.0} m",
            report.apoapsis - report.periapsis
        );
        assert!(vessel.panels_deployed(), "panels deploy after insertion");
        assert!(vessel.maneuver_node().is_none(), "node removed after the burn");
        assert!(report.samples > 100, "telemetry should cover the whole climb");
    }

    #[test]
    fn telemetry_log_is_complete_and_ordered() {
        let cfg = AscentConfig::default();
        let mut vessel = SimVessel::on_launch_pad(Body::kerbin(), presets::satellite_lifter());
        let mut telemetry = TelemetryLog::from_writer(Vec::new());

        let report = fly(&mut vessel, &cfg, &mut telemetry).unwrap();

        let rows = read_log(telemetry.into_inner().unwrap().as_slice()).unwrap();
        assert_eq!(rows.len() as u64, report.samples);
        assert!(rows.windows(2).all(|w| w[0].time <= w[1].time));
        // Lifting off burns propellant, so recorded mass is non-increasing
        assert!(rows.windows(2).all(|w| w[0].mass >= w[1].mass));
        // The delta-v estimate is always a finite, non-negative number
        assert!(rows.iter().all(|r| r.delta_v >= 0.0 && r.delta_v.is_finite()));
    }
}

use log::{info, warn};

use crate::config::BurnConfig;
use crate::orbital::{burn_duration, circularization_delta_v};
use crate::physics::G0;
use crate::vessel::Vessel;

use super::ControlError;

// ---------------------------------------------------------------------------
// Circularization at apoapsis
// ---------------------------------------------------------------------------

/// Planned apoapsis burn.
#[derive(Debug, Clone, Copy)]
pub struct BurnPlan {
    pub delta_v: f64,  // m/s, prograde
    pub duration: f64, // s at full throttle
    pub node_ut: f64,  // universal time of apoapsis arrival
}

/// Plan the burn from the current orbit and leave a maneuver node on it.
pub fn plan(vessel: &mut dyn Vessel) -> Result<BurnPlan, ControlError> {
    let mu = vessel.gravitational_parameter()?;
    let r_apo = vessel.apoapsis_radius()?;
    let delta_v = circularization_delta_v(mu, r_apo, vessel.semi_major_axis()?);

    let node_ut = vessel.ut()? + vessel.time_to_apoapsis()?;
    vessel.add_maneuver_node(node_ut, delta_v)?;

    let isp_eff = vessel.specific_impulse()? * G0;
    let duration = burn_duration(delta_v, vessel.available_thrust()?, isp_eff, vessel.mass()?);

    Ok(BurnPlan {
        delta_v,
        duration,
        node_ut,
    })
}

/// Execute a planned burn: warp to just ahead of the half-duration lead
/// point, burn at full throttle, then trim at low throttle until the apsides
/// converge. The node is removed on every exit path.
///
/// The trim loop also gives up when the apsis gap stops shrinking or the
/// tick budget runs out, so an unreachable threshold cannot wedge the
/// mission.
pub fn execute(
    vessel: &mut dyn Vessel,
    plan: &BurnPlan,
    cfg: &BurnConfig,
) -> Result<(), ControlError> {
    info!("orienting prograde for the burn");
    vessel.hold_prograde()?;

    let burn_start = plan.node_ut - plan.duration / 2.0;
    vessel.warp_to(burn_start - cfg.lead_time)?;

    // Close the lead gap on the clock; the apoapsis timer refines the last
    // seconds but cannot be trusted alone once the orbit is nearly round.
    while vessel.ut()? < burn_start && vessel.time_to_apoapsis()? - plan.duration / 2.0 > 0.0 {
        vessel.tick(cfg.wait_tick)?;
    }

    info!("executing burn");
    vessel.set_throttle(1.0)?;
    let mut remaining = (plan.duration - 0.1).max(0.0);
    while remaining > 0.0 {
        let step = remaining.min(cfg.wait_tick);
        vessel.tick(step)?;
        remaining -= step;
    }

    info!("trimming");
    vessel.set_throttle(cfg.trim_throttle)?;
    let mut best_gap = f64::INFINITY;
    let mut stalled_ticks = 0u32;
    let mut spent = 0.0;
    loop {
        let gap = vessel.apoapsis_altitude()? - vessel.periapsis_altitude()?;
        if gap < cfg.gap_threshold {
            break;
        }
        if gap < best_gap - 1.0 {
            best_gap = gap;
            stalled_ticks = 0;
        } else {
            stalled_ticks += 1;
        }
        if stalled_ticks > cfg.stall_ticks || spent > cfg.trim_budget {
            warn!("trim stopped before convergence (apsis gap {gap:.0} m)");
            break;
        }
        vessel.tick(cfg.wait_tick)?;
        spent += cfg.wait_tick;
    }

    vessel.set_throttle(0.0)?;
    vessel.remove_maneuver_node()?;
    Ok(())
}

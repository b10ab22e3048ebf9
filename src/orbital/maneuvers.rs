// ---------------------------------------------------------------------------
// Burn planning: vis-viva and the rocket equation
// ---------------------------------------------------------------------------

/// Orbital speed at radius `r` on an orbit with semi-major axis `sma`
/// (vis-viva equation).
pub fn vis_viva_speed(mu: f64, r: f64, sma: f64) -> f64 {
    (mu * (2.0 / r - 1.0 / sma)).sqrt()
}

/// Prograde delta-v needed at radius `r` to turn an orbit with semi-major
/// axis `sma` into a circular orbit of radius `r`.
pub fn circularization_delta_v(mu: f64, r: f64, sma: f64) -> f64 {
    vis_viva_speed(mu, r, r) - vis_viva_speed(mu, r, sma)
}

/// Full-throttle burn duration for `delta_v` from thrust, effective exhaust
/// velocity (Isp · g0, m/s) and ignition mass (rocket equation).
pub fn burn_duration(delta_v: f64, thrust: f64, isp_eff: f64, wet_mass: f64) -> f64 {
    let final_mass = wet_mass / (delta_v / isp_eff).exp();
    let flow_rate = thrust / isp_eff;
    (wet_mass - final_mass) / flow_rate
}

/// Delta-v still available from the propellant on board.
///
/// Returns 0 whenever the mass ratio or the effective Isp would make the
/// logarithm meaningless (wet <= dry, Isp <= 0).
pub fn available_delta_v(wet_mass: f64, dry_mass: f64, isp_eff: f64) -> f64 {
    if wet_mass > dry_mass && isp_eff > 0.0 {
        isp_eff * (wet_mass / dry_mass).ln()
    } else {
        0.0
    }
}

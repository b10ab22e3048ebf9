use crate::orbital::available_delta_v;
use crate::telemetry::TelemetrySample;

// ---------------------------------------------------------------------------
// Simplified ascent model: constant thrust, constant effective Isp
// ---------------------------------------------------------------------------

/// Parameters of the simplified model.
#[derive(Debug, Clone)]
pub struct ModelParams {
    pub initial_mass: f64, // kg at ignition
    pub dry_mass: f64,     // kg floor the integrator may not cross
    pub avg_isp: f64,      // s, averaged effective specific impulse
    pub avg_thrust: f64,   // N, held constant
    pub g0: f64,           // m/s^2
    pub dt: f64,           // s, integration step
}

impl ModelParams {
    /// Build parameters from a recorded log: ignition mass from the first
    /// row, the dry-mass floor from the last. The final recorded mass is an
    /// approximation of the true dry mass, not an independent measurement.
    pub fn from_log(samples: &[TelemetrySample], avg_isp: f64, avg_thrust: f64) -> Option<Self> {
        let first = samples.first()?;
        let last = samples.last()?;
        Some(ModelParams {
            initial_mass: first.mass,
            dry_mass: last.mass,
            avg_isp,
            avg_thrust,
            g0: 9.81,
            dt: 0.1,
        })
    }
}

/// Modeled trajectory, one entry per integration step.
#[derive(Debug, Clone, Default)]
pub struct ModelTrajectory {
    pub times: Vec<f64>,
    pub altitudes: Vec<f64>,
    pub speeds: Vec<f64>,
    pub masses: Vec<f64>,
    pub delta_vs: Vec<f64>,
}

/// Forward-Euler integration of the simplified vertical ascent up to
/// `t_max`. Thrust is applied for the whole window; propellant flow stops at
/// the dry-mass floor, and the delta-v estimate uses the same guarded
/// formula the flight controller logs.
pub fn simulate(params: &ModelParams, t_max: f64) -> ModelTrajectory {
    let mut out = ModelTrajectory::default();
    let isp_eff = params.avg_isp * params.g0;

    let mut t = 0.0;
    let mut altitude = 0.0;
    let mut speed = 0.0;
    let mut mass = params.initial_mass;

    while t <= t_max {
        out.times.push(t);
        out.altitudes.push(altitude);
        out.speeds.push(speed);
        out.masses.push(mass);
        out.delta_vs.push(available_delta_v(mass, params.dry_mass, isp_eff));

        let mut mdot = if mass > params.dry_mass {
            params.avg_thrust / isp_eff
        } else {
            0.0
        };
        // Never integrate through the floor
        if mass - mdot * params.dt < params.dry_mass {
            mdot = (mass - params.dry_mass) / params.dt;
        }

        let accel = if mass > 0.0 {
            params.avg_thrust / mass - params.g0
        } else {
            0.0
        };

        speed += accel * params.dt;
        altitude += speed * params.dt;
        mass = (mass - mdot * params.dt).max(params.dry_mass);
        t += params.dt;
    }

    out
}

/// Linear interpolation of `(xs, ys)` at `x`, extrapolating past the ends.
pub fn interp_linear(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.is_empty() {
        return 0.0;
    }
    if xs.len() == 1 {
        return ys[0];
    }

    let segment = match xs.binary_search_by(|probe| probe.total_cmp(&x)) {
        Ok(i) => return ys[i],
        Err(0) => 0,
        Err(i) if i >= xs.len() => xs.len() - 2,
        Err(i) => i - 1,
    };

    let span = xs[segment + 1] - xs[segment];
    let frac = (x - xs[segment]) / span;
    ys[segment] + frac * (ys[segment + 1] - ys[segment])
}

impl ModelTrajectory {
    /// Resample every quantity onto arbitrary query times.
    pub fn sample_at(&self, query: &[f64]) -> ModelTrajectory {
        let series = |ys: &[f64]| -> Vec<f64> {
            query.iter().map(|&t| interp_linear(&self.times, ys, t)).collect()
        };
        ModelTrajectory {
            times: query.to_vec(),
            altitudes: series(&self.altitudes),
            speeds: series(&self.speeds),
            masses: series(&self.masses),
            delta_vs: series(&self.delta_vs),
        }
    }
}

/// Deviation of the model from the recorded data for one quantity.
#[derive(Debug, Clone)]
pub struct Residual {
    pub quantity: &'static str,
    pub rms: f64,
    pub max_abs: f64,
}

/// Compare a recorded log against the model at the recorded timestamps.
pub fn residuals(samples: &[TelemetrySample], model: &ModelTrajectory) -> Vec<Residual> {
    let times: Vec<f64> = samples.iter().map(|s| s.time).collect();
    let resampled = model.sample_at(&times);

    let stat = |quantity: &'static str, recorded: Vec<f64>, modeled: &[f64]| -> Residual {
        let n = recorded.len().max(1) as f64;
        let mut sum_sq = 0.0;
        let mut max_abs: f64 = 0.0;
        for (r, m) in recorded.iter().zip(modeled) {
            let d = r - m;
            sum_sq += d * d;
            max_abs = max_abs.max(d.abs());
        }
        Residual {
            quantity,
            rms: (sum_sq / n).sqrt(),
            max_abs,
        }
    };

    vec![
        stat(
            "altitude",
            samples.iter().map(|s| s.altitude).collect(),
            &resampled.altitudes,
        ),
        stat(
            "speed",
            samples.iter().map(|s| s.speed).collect(),
            &resampled.speeds,
        ),
        stat(
            "mass",
            samples.iter().map(|s| s.mass).collect(),
            &resampled.masses,
        ),
        stat(
            "delta_v",
            samples.iter().map(|s| s.delta_v).collect(),
            &resampled.delta_vs,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> ModelParams {
        ModelParams {
            initial_mass: 30_000.0,
            dry_mass: 6_000.0,
            avg_isp: 310.0,
            avg_thrust: 430_000.0,
            g0: 9.81,
            dt: 0.1,
        }
    }

    #[test]
    fn mass_never_crosses_the_dry_floor() {
        let p = params();
        let run = simulate(&p, 600.0);
        assert!(run.masses.iter().all(|&m| m >= p.dry_mass - 1e-9));
        // The tank does empty well before the window ends
        assert_relative_eq!(*run.masses.last().unwrap(), p.dry_mass, epsilon = 1e-9);
    }

    #[test]
    fn initial_delta_v_matches_the_controller_formula() {
        let p = params();
        let run = simulate(&p, 1.0);
        let expected = p.avg_isp * p.g0 * (p.initial_mass / p.dry_mass).ln();
        assert_relative_eq!(run.delta_vs[0], expected, max_relative = 1e-12);
    }

    #[test]
    fn delta_v_drains_to_zero_with_the_tank() {
        let p = params();
        let run = simulate(&p, 600.0);
        assert_relative_eq!(*run.delta_vs.last().unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn speed_and_altitude_build_while_thrust_exceeds_weight() {
        let p = params();
        let run = simulate(&p, 30.0);
        assert!(*run.speeds.last().unwrap() > 0.0);
        assert!(*run.altitudes.last().unwrap() > 0.0);
    }

    #[test]
    fn interpolation_hits_midpoints_and_extrapolates() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 10.0, 40.0];
        assert_relative_eq!(interp_linear(&xs, &ys, 0.5), 5.0);
        assert_relative_eq!(interp_linear(&xs, &ys, 1.0), 10.0);
        assert_relative_eq!(interp_linear(&xs, &ys, 1.5), 25.0);
        // Linear extrapolation continues the end segments
        assert_relative_eq!(interp_linear(&xs, &ys, 3.0), 70.0);
        assert_relative_eq!(interp_linear(&xs, &ys, -1.0), -10.0);
    }

    #[test]
    fn model_agrees_with_itself_through_resampling() {
        let p = params();
        let run = simulate(&p, 60.0);

        let samples: Vec<TelemetrySample> = run
            .times
            .iter()
            .enumerate()
            .map(|(i, &t)| TelemetrySample {
                time: t,
                altitude: run.altitudes[i],
                speed: run.speeds[i],
                mass: run.masses[i],
                delta_v: run.delta_vs[i],
            })
            .collect();

        for residual in residuals(&samples, &run) {
            assert!(
                residual.rms < 1e-9,
                "{} rms should vanish, got {}",
                residual.quantity,
                residual.rms
            );
        }
    }

    #[test]
    fn params_from_log_take_the_mass_endpoints() {
        let samples = vec![
            TelemetrySample { time: 0.0, altitude: 0.0, speed: 0.0, mass: 30_000.0, delta_v: 0.0 },
            TelemetrySample { time: 9.0, altitude: 900.0, speed: 200.0, mass: 21_000.0, delta_v: 0.0 },
        ];
        let p = ModelParams::from_log(&samples, 310.0, 430_000.0).unwrap();
        assert_eq!(p.initial_mass, 30_000.0);
        assert_eq!(p.dry_mass, 21_000.0);
        assert!(ModelParams::from_log(&[], 310.0, 430_000.0).is_none());
    }
}

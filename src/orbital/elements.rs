use std::f64::consts::{PI, TAU};

use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// In-plane orbit geometry from a state vector
// ---------------------------------------------------------------------------

/// In-plane elements of the current trajectory around a point-mass primary.
#[derive(Debug, Clone, Copy)]
pub struct Orbit {
    pub sma: f64,       // semi-major axis, m
    pub ecc: f64,       // eccentricity (0 = circular)
    pub true_anom: f64, // true anomaly, rad, in [0, 2π)
    pub mu: f64,        // gravitational parameter, m^3/s^2
}

impl Orbit {
    /// Extract elements from an inertial position/velocity pair.
    pub fn from_state_vector(pos: &Vector3<f64>, vel: &Vector3<f64>, mu: f64) -> Self {
        let r = pos.norm();
        let v = vel.norm();

        // Semi-major axis from specific orbital energy
        let energy = 0.5 * v * v - mu / r;
        let sma = -mu / (2.0 * energy);

        // Eccentricity vector
        let e_vec = ((v * v - mu / r) * pos - pos.dot(vel) * vel) / mu;
        let ecc = e_vec.norm();

        // True anomaly, measured from periapsis
        let true_anom = if ecc > 1e-10 {
            let cos_nu = (e_vec.dot(pos) / (ecc * r)).clamp(-1.0, 1.0);
            let nu = cos_nu.acos();
            if pos.dot(vel) < 0.0 {
                TAU - nu
            } else {
                nu
            }
        } else {
            0.0
        };

        Orbit {
            sma,
            ecc,
            true_anom,
            mu,
        }
    }

    pub fn apoapsis_radius(&self) -> f64 {
        self.sma * (1.0 + self.ecc)
    }

    pub fn periapsis_radius(&self) -> f64 {
        self.sma * (1.0 - self.ecc)
    }

    /// Orbital period of an elliptical orbit, s.
    pub fn period(&self) -> f64 {
        TAU * (self.sma.powi(3) / self.mu).sqrt()
    }

    /// Mean motion, rad/s.
    fn mean_motion(&self) -> f64 {
        (self.mu / self.sma.powi(3)).sqrt()
    }

    /// Mean anomaly via the eccentric anomaly, rad in [0, 2π).
    fn mean_anomaly(&self) -> f64 {
        let e = self.ecc.min(0.999_999);
        let tan_half = ((1.0 - e) / (1.0 + e)).sqrt() * (self.true_anom / 2.0).tan();
        let ecc_anom = 2.0 * tan_half.atan();
        (ecc_anom - e * ecc_anom.sin()).rem_euclid(TAU)
    }

    /// Time until the next apoapsis passage, s.
    pub fn time_to_apoapsis(&self) -> f64 {
        (PI - self.mean_anomaly()).rem_euclid(TAU) / self.mean_motion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const MU: f64 = 3.5316e12;

    #[test]
    fn circular_orbit_roundtrip() {
        let r = 700_000.0;
        let v = (MU / r).sqrt();
        let orbit = Orbit::from_state_vector(
            &Vector3::new(r, 0.0, 0.0),
            &Vector3::new(0.0, 0.0, v),
            MU,
        );

        assert_relative_eq!(orbit.sma, r, epsilon = 1.0);
        assert!(orbit.ecc < 1e-6, "orbit should be circular, ecc = {}", orbit.ecc);
        assert_relative_eq!(orbit.apoapsis_radius(), r, epsilon = 1.0);
        assert_relative_eq!(orbit.periapsis_radius(), r, epsilon = 1.0);
    }

    #[test]
    fn elliptic_apsides_from_periapsis_state() {
        // Periapsis at 650 km radius, apoapsis raised by excess speed
        let r_peri = 650_000.0;
        let v_circ = (MU / r_peri).sqrt();
        let v = 1.1 * v_circ;
        let orbit = Orbit::from_state_vector(
            &Vector3::new(r_peri, 0.0, 0.0),
            &Vector3::new(0.0, 0.0, v),
            MU,
        );

        assert_relative_eq!(orbit.periapsis_radius(), r_peri, epsilon = 10.0);
        assert!(orbit.apoapsis_radius() > r_peri);

        // Vis-viva consistency at apoapsis
        let r_apo = orbit.apoapsis_radius();
        let v_apo = (MU * (2.0 / r_apo - 1.0 / orbit.sma)).sqrt();
        // Angular momentum is conserved between the apsides
        assert_relative_eq!(r_peri * v, r_apo * v_apo, max_relative = 1e-9);
    }

    #[test]
    fn half_period_from_periapsis_to_apoapsis() {
        let r_peri = 650_000.0;
        let v = 1.1 * (MU / r_peri).sqrt();
        let orbit = Orbit::from_state_vector(
            &Vector3::new(r_peri, 0.0, 0.0),
            &Vector3::new(0.0, 0.0, v),
            MU,
        );

        assert_relative_eq!(
            orbit.time_to_apoapsis(),
            orbit.period() / 2.0,
            max_relative = 1e-6
        );
    }

    #[test]
    fn time_to_apoapsis_shrinks_on_the_way_up() {
        let r_peri = 650_000.0;
        let v = 1.1 * (MU / r_peri).sqrt();
        let at_peri = Orbit::from_state_vector(
            &Vector3::new(r_peri, 0.0, 0.0),
            &Vector3::new(0.0, 0.0, v),
            MU,
        );

        // A state a quarter of an anomaly later, rebuilt from geometry
        let later = Orbit {
            true_anom: PI / 2.0,
            ..at_peri
        };
        assert!(later.time_to_apoapsis() < at_peri.time_to_apoapsis());
    }

    #[test]
    fn leo_period_magnitude() {
        let r = 700_000.0;
        let v = (MU / r).sqrt();
        let orbit = Orbit::from_state_vector(
            &Vector3::new(r, 0.0, 0.0),
            &Vector3::new(0.0, 0.0, v),
            MU,
        );
        // 2π sqrt(r^3 / mu) is a bit over half an hour here
        assert!(orbit.period() > 1_800.0 && orbit.period() < 2_200.0);
    }
}

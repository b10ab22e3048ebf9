use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

/// Standard gravity the game uses to convert specific impulse to exhaust
/// velocity, m/s^2.
pub const G0: f64 = 9.82;

// ---------------------------------------------------------------------------
// Celestial body
// ---------------------------------------------------------------------------

/// The body the vehicle launches from and orbits.
#[derive(Debug, Clone)]
pub struct Body {
    pub name: String,
    pub mu: f64,                // gravitational parameter, m^3/s^2
    pub radius: f64,            // mean radius, m
    pub rotational_period: f64, // sidereal rotation period, s
}

impl Body {
    /// The home world: 600 km radius, ~9.81 m/s^2 at sea level.
    pub fn kerbin() -> Self {
        Body {
            name: "Kerbin".into(),
            mu: 3.5316e12,
            radius: 600_000.0,
            rotational_period: 21_549.425,
        }
    }

    pub fn surface_gravity(&self) -> f64 {
        self.mu / (self.radius * self.radius)
    }

    /// Point-mass gravitational acceleration at an inertial position.
    pub fn gravity_accel(&self, pos: &Vector3<f64>) -> Vector3<f64> {
        let r = pos.norm();
        if r < 1.0 {
            return Vector3::zeros();
        }
        -self.mu / (r * r * r) * pos
    }

    /// Rotation angle of the body at a given universal time, rad.
    pub fn rotation_angle(&self, ut: f64) -> f64 {
        std::f64::consts::TAU * ut / self.rotational_period
    }
}

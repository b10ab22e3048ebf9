// ---------------------------------------------------------------------------
// Vehicle description: mass blocks and a staging plan
// ---------------------------------------------------------------------------

/// Mass of one unit of liquid fuel, kg.
pub const FUEL_UNIT_MASS: f64 = 5.0;

/// One rigid piece of the stack: tankage, an optional engine, and the
/// decouple stage its resources are reported under.
#[derive(Debug, Clone)]
pub struct Block {
    pub name: String,
    pub dry_mass: f64,              // kg
    pub fuel: f64,                  // units
    pub thrust: f64,                // N at full throttle, 0 for inert blocks
    pub isp: f64,                   // s, vacuum
    pub decouple_stage: Option<u8>, // stage number for resource queries
}

impl Block {
    pub fn wet_mass(&self) -> f64 {
        self.dry_mass + self.fuel * FUEL_UNIT_MASS
    }

    pub fn has_engine(&self) -> bool {
        self.thrust > 0.0
    }
}

// ---------------------------------------------------------------------------
// Block builder
// ---------------------------------------------------------------------------

pub struct BlockBuilder {
    name: String,
    dry_mass: f64,
    fuel: f64,
    thrust: f64,
    isp: f64,
    decouple_stage: Option<u8>,
}

impl BlockBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dry_mass: 1_000.0,
            fuel: 0.0,
            thrust: 0.0,
            isp: 0.0,
            decouple_stage: None,
        }
    }

    pub fn dry_mass(mut self, v: f64) -> Self { self.dry_mass = v; self }
    pub fn fuel(mut self, v: f64) -> Self { self.fuel = v; self }
    pub fn thrust(mut self, v: f64) -> Self { self.thrust = v; self }
    pub fn isp(mut self, v: f64) -> Self { self.isp = v; self }
    pub fn decouple_stage(mut self, v: u8) -> Self { self.decouple_stage = Some(v); self }

    pub fn build(self) -> Block {
        Block {
            name: self.name,
            dry_mass: self.dry_mass,
            fuel: self.fuel,
            thrust: self.thrust,
            isp: self.isp,
            decouple_stage: self.decouple_stage,
        }
    }
}

// ---------------------------------------------------------------------------
// Staging plan
// ---------------------------------------------------------------------------

/// What one staging command does.
#[derive(Debug, Clone)]
pub enum StagingAction {
    /// Start the engines of the named blocks.
    Ignite(Vec<String>),
    /// Separate the named block from the stack.
    Jettison(String),
}

/// Complete launch vehicle: blocks plus the ordered staging plan.
#[derive(Debug, Clone)]
pub struct VehicleSpec {
    pub name: String,
    pub blocks: Vec<Block>,
    pub staging: Vec<StagingAction>,
}

impl VehicleSpec {
    pub fn wet_mass(&self) -> f64 {
        self.blocks.iter().map(Block::wet_mass).sum()
    }

    pub fn dry_mass(&self) -> f64 {
        self.blocks.iter().map(|b| b.dry_mass).sum()
    }
}

// ---------------------------------------------------------------------------
// Preset vehicles
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// Three sequential booster banks around a core stage, a payload fairing
    /// and a small satellite with its own circularization engine. The banks
    /// run dry in decouple-stage order 6, 5, 4.
    pub fn satellite_lifter() -> VehicleSpec {
        VehicleSpec {
            name: "Kerbal-M".into(),
            blocks: vec![
                BlockBuilder::new("stage-6-boosters")
                    .dry_mass(900.0)
                    .fuel(500.0)
                    .thrust(100_000.0)
                    .isp(280.0)
                    .decouple_stage(6)
                    .build(),
                BlockBuilder::new("stage-5-boosters")
                    .dry_mass(1_100.0)
                    .fuel(700.0)
                    .thrust(100_000.0)
                    .isp(285.0)
                    .decouple_stage(5)
                    .build(),
                BlockBuilder::new("stage-4-boosters")
                    .dry_mass(1_300.0)
                    .fuel(900.0)
                    .thrust(100_000.0)
                    .isp(290.0)
                    .decouple_stage(4)
                    .build(),
                BlockBuilder::new("core")
                    .dry_mass(2_600.0)
                    .fuel(3_000.0)
                    .thrust(160_000.0)
                    .isp(320.0)
                    .build(),
                BlockBuilder::new("fairing").dry_mass(350.0).build(),
                BlockBuilder::new("satellite")
                    .dry_mass(1_050.0)
                    .fuel(300.0)
                    .thrust(24_000.0)
                    .isp(345.0)
                    .build(),
            ],
            staging: vec![
                StagingAction::Ignite(vec![
                    "stage-6-boosters".into(),
                    "stage-5-boosters".into(),
                    "stage-4-boosters".into(),
                    "core".into(),
                ]),
                StagingAction::Jettison("stage-6-boosters".into()),
                StagingAction::Jettison("stage-5-boosters".into()),
                StagingAction::Jettison("stage-4-boosters".into()),
                StagingAction::Jettison("fairing".into()),
                StagingAction::Jettison("core".into()),
                StagingAction::Ignite(vec!["satellite".into()]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wet_mass_includes_fuel() {
        let block = BlockBuilder::new("tank").dry_mass(100.0).fuel(10.0).build();
        assert_eq!(block.wet_mass(), 100.0 + 10.0 * FUEL_UNIT_MASS);
        assert!(!block.has_engine());
    }

    #[test]
    fn preset_lifts_off() {
        let spec = presets::satellite_lifter();
        let StagingAction::Ignite(first) = &spec.staging[0] else {
            panic!("first staging action must be ignition");
        };

        let liftoff_thrust: f64 = spec
            .blocks
            .iter()
            .filter(|b| first.contains(&b.name))
            .map(|b| b.thrust)
            .sum();
        let weight = spec.wet_mass() * 9.81;
        assert!(
            liftoff_thrust > 1.2 * weight,
            "thrust-to-weight {:.2} too low to fly the turn",
            liftoff_thrust / weight
        );
    }

    #[test]
    fn preset_booster_banks_drain_in_stage_order() {
        let spec = presets::satellite_lifter();
        let burn_secs = |stage: u8| -> f64 {
            let b = spec
                .blocks
                .iter()
                .find(|b| b.decouple_stage == Some(stage))
                .unwrap();
            let flow = b.thrust / (b.isp * crate::physics::G0);
            b.fuel * FUEL_UNIT_MASS / flow
        };
        assert!(burn_secs(6) < burn_secs(5));
        assert!(burn_secs(5) < burn_secs(4));
    }
}

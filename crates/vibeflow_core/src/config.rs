//! Parameter ranges offered to the UI, one table per module.
//!
//! Every kernel accepts any value inside these ranges. Defaults match the
//! `Default` impls of the corresponding parameter structs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SliderRange {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl SliderRange {
    const fn new(
        name: &'static str,
        label: &'static str,
        min: f64,
        max: f64,
        step: f64,
        default: f64,
    ) -> Self {
        Self {
            name,
            label,
            min,
            max,
            step,
            default,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    MassSpringDamper,
    PidTuning,
    Isolation,
    TwoDofModes,
}

pub const MASS_SPRING_DAMPER: &[SliderRange] = &[
    SliderRange::new("mass", "Mass m [kg]", 0.1, 10.0, 0.1, 1.0),
    SliderRange::new("stiffness", "Stiffness k [N/m]", 10.0, 2000.0, 10.0, 200.0),
    SliderRange::new("damping_ratio", "Damping ratio ζ", 0.0, 1.0, 0.01, 0.08),
    SliderRange::new("amplitude", "F0 [N]", 0.0, 50.0, 0.5, 5.0),
    SliderRange::new("frequency", "ω [rad/s] (for sine)", 0.0, 80.0, 0.5, 15.0),
    SliderRange::new("x0", "x(0) [m]", -0.1, 0.1, 0.005, 0.0),
    SliderRange::new("v0", "ẋ(0) [m/s]", -0.5, 0.5, 0.01, 0.0),
    SliderRange::new("duration", "Simulation time [s]", 2.0, 30.0, 1.0, 10.0),
];

pub const PID_TUNING: &[SliderRange] = &[
    SliderRange::new("mass", "Mass m [kg]", 0.1, 10.0, 0.1, 1.5),
    SliderRange::new("stiffness", "Stiffness k [N/m]", 10.0, 2000.0, 10.0, 180.0),
    SliderRange::new("damping_ratio", "Damping ratio ζ", 0.0, 1.0, 0.01, 0.1),
    SliderRange::new("kp", "Kp", 0.0, 50.0, 0.1, 10.0),
    SliderRange::new("ki", "Ki", 0.0, 50.0, 0.1, 1.5),
    SliderRange::new("kd", "Kd", 0.0, 10.0, 0.05, 0.8),
    SliderRange::new("duration", "Sim time [s]", 2.0, 30.0, 1.0, 12.0),
];

pub const ISOLATION: &[SliderRange] = &[
    SliderRange::new("zeta", "Damping ratio ζ", 0.0, 0.9, 0.01, 0.08),
    SliderRange::new("r_max", "Frequency ratio range (max r=ω/ωn)", 2.0, 10.0, 0.5, 5.0),
];

pub const TWO_DOF_MODES: &[SliderRange] = &[
    SliderRange::new("m1", "m1 [kg]", 0.1, 10.0, 0.1, 1.0),
    SliderRange::new("m2", "m2 [kg]", 0.1, 10.0, 0.1, 1.0),
    SliderRange::new("k1", "k1 [N/m]", 10.0, 2000.0, 10.0, 200.0),
    SliderRange::new("k2", "k2 [N/m]", 10.0, 2000.0, 10.0, 300.0),
];

pub fn ranges(module: Module) -> &'static [SliderRange] {
    match module {
        Module::MassSpringDamper => MASS_SPRING_DAMPER,
        Module::PidTuning => PID_TUNING,
        Module::Isolation => ISOLATION,
        Module::TwoDofModes => TWO_DOF_MODES,
    }
}

pub fn range(module: Module, name: &str) -> Option<&'static SliderRange> {
    ranges(module).iter().find(|r| r.name == name)
}

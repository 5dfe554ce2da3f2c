//! Transmissibility of a base-excited single-DOF isolator.
//!
//! `T(r, ζ) = sqrt((1 + (2ζr)²) / ((1 − r²)² + (2ζr)²))` with `r = ω/ωₙ`.
//! At ζ = 0, r = 1 the denominator vanishes and the curve is infinite.

use crate::error::{
    require_damping_ratio, require_finite, require_non_negative, require_positive, KernelError,
};
use crate::grid::linspace;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};

/// Frequency ratio above which every damping level isolates (T < 1).
pub const ISOLATION_RATIO: f64 = SQRT_2;

/// Base excitation frequency of the isolator animation (3 Hz).
pub const BASE_FREQUENCY: f64 = 6.0 * PI;

pub const DEFAULT_POINTS: usize = 1000;
pub const DEFAULT_DOMAIN: (f64, f64) = (0.01, 5.0);

pub fn transmissibility(r: f64, zeta: f64) -> f64 {
    let damping_term = (2.0 * zeta * r).powi(2);
    let stiffness_term = (1.0 - r * r).powi(2);
    ((1.0 + damping_term) / (stiffness_term + damping_term)).sqrt()
}

/// Phase by which the mass lags the base, in `[0, π]`.
pub fn phase_lag(r: f64, zeta: f64) -> f64 {
    let two_zeta_r = 2.0 * zeta * r;
    (two_zeta_r * r * r).atan2(1.0 - r * r + two_zeta_r * two_zeta_r)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub r: f64,
    pub transmissibility: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationCurve {
    pub zeta: f64,
    pub r: Vec<f64>,
    pub transmissibility: Vec<f64>,
    pub isolation_ratio: f64,
}

impl IsolationCurve {
    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = CurvePoint> + '_ {
        self.r
            .iter()
            .zip(&self.transmissibility)
            .map(|(&r, &transmissibility)| CurvePoint { r, transmissibility })
    }

    /// Sample with the largest transmissibility; an undamped resonance hit wins.
    pub fn peak(&self) -> Option<CurvePoint> {
        self.points().fold(None, |best: Option<CurvePoint>, p| match best {
            Some(b) if b.transmissibility >= p.transmissibility => Some(b),
            _ => Some(p),
        })
    }

    /// Ratios at which the isolator attenuates (T < 1).
    pub fn isolating(&self) -> Vec<f64> {
        self.points()
            .filter(|p| p.transmissibility < 1.0)
            .map(|p| p.r)
            .collect()
    }
}

pub fn evaluate_transmissibility(
    zeta: f64,
    r_domain: (f64, f64),
    n_points: usize,
) -> Result<IsolationCurve, KernelError> {
    require_damping_ratio(zeta)?;
    let (r_min, r_max) = r_domain;
    require_non_negative("r_min", r_min)?;
    require_finite("r_max", r_max)?;
    if r_max <= r_min {
        return Err(KernelError::InvalidParameter {
            name: "r_max",
            value: r_max,
            reason: "must exceed r_min",
        });
    }
    if n_points < 2 {
        return Err(KernelError::InvalidParameter {
            name: "n_points",
            value: n_points as f64,
            reason: "at least two points are required",
        });
    }

    let r = linspace(r_min, r_max, n_points);
    let transmissibility = r.iter().map(|&ri| transmissibility(ri, zeta)).collect();
    Ok(IsolationCurve {
        zeta,
        r,
        transmissibility,
        isolation_ratio: ISOLATION_RATIO,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseExcitationFrame {
    pub t: f64,
    pub base: f64,
    pub mass: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseExcitationParams {
    pub zeta: f64,
    pub r: f64,
    pub base_amplitude: f64,
    pub duration: f64,
    pub samples: usize,
    pub stride: usize,
}

impl Default for BaseExcitationParams {
    fn default() -> Self {
        Self {
            zeta: 0.08,
            r: 3.0,
            base_amplitude: 0.02,
            duration: 6.0,
            samples: 300,
            stride: 3,
        }
    }
}

/// Steady-state motion of base and isolated mass for frame-based playback.
///
/// The base moves as `A·sin(ω_b t)`; the mass follows with amplitude
/// `T(r, ζ)·A` and the model's phase lag.
pub fn base_excitation_frames(
    params: &BaseExcitationParams,
) -> Result<Vec<BaseExcitationFrame>, KernelError> {
    require_damping_ratio(params.zeta)?;
    require_non_negative("r", params.r)?;
    require_non_negative("base_amplitude", params.base_amplitude)?;
    require_positive("duration", params.duration)?;
    if params.samples < 2 {
        return Err(KernelError::InvalidParameter {
            name: "samples",
            value: params.samples as f64,
            reason: "at least two samples are required",
        });
    }

    let gain = transmissibility(params.r, params.zeta);
    if !gain.is_finite() {
        return Err(KernelError::InvalidParameter {
            name: "r",
            value: params.r,
            reason: "undamped resonance has no steady state",
        });
    }
    let lag = phase_lag(params.r, params.zeta);
    let amplitude = params.base_amplitude;

    Ok(linspace(0.0, params.duration, params.samples)
        .into_iter()
        .step_by(params.stride.max(1))
        .map(|t| BaseExcitationFrame {
            t,
            base: amplitude * (BASE_FREQUENCY * t).sin(),
            mass: gain * amplitude * (BASE_FREQUENCY * t - lag).sin(),
        })
        .collect())
}

//! Natural frequencies and mode shapes of two masses on a spring chain.
//!
//! Ground -k1- m1 -k2- m2, giving `M = diag(m1, m2)` and
//! `K = [[k1 + k2, −k2], [−k2, k2]]`. The generalized problem `Kφ = ω²Mφ` is
//! reduced to the symmetric `M^{-1/2} K M^{-1/2} ψ = ω²ψ` with `φ = M^{-1/2}ψ`.

use crate::error::{require_positive, KernelError};
use crate::grid::linspace;
use log::warn;
use nalgebra::{Matrix2, SymmetricEigen, Vector2, U2};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Relative size below which a negative eigenvalue is treated as round-off.
const EIGEN_NOISE: f64 = 1e-10;

/// Horizontal gap between the two masses in the mode animation.
pub const DEFAULT_OFFSET: f64 = 1.5;
pub const DEFAULT_FRAMES: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoDofSystem {
    pub m1: f64,
    pub m2: f64,
    pub k1: f64,
    pub k2: f64,
}

impl Default for TwoDofSystem {
    fn default() -> Self {
        Self {
            m1: 1.0,
            m2: 1.0,
            k1: 200.0,
            k2: 300.0,
        }
    }
}

impl TwoDofSystem {
    pub fn mass_matrix(&self) -> Matrix2<f64> {
        Matrix2::from_diagonal(&Vector2::new(self.m1, self.m2))
    }

    pub fn stiffness_matrix(&self) -> Matrix2<f64> {
        Matrix2::new(self.k1 + self.k2, -self.k2, -self.k2, self.k2)
    }

    pub fn validate(&self) -> Result<(), KernelError> {
        require_positive("m1", self.m1)?;
        require_positive("m2", self.m2)?;
        require_positive("k1", self.k1)?;
        require_positive("k2", self.k2)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mode {
    /// ω in rad/s.
    pub natural_frequency: f64,
    /// ω², after round-off clamping.
    pub eigenvalue: f64,
    /// Displacement of (m1, m2), scaled so the larger magnitude is 1.
    pub shape: [f64; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeFrame {
    pub phase: f64,
    pub x1: f64,
    pub x2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModalResult {
    /// Sorted by ascending natural frequency.
    pub modes: [Mode; 2],
}

impl ModalResult {
    pub fn frequencies(&self) -> [f64; 2] {
        [self.modes[0].natural_frequency, self.modes[1].natural_frequency]
    }

    /// One period of harmonic motion in a single mode.
    ///
    /// Mass 2 is drawn `offset` to the right of mass 1 so the markers never
    /// overlap; the offset has no physical meaning.
    pub fn animation(
        &self,
        mode: usize,
        frames: usize,
        offset: f64,
    ) -> Result<Vec<ModeFrame>, KernelError> {
        let shape = self
            .modes
            .get(mode)
            .ok_or(KernelError::InvalidParameter {
                name: "mode",
                value: mode as f64,
                reason: "a two-DOF system has modes 0 and 1",
            })?
            .shape;
        if frames < 2 {
            return Err(KernelError::InvalidParameter {
                name: "frames",
                value: frames as f64,
                reason: "at least two frames are required",
            });
        }

        Ok(linspace(0.0, TAU, frames)
            .into_iter()
            .map(|phase| {
                let amp = phase.sin();
                ModeFrame {
                    phase,
                    x1: shape[0] * amp,
                    x2: shape[1] * amp + offset,
                }
            })
            .collect())
    }
}

pub fn solve_two_dof_modes(system: &TwoDofSystem) -> Result<ModalResult, KernelError> {
    system.validate()?;
    solve_modes(&Vector2::new(system.m1, system.m2), &system.stiffness_matrix())
}

/// Modes of `Kφ = ω²Mφ` for a lumped mass matrix `M = diag(masses)` and a
/// symmetric `stiffness`.
pub fn solve_modes(
    masses: &Vector2<f64>,
    stiffness: &Matrix2<f64>,
) -> Result<ModalResult, KernelError> {
    for (name, m) in [("m1", masses[0]), ("m2", masses[1])] {
        require_positive(name, m)?;
    }
    let inv_sqrt = Matrix2::from_diagonal(&masses.map(|m| 1.0 / m.sqrt()));
    let reduced = inv_sqrt * stiffness * inv_sqrt;
    let eigen = SymmetricEigen::new(reduced);

    let scale = eigen
        .eigenvalues
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(f64::MIN_POSITIVE);

    let mut modes = [
        build_mode(&eigen, &inv_sqrt, 0, scale)?,
        build_mode(&eigen, &inv_sqrt, 1, scale)?,
    ];
    modes.sort_by(|a, b| a.natural_frequency.total_cmp(&b.natural_frequency));

    Ok(ModalResult { modes })
}

/// Zeroes a negative eigenvalue within `EIGEN_NOISE · scale` of zero; a more
/// negative one means the stiffness is not positive semi-definite.
fn clamp_eigenvalue(lambda: f64, scale: f64) -> Result<f64, KernelError> {
    if lambda >= 0.0 {
        Ok(lambda)
    } else if -lambda <= EIGEN_NOISE * scale {
        warn!("clamping eigenvalue {lambda:e} to zero");
        Ok(0.0)
    } else {
        Err(KernelError::UnstableSystem { eigenvalue: lambda })
    }
}

fn build_mode(
    eigen: &SymmetricEigen<f64, U2>,
    inv_sqrt: &Matrix2<f64>,
    index: usize,
    scale: f64,
) -> Result<Mode, KernelError> {
    let eigenvalue = clamp_eigenvalue(eigen.eigenvalues[index], scale)?;
    let psi: Vector2<f64> = eigen.eigenvectors.column(index).into_owned();
    let phi = inv_sqrt * psi;
    Ok(Mode {
        natural_frequency: eigenvalue.sqrt(),
        eigenvalue,
        shape: normalize_shape([phi[0], phi[1]]),
    })
}

/// Orients the first non-negligible component positive, then scales the
/// largest magnitude to 1. Relative signs between components are kept.
fn normalize_shape(shape: [f64; 2]) -> [f64; 2] {
    let max_abs = shape[0].abs().max(shape[1].abs());
    if max_abs == 0.0 {
        return shape;
    }
    let lead = shape
        .iter()
        .copied()
        .find(|c| c.abs() > 1e-12 * max_abs)
        .unwrap_or(max_abs);
    let sign = if lead < 0.0 { -1.0 } else { 1.0 };
    shape.map(|c| sign * c / max_abs)
}

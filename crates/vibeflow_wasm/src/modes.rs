//! Two-DOF modes bindings.

use crate::shared::{error_to_js, init, to_js};
use anyhow::Context;
use vibeflow_core::modal::{
    solve_two_dof_modes as core_solve, ModalResult, ModeFrame, TwoDofSystem,
};
use wasm_bindgen::prelude::*;

pub(crate) fn run_modes(system: &TwoDofSystem) -> anyhow::Result<ModalResult> {
    core_solve(system).context("Modal analysis failed")
}

pub(crate) fn run_mode_animation(
    system: &TwoDofSystem,
    mode: usize,
    frames: usize,
    offset: f64,
) -> anyhow::Result<Vec<ModeFrame>> {
    run_modes(system)?
        .animation(mode, frames, offset)
        .context("Mode animation failed")
}

/// Natural frequencies (ascending) and max-normalized mode shapes.
#[wasm_bindgen]
pub fn solve_two_dof_modes(m1: f64, m2: f64, k1: f64, k2: f64) -> Result<JsValue, JsValue> {
    init();
    let result = run_modes(&TwoDofSystem { m1, m2, k1, k2 }).map_err(error_to_js)?;
    to_js(&result)
}

#[wasm_bindgen]
pub fn mode_animation(
    m1: f64,
    m2: f64,
    k1: f64,
    k2: f64,
    mode: u32,
    frames: u32,
    offset: f64,
) -> Result<JsValue, JsValue> {
    init();
    let system = TwoDofSystem { m1, m2, k1, k2 };
    let frames = run_mode_animation(&system, mode as usize, frames as usize, offset)
        .map_err(error_to_js)?;
    to_js(&frames)
}

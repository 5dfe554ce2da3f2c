//! PID tuning lab bindings.

use crate::shared::{error_to_js, init, params_from_js, to_js};
use anyhow::Context;
use serde::Serialize;
use vibeflow_core::pid::{simulate_pid_loop as core_simulate, Metrics, PidParams, PidTrace};
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
pub(crate) struct PidPayload {
    trace: PidTrace,
    metrics: Metrics,
}

pub(crate) fn run_pid(params: &PidParams) -> anyhow::Result<PidPayload> {
    let (trace, metrics) = core_simulate(params).context("PID simulation failed")?;
    Ok(PidPayload { trace, metrics })
}

/// Closed-loop unit step response; `metrics.settling_time` is absent when
/// the output never enters the settling band.
#[wasm_bindgen]
pub fn simulate_pid_loop(params: JsValue) -> Result<JsValue, JsValue> {
    init();
    let params: PidParams = params_from_js(params)?;
    let payload = run_pid(&params).map_err(error_to_js)?;
    to_js(&payload)
}

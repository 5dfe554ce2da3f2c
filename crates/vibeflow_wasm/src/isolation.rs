//! Isolation designer bindings.

use crate::shared::{error_to_js, init, params_from_js, to_js};
use anyhow::Context;
use js_sys::Float64Array;
use serde::Serialize;
use vibeflow_core::transmissibility::{
    base_excitation_frames, evaluate_transmissibility as core_evaluate, transmissibility,
    BaseExcitationFrame, BaseExcitationParams, CurvePoint, IsolationCurve,
};
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
pub(crate) struct IsolationPayload {
    curve: IsolationCurve,
    peak: Option<CurvePoint>,
}

pub(crate) fn run_isolation(
    zeta: f64,
    r_min: f64,
    r_max: f64,
    n_points: usize,
) -> anyhow::Result<IsolationPayload> {
    let curve = core_evaluate(zeta, (r_min, r_max), n_points)
        .context("Transmissibility evaluation failed")?;
    let peak = curve.peak();
    Ok(IsolationPayload { curve, peak })
}

pub(crate) fn run_base_excitation(
    params: &BaseExcitationParams,
) -> anyhow::Result<Vec<BaseExcitationFrame>> {
    base_excitation_frames(params).context("Base excitation animation failed")
}

/// Transmissibility curve over `n_points` ratios from `r_min` to `r_max`.
/// An undamped curve that samples r = 1 contains `Infinity`.
#[wasm_bindgen]
pub fn evaluate_transmissibility(
    zeta: f64,
    r_min: f64,
    r_max: f64,
    n_points: u32,
) -> Result<JsValue, JsValue> {
    init();
    let payload = run_isolation(zeta, r_min, r_max, n_points as usize).map_err(error_to_js)?;
    to_js(&payload)
}

/// Elementwise transmissibility for caller-chosen ratios.
#[wasm_bindgen]
pub fn transmissibility_values(zeta: f64, ratios: Vec<f64>) -> Float64Array {
    let values: Vec<f64> = ratios.iter().map(|&r| transmissibility(r, zeta)).collect();
    Float64Array::from(values.as_slice())
}

#[wasm_bindgen]
pub fn base_excitation(params: JsValue) -> Result<JsValue, JsValue> {
    init();
    let params: BaseExcitationParams = params_from_js(params)?;
    let frames = run_base_excitation(&params).map_err(error_to_js)?;
    to_js(&frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibeflow_core::transmissibility::{DEFAULT_DOMAIN, DEFAULT_POINTS, ISOLATION_RATIO};

    #[test]
    fn payload_reports_resonance_peak() {
        let payload = run_isolation(0.08, DEFAULT_DOMAIN.0, DEFAULT_DOMAIN.1, DEFAULT_POINTS)
            .expect("payload");
        assert_eq!(payload.curve.len(), DEFAULT_POINTS);
        assert_eq!(payload.curve.isolation_ratio, ISOLATION_RATIO);
        let peak = payload.peak.expect("peak");
        assert!((peak.r - 1.0).abs() < 0.02, "peak at r = {}", peak.r);
    }

    #[test]
    fn inverted_domain_is_an_error() {
        let err = run_isolation(0.1, 3.0, 1.0, 100)
            .err()
            .expect("inverted domain should fail");
        assert!(format!("{err:#}").contains("r_max"));
    }

    #[test]
    fn base_excitation_defaults_produce_frames() {
        let frames = run_base_excitation(&BaseExcitationParams::default()).expect("frames");
        assert_eq!(frames.len(), 100);
    }
}

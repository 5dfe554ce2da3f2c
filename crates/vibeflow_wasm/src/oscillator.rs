//! Mass–spring–damper explorer bindings.

use crate::shared::{error_to_js, init, params_from_js, to_js};
use anyhow::Context;
use serde::Serialize;
use vibeflow_core::oscillator::{
    simulate_oscillator as core_simulate, AnimationFrame, OscillatorParams, TimeSeries,
};
use wasm_bindgen::prelude::*;

/// Frame stride used when the caller passes 0.
const DEFAULT_FRAME_STRIDE: usize = 8;

#[derive(Serialize)]
pub(crate) struct OscillatorPayload {
    natural_frequency: f64,
    damping_coefficient: f64,
    series: TimeSeries,
    frames: Vec<AnimationFrame>,
}

pub(crate) fn run_oscillator(
    params: &OscillatorParams,
    frame_stride: usize,
) -> anyhow::Result<OscillatorPayload> {
    let series = core_simulate(params).context("Oscillator simulation failed")?;
    let stride = if frame_stride == 0 {
        DEFAULT_FRAME_STRIDE
    } else {
        frame_stride
    };
    let frames = series.animation_frames(stride);
    Ok(OscillatorPayload {
        natural_frequency: params.natural_frequency(),
        damping_coefficient: params.damping_coefficient(),
        series,
        frames,
    })
}

#[wasm_bindgen]
pub fn simulate_oscillator(params: JsValue, frame_stride: u32) -> Result<JsValue, JsValue> {
    init();
    let params: OscillatorParams = params_from_js(params)?;
    let payload = run_oscillator(&params, frame_stride as usize).map_err(error_to_js)?;
    to_js(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibeflow_core::oscillator::DEFAULT_SAMPLES;

    #[test]
    fn payload_carries_series_and_frames() {
        let payload = run_oscillator(&OscillatorParams::default(), 0).expect("payload");
        assert_eq!(payload.series.len(), DEFAULT_SAMPLES);
        assert_eq!(payload.frames.len(), DEFAULT_SAMPLES / DEFAULT_FRAME_STRIDE);
        assert!((payload.natural_frequency - 200.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn kernel_errors_gain_context() {
        let params = OscillatorParams {
            mass: -1.0,
            ..OscillatorParams::default()
        };
        let err = run_oscillator(&params, 8)
            .err()
            .expect("negative mass should fail");
        let message = format!("{err:#}");
        assert!(message.starts_with("Oscillator simulation failed"), "{message}");
        assert!(message.contains("mass"), "{message}");
    }
}

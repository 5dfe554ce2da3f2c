//! Single-DOF mass–spring–damper under free, step or sinusoidal forcing.
//!
//! Integrates `m·ẍ + c·ẋ + k·x = F(t)` with the adaptive Tsit5 driver and
//! reports the trajectory on an evenly spaced output grid.

use crate::error::{
    require_damping_ratio, require_finite, require_non_negative, require_positive, KernelError,
};
use crate::grid::linspace;
use crate::solvers::{AdaptiveIntegrator, IntegrationStats, IntegratorSettings, Tsit5};
use crate::traits::DynamicalSystem;
use log::debug;
use serde::{Deserialize, Serialize};

/// Output samples used when the caller does not ask for a specific count.
pub const DEFAULT_SAMPLES: usize = 1200;

/// Smallest half-width of the animation window, in metres.
pub const MIN_AMPLITUDE_BOUND: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Forcing {
    None,
    #[default]
    Step,
    Sine,
}

impl Forcing {
    pub fn force(self, t: f64, amplitude: f64, frequency: f64) -> f64 {
        match self {
            Forcing::None => 0.0,
            Forcing::Step => amplitude,
            Forcing::Sine => amplitude * (frequency * t).sin(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillatorParams {
    pub mass: f64,
    pub stiffness: f64,
    pub damping_ratio: f64,
    pub forcing: Forcing,
    /// Forcing amplitude F0 in newtons.
    pub amplitude: f64,
    /// Forcing frequency ω in rad/s, only used by [`Forcing::Sine`].
    pub frequency: f64,
    pub x0: f64,
    pub v0: f64,
    pub duration: f64,
    pub samples: usize,
}

impl Default for OscillatorParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            stiffness: 200.0,
            damping_ratio: 0.08,
            forcing: Forcing::Step,
            amplitude: 5.0,
            frequency: 15.0,
            x0: 0.0,
            v0: 0.0,
            duration: 10.0,
            samples: DEFAULT_SAMPLES,
        }
    }
}

impl OscillatorParams {
    /// Viscous damping coefficient `c = 2ζ√(km)`.
    pub fn damping_coefficient(&self) -> f64 {
        2.0 * self.damping_ratio * (self.stiffness * self.mass).sqrt()
    }

    pub fn natural_frequency(&self) -> f64 {
        (self.stiffness / self.mass).sqrt()
    }

    /// Displacement a constant force F0 settles at.
    pub fn static_deflection(&self) -> f64 {
        self.amplitude / self.stiffness
    }

    pub fn validate(&self) -> Result<(), KernelError> {
        require_positive("mass", self.mass)?;
        require_positive("stiffness", self.stiffness)?;
        require_damping_ratio(self.damping_ratio)?;
        require_non_negative("amplitude", self.amplitude)?;
        require_non_negative("frequency", self.frequency)?;
        require_finite("x0", self.x0)?;
        require_finite("v0", self.v0)?;
        require_positive("duration", self.duration)?;
        if self.samples < 2 {
            return Err(KernelError::InvalidParameter {
                name: "samples",
                value: self.samples as f64,
                reason: "at least two output samples are required",
            });
        }
        Ok(())
    }
}

/// State-space form of the oscillator: `[x, v]' = [v, (F(t) - c·v - k·x) / m]`.
pub struct Oscillator {
    mass: f64,
    stiffness: f64,
    damping: f64,
    forcing: Forcing,
    amplitude: f64,
    frequency: f64,
}

impl From<&OscillatorParams> for Oscillator {
    fn from(params: &OscillatorParams) -> Self {
        Self {
            mass: params.mass,
            stiffness: params.stiffness,
            damping: params.damping_coefficient(),
            forcing: params.forcing,
            amplitude: params.amplitude,
            frequency: params.frequency,
        }
    }
}

impl DynamicalSystem<f64> for Oscillator {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, t: f64, x: &[f64], out: &mut [f64]) {
        let force = self.forcing.force(t, self.amplitude, self.frequency);
        out[0] = x[1];
        out[1] = (force - self.damping * x[1] - self.stiffness * x[0]) / self.mass;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub t: f64,
    pub x: f64,
    pub v: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationFrame {
    pub index: usize,
    pub t: f64,
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub t: Vec<f64>,
    pub x: Vec<f64>,
    pub v: Vec<f64>,
    /// Half-width of the window the animated mass is drawn in.
    pub amplitude_bound: f64,
    pub stats: IntegrationStats,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn sample(&self, index: usize) -> Option<Sample> {
        Some(Sample {
            t: *self.t.get(index)?,
            x: *self.x.get(index)?,
            v: *self.v.get(index)?,
        })
    }

    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.t
            .iter()
            .zip(&self.x)
            .zip(&self.v)
            .map(|((&t, &x), &v)| Sample { t, x, v })
    }

    /// Mechanical energy `½mv² + ½kx²` at each sample.
    pub fn energy(&self, mass: f64, stiffness: f64) -> Vec<f64> {
        self.x
            .iter()
            .zip(&self.v)
            .map(|(x, v)| 0.5 * mass * v * v + 0.5 * stiffness * x * x)
            .collect()
    }

    /// Every `stride`-th sample, for frame-based playback of the mass.
    pub fn animation_frames(&self, stride: usize) -> Vec<AnimationFrame> {
        let stride = stride.max(1);
        (0..self.len())
            .step_by(stride)
            .map(|index| AnimationFrame {
                index,
                t: self.t[index],
                x: self.x[index],
            })
            .collect()
    }
}

/// `max(0.15, 0.6·max|x|)`, keeping the animation window from collapsing.
pub fn amplitude_bound(x: &[f64]) -> f64 {
    let peak = x.iter().fold(1e-6_f64, |acc, v| acc.max(v.abs()));
    MIN_AMPLITUDE_BOUND.max(0.6 * peak)
}

pub fn simulate_oscillator(params: &OscillatorParams) -> Result<TimeSeries, KernelError> {
    simulate_oscillator_with(params, IntegratorSettings::default())
}

pub fn simulate_oscillator_with(
    params: &OscillatorParams,
    settings: IntegratorSettings,
) -> Result<TimeSeries, KernelError> {
    params.validate()?;

    let system = Oscillator::from(params);
    let dim = system.dimension();
    let n = params.samples;
    let times = linspace(0.0, params.duration, n);

    let mut integrator = AdaptiveIntegrator::new(Tsit5::new(dim), dim, settings);
    let mut state = [params.x0, params.v0];
    let mut t = 0.0;

    let mut ts = Vec::with_capacity(n);
    let mut xs = Vec::with_capacity(n);
    let mut vs = Vec::with_capacity(n);
    ts.push(t);
    xs.push(state[0]);
    vs.push(state[1]);

    for &target in &times[1..] {
        integrator.advance(&system, &mut t, &mut state, target)?;
        ts.push(t);
        xs.push(state[0]);
        vs.push(state[1]);
    }

    let stats = integrator.stats();
    debug!(
        "oscillator: {} samples over {} s, {} accepted / {} rejected steps, {} evaluations",
        n, params.duration, stats.accepted_steps, stats.rejected_steps, stats.evaluations
    );

    Ok(TimeSeries {
        amplitude_bound: amplitude_bound(&xs),
        t: ts,
        x: xs,
        v: vs,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_peak(series: &TimeSeries, from: f64, to: f64) -> f64 {
        series
            .samples()
            .filter(|s| s.t >= from && s.t < to)
            .fold(0.0_f64, |acc, s| acc.max(s.x.abs()))
    }

    #[test]
    fn first_sample_matches_initial_conditions() {
        let params = OscillatorParams {
            x0: 0.035,
            v0: -0.2,
            ..OscillatorParams::default()
        };
        let series = simulate_oscillator(&params).expect("simulation should succeed");
        assert_eq!(series.len(), DEFAULT_SAMPLES);
        assert_eq!(series.t[0], 0.0);
        assert_eq!(series.x[0], 0.035);
        assert_eq!(series.v[0], -0.2);
        assert_eq!(*series.t.last().expect("non-empty"), params.duration);
        assert!(series.t.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn step_response_settles_at_static_deflection() {
        let params = OscillatorParams::default();
        let series = simulate_oscillator(&params).expect("simulation should succeed");
        let final_x = *series.x.last().expect("non-empty");
        assert!((params.static_deflection() - 0.025).abs() < 1e-15);
        assert!((final_x - 0.025).abs() < 1e-4, "x(T) = {final_x}");
    }

    #[test]
    fn damped_free_vibration_decays() {
        let params = OscillatorParams {
            damping_ratio: 0.05,
            forcing: Forcing::None,
            x0: 0.05,
            ..OscillatorParams::default()
        };
        let series = simulate_oscillator(&params).expect("simulation should succeed");
        let peaks: Vec<f64> = (0..5)
            .map(|w| window_peak(&series, 2.0 * w as f64, 2.0 * (w + 1) as f64))
            .collect();
        for pair in peaks.windows(2) {
            assert!(pair[1] < pair[0], "envelope grew: {peaks:?}");
        }
    }

    #[test]
    fn undamped_free_vibration_conserves_energy() {
        let params = OscillatorParams {
            damping_ratio: 0.0,
            forcing: Forcing::None,
            x0: 0.05,
            v0: 0.1,
            ..OscillatorParams::default()
        };
        let series = simulate_oscillator(&params).expect("simulation should succeed");
        let energy = series.energy(params.mass, params.stiffness);
        let e0 = energy[0];
        let drift = energy
            .iter()
            .fold(0.0_f64, |acc, e| acc.max((e - e0).abs() / e0));
        assert!(drift < 1e-4, "relative energy drift {drift}");
    }

    #[test]
    fn sine_forcing_reaches_steady_state_amplitude() {
        let params = OscillatorParams {
            mass: 1.0,
            stiffness: 100.0,
            damping_ratio: 0.2,
            forcing: Forcing::Sine,
            amplitude: 2.0,
            frequency: 5.0,
            duration: 20.0,
            samples: 4001,
            ..OscillatorParams::default()
        };
        let series = simulate_oscillator(&params).expect("simulation should succeed");
        let r: f64 = 0.5;
        let zeta = params.damping_ratio;
        let expected = params.static_deflection()
            / ((1.0 - r * r).powi(2) + (2.0 * zeta * r).powi(2)).sqrt();
        let measured = window_peak(&series, 17.0, 20.0);
        assert!(
            (measured - expected).abs() / expected < 1e-3,
            "measured {measured}, expected {expected}"
        );
    }

    #[test]
    fn quiescent_system_uses_minimum_amplitude_bound() {
        let params = OscillatorParams {
            forcing: Forcing::None,
            ..OscillatorParams::default()
        };
        let series = simulate_oscillator(&params).expect("simulation should succeed");
        assert!(series.x.iter().all(|x| *x == 0.0));
        assert_eq!(series.amplitude_bound, MIN_AMPLITUDE_BOUND);
        assert!((amplitude_bound(&[0.0, -0.5, 0.3]) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn animation_frames_take_every_stride_sample() {
        let series = simulate_oscillator(&OscillatorParams::default()).expect("simulation");
        let frames = series.animation_frames(8);
        assert_eq!(frames.len(), 150);
        assert_eq!(frames[1].index, 8);
        assert_eq!(frames[1].x, series.x[8]);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let params = OscillatorParams {
            forcing: Forcing::Sine,
            ..OscillatorParams::default()
        };
        let a = simulate_oscillator(&params).expect("first run");
        let b = simulate_oscillator(&params).expect("second run");
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_non_physical_parameters() {
        for params in [
            OscillatorParams {
                mass: 0.0,
                ..OscillatorParams::default()
            },
            OscillatorParams {
                stiffness: -1.0,
                ..OscillatorParams::default()
            },
            OscillatorParams {
                damping_ratio: 1.5,
                ..OscillatorParams::default()
            },
            OscillatorParams {
                duration: 0.0,
                ..OscillatorParams::default()
            },
            OscillatorParams {
                samples: 1,
                ..OscillatorParams::default()
            },
        ] {
            let err = simulate_oscillator(&params).expect_err("invalid parameters");
            assert!(matches!(err, KernelError::InvalidParameter { .. }));
        }
    }
}

//! Discrete PID loop closed around a mass–spring–damper plant.
//!
//! The controller tracks a unit step on displacement. The plant is advanced
//! with semi-implicit Euler: velocity first, then position from the updated
//! velocity. Swapping that order changes the trajectory.

use crate::error::{require_damping_ratio, require_non_negative, require_positive, KernelError};
use log::debug;
use serde::{Deserialize, Serialize};

/// Reference step the loop tracks.
pub const REFERENCE: f64 = 1.0;

/// Half-width of the settling band around the reference (absolute).
pub const SETTLING_BAND: f64 = 0.02;

pub const DEFAULT_DT: f64 = 1.0 / 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidParams {
    pub mass: f64,
    pub stiffness: f64,
    pub damping_ratio: f64,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub duration: f64,
    pub dt: f64,
}

impl Default for PidParams {
    fn default() -> Self {
        Self {
            mass: 1.5,
            stiffness: 180.0,
            damping_ratio: 0.1,
            kp: 10.0,
            ki: 1.5,
            kd: 0.8,
            duration: 12.0,
            dt: DEFAULT_DT,
        }
    }
}

impl PidParams {
    pub fn damping_coefficient(&self) -> f64 {
        2.0 * self.damping_ratio * (self.stiffness * self.mass).sqrt()
    }

    /// Number of simulated steps, `floor(T / dt)`.
    pub fn steps(&self) -> usize {
        (self.duration / self.dt).floor() as usize
    }

    /// Static error left by proportional-only control: `k / (k + Kp)`.
    pub fn proportional_offset(&self) -> f64 {
        self.stiffness / (self.stiffness + self.kp)
    }

    pub fn validate(&self) -> Result<(), KernelError> {
        require_positive("mass", self.mass)?;
        require_positive("stiffness", self.stiffness)?;
        require_damping_ratio(self.damping_ratio)?;
        require_non_negative("kp", self.kp)?;
        require_non_negative("ki", self.ki)?;
        require_non_negative("kd", self.kd)?;
        require_positive("duration", self.duration)?;
        require_positive("dt", self.dt)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PidTrace {
    pub t: Vec<f64>,
    /// Plant output (displacement) after each step.
    pub y: Vec<f64>,
    pub r: Vec<f64>,
    pub u: Vec<f64>,
    pub e: Vec<f64>,
}

impl PidTrace {
    fn with_capacity(n: usize) -> Self {
        Self {
            t: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            r: Vec::with_capacity(n),
            u: Vec::with_capacity(n),
            e: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub overshoot_pct: f64,
    /// `None` when the output never enters the settling band.
    pub settling_time: Option<f64>,
    /// Integral of |e| dt (trapezoidal rule).
    pub iae: f64,
    pub steady_state_error: f64,
}

impl Metrics {
    pub fn from_trace(trace: &PidTrace) -> Self {
        let peak = trace.y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let overshoot_pct = if peak.is_finite() {
            ((peak - REFERENCE) * 100.0).max(0.0)
        } else {
            0.0
        };

        let settling_time = trace
            .y
            .iter()
            .position(|y| (y - REFERENCE).abs() <= SETTLING_BAND)
            .map(|idx| trace.t[idx]);

        Self {
            overshoot_pct,
            settling_time,
            iae: trapezoid_abs(&trace.t, &trace.e),
            steady_state_error: trace.e.last().copied().unwrap_or(REFERENCE),
        }
    }
}

fn trapezoid_abs(t: &[f64], values: &[f64]) -> f64 {
    t.windows(2)
        .zip(values.windows(2))
        .map(|(ts, vs)| 0.5 * (ts[1] - ts[0]) * (vs[0].abs() + vs[1].abs()))
        .sum()
}

pub fn simulate_pid_loop(params: &PidParams) -> Result<(PidTrace, Metrics), KernelError> {
    params.validate()?;

    let n = params.steps();
    let dt = params.dt;
    let c = params.damping_coefficient();
    let mut trace = PidTrace::with_capacity(n);

    let mut x = 0.0;
    let mut v = 0.0;
    let mut integral = 0.0;
    let mut e_prev = 0.0;

    for i in 0..n {
        let t = i as f64 * dt;
        let e = REFERENCE - x;
        integral += e * dt;
        let derivative = (e - e_prev) / dt;
        let u = params.kp * e + params.ki * integral + params.kd * derivative;
        e_prev = e;

        let a = (u - c * v - params.stiffness * x) / params.mass;
        v += a * dt;
        x += v * dt;

        if !x.is_finite() || !v.is_finite() {
            return Err(KernelError::NonFiniteState { t });
        }

        trace.t.push(t);
        trace.y.push(x);
        trace.r.push(REFERENCE);
        trace.u.push(u);
        trace.e.push(e);
    }

    let metrics = Metrics::from_trace(&trace);
    debug!(
        "pid loop: {} steps, overshoot {:.2}%, settling {:?}, iae {:.4}",
        n, metrics.overshoot_pct, metrics.settling_time, metrics.iae
    );
    Ok((trace, metrics))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_count_and_time_grid() {
        let params = PidParams::default();
        let (trace, _) = simulate_pid_loop(&params).expect("simulation should succeed");
        assert_eq!(trace.len(), params.steps());
        assert!(trace.len() == 3599 || trace.len() == 3600);
        assert_eq!(trace.t[0], 0.0);
        assert!((trace.t[1] - DEFAULT_DT).abs() < 1e-15);
        assert!(trace.r.iter().all(|r| *r == REFERENCE));
    }

    #[test]
    fn first_step_follows_semi_implicit_euler() {
        let params = PidParams {
            mass: 2.0,
            stiffness: 50.0,
            damping_ratio: 0.0,
            kp: 4.0,
            ki: 1.0,
            kd: 0.5,
            duration: 0.1,
            dt: 0.01,
        };
        let (trace, _) = simulate_pid_loop(&params).expect("simulation should succeed");
        let dt = params.dt;
        let integral = dt;
        let derivative = 1.0 / dt;
        let u = 4.0 + 1.0 * integral + 0.5 * derivative;
        let v = u / 2.0 * dt;
        // Position uses the velocity already updated in the same step.
        let x = v * dt;
        assert!((trace.u[0] - u).abs() < 1e-12);
        assert!((trace.y[0] - x).abs() < 1e-12);
        assert_eq!(trace.e[0], 1.0);
    }

    #[test]
    fn proportional_control_leaves_static_offset() {
        let params = PidParams {
            mass: 1.0,
            stiffness: 100.0,
            damping_ratio: 0.5,
            kp: 300.0,
            ki: 0.0,
            kd: 0.0,
            duration: 10.0,
            dt: DEFAULT_DT,
        };
        let (_, metrics) = simulate_pid_loop(&params).expect("simulation should succeed");
        let expected = params.proportional_offset();
        assert!((expected - 0.25).abs() < 1e-12);
        assert!(
            (metrics.steady_state_error - expected).abs() < 1e-3,
            "e_inf = {}",
            metrics.steady_state_error
        );
    }

    #[test]
    fn integral_action_removes_offset() {
        let params = PidParams {
            mass: 1.0,
            stiffness: 100.0,
            damping_ratio: 0.5,
            kp: 50.0,
            ki: 200.0,
            kd: 5.0,
            duration: 30.0,
            dt: DEFAULT_DT,
        };
        let (_, metrics) = simulate_pid_loop(&params).expect("simulation should succeed");
        assert!(
            metrics.steady_state_error.abs() < 1e-3,
            "e_inf = {}",
            metrics.steady_state_error
        );
        assert!(metrics.settling_time.is_some());
    }

    #[test]
    fn open_loop_never_settles() {
        let params = PidParams {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            ..PidParams::default()
        };
        let (trace, metrics) = simulate_pid_loop(&params).expect("simulation should succeed");
        assert!(trace.u.iter().all(|u| *u == 0.0));
        assert!(trace.y.iter().all(|y| *y == 0.0));
        assert_eq!(metrics.overshoot_pct, 0.0);
        assert_eq!(metrics.settling_time, None);
        assert!((metrics.iae - trace.t[trace.len() - 1]).abs() < 1e-9);
    }

    #[test]
    fn default_loop_metrics_are_consistent() {
        let (trace, metrics) =
            simulate_pid_loop(&PidParams::default()).expect("simulation should succeed");
        assert!(metrics.overshoot_pct >= 0.0);
        assert!(metrics.iae > 0.0);
        if let Some(ts) = metrics.settling_time {
            let idx = trace.t.iter().position(|t| *t == ts).expect("settling sample");
            assert!((trace.y[idx] - REFERENCE).abs() <= SETTLING_BAND);
            assert!(trace.y[..idx]
                .iter()
                .all(|y| (y - REFERENCE).abs() > SETTLING_BAND));
        }
    }

    #[test]
    fn metrics_from_hand_built_trace() {
        let trace = PidTrace {
            t: vec![0.0, 1.0, 2.0, 3.0],
            y: vec![0.5, 1.3, 0.99, 1.0],
            r: vec![1.0; 4],
            u: vec![0.0; 4],
            e: vec![1.0, -0.5, 0.5, 0.0],
        };
        let metrics = Metrics::from_trace(&trace);
        assert!((metrics.overshoot_pct - 30.0).abs() < 1e-9);
        assert_eq!(metrics.settling_time, Some(2.0));
        // 0.5 * (1.0 + 0.5) + 0.5 * (0.5 + 0.5) + 0.5 * (0.5 + 0.0)
        assert!((metrics.iae - 1.5).abs() < 1e-12);
        assert_eq!(metrics.steady_state_error, 0.0);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let params = PidParams::default();
        assert_eq!(
            simulate_pid_loop(&params).expect("first run"),
            simulate_pid_loop(&params).expect("second run")
        );
    }

    #[test]
    fn diverging_loop_is_reported() {
        // Explicit stepping with a huge derivative gain is unstable at this dt.
        let params = PidParams {
            mass: 0.1,
            stiffness: 10.0,
            damping_ratio: 0.0,
            kp: 0.0,
            ki: 0.0,
            kd: 1e6,
            duration: 30.0,
            dt: 0.01,
        };
        let err = simulate_pid_loop(&params).expect_err("loop should blow up");
        assert!(matches!(err, KernelError::NonFiniteState { .. }));
    }
}

use crate::error::KernelError;
use crate::traits::{DynamicalSystem, EmbeddedStep, Scalar};
use log::debug;
use serde::{Deserialize, Serialize};

fn lit<T: Scalar>(value: f64) -> T {
    T::from_f64(value).unwrap_or_else(T::nan)
}

/// Tsitouras 5/4 Solver
pub struct Tsit5<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    k5: Vec<T>,
    k6: Vec<T>,
    k7: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> Tsit5<T> {
    pub fn new(dim: usize) -> Self {
        let z = T::zero();
        Self {
            k1: vec![z; dim],
            k2: vec![z; dim],
            k3: vec![z; dim],
            k4: vec![z; dim],
            k5: vec![z; dim],
            k6: vec![z; dim],
            k7: vec![z; dim],
            tmp: vec![z; dim],
        }
    }

    /// Evaluates the six stages that build the 5th order solution.
    fn stages(&mut self, system: &impl DynamicalSystem<T>, t0: T, state: &[T], dt: T) {
        let c2 = lit::<T>(0.161);
        let c3 = lit::<T>(0.327);
        let c4 = lit::<T>(0.9);
        let c5 = lit::<T>(0.9800255409045097);
        let c6 = T::one();

        let a21 = lit::<T>(0.161);

        let a31 = lit::<T>(-0.008480655492356989);
        let a32 = lit::<T>(0.335480655492357);

        let a41 = lit::<T>(2.898);
        let a42 = lit::<T>(-6.359447987781783);
        let a43 = lit::<T>(4.361447987781783);

        let a51 = lit::<T>(5.325864858437957);
        let a52 = lit::<T>(-11.748883564062828);
        let a53 = lit::<T>(7.495539342889693);
        let a54 = lit::<T>(-0.09249506636030195);

        let a61 = lit::<T>(5.86145544294642);
        let a62 = lit::<T>(-12.92096931784711);
        let a63 = lit::<T>(8.159367898576159);
        let a64 = lit::<T>(-0.071584973281401);
        let a65 = lit::<T>(-0.02826857949054663);

        // k1
        system.apply(t0, state, &mut self.k1);

        // k2
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * (a21 * self.k1[i]);
        }
        system.apply(t0 + c2 * dt, &self.tmp, &mut self.k2);

        // k3
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * (a31 * self.k1[i] + a32 * self.k2[i]);
        }
        system.apply(t0 + c3 * dt, &self.tmp, &mut self.k3);

        // k4
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * (a41 * self.k1[i] + a42 * self.k2[i] + a43 * self.k3[i]);
        }
        system.apply(t0 + c4 * dt, &self.tmp, &mut self.k4);

        // k5
        for i in 0..state.len() {
            self.tmp[i] = state[i]
                + dt * (a51 * self.k1[i] + a52 * self.k2[i] + a53 * self.k3[i] + a54 * self.k4[i]);
        }
        system.apply(t0 + c5 * dt, &self.tmp, &mut self.k5);

        // k6
        for i in 0..state.len() {
            self.tmp[i] = state[i]
                + dt * (a61 * self.k1[i]
                    + a62 * self.k2[i]
                    + a63 * self.k3[i]
                    + a64 * self.k4[i]
                    + a65 * self.k5[i]);
        }
        system.apply(t0 + c6 * dt, &self.tmp, &mut self.k6);
    }

    fn combine(&self, state: &[T], dt: T, out: &mut [T]) {
        // b coefficients (5th order); b7 is zero
        let b1 = lit::<T>(0.09646076681806523);
        let b2 = lit::<T>(0.01);
        let b3 = lit::<T>(0.4798896504144996);
        let b4 = lit::<T>(1.379008574103742);
        let b5 = lit::<T>(-3.290069515436099);
        let b6 = lit::<T>(2.324710524099774);

        for i in 0..state.len() {
            out[i] = state[i]
                + dt * (b1 * self.k1[i]
                    + b2 * self.k2[i]
                    + b3 * self.k3[i]
                    + b4 * self.k4[i]
                    + b5 * self.k5[i]
                    + b6 * self.k6[i]);
        }
    }
}

impl<T: Scalar> EmbeddedStep<T> for Tsit5<T> {
    fn error_order(&self) -> usize {
        4
    }

    fn evaluations_per_step(&self) -> usize {
        7
    }

    fn trial_step(
        &mut self,
        system: &impl DynamicalSystem<T>,
        t: T,
        state: &[T],
        dt: T,
        out: &mut [T],
        err: &mut [T],
    ) {
        // Difference between the 5th and embedded 4th order weights.
        let e1 = lit::<T>(-0.00178001105222577714);
        let e2 = lit::<T>(-0.0008164344596567469);
        let e3 = lit::<T>(0.007880878010261996);
        let e4 = lit::<T>(-0.1447110071732629);
        let e5 = lit::<T>(0.5823571654525552);
        let e6 = lit::<T>(-0.45808210592918697);
        let e7 = lit::<T>(1.0 / 66.0);

        self.stages(system, t, state, dt);
        self.combine(state, dt, out);
        system.apply(t + dt, out, &mut self.k7);

        for i in 0..state.len() {
            err[i] = dt
                * (e1 * self.k1[i]
                    + e2 * self.k2[i]
                    + e3 * self.k3[i]
                    + e4 * self.k4[i]
                    + e5 * self.k5[i]
                    + e6 * self.k6[i]
                    + e7 * self.k7[i]);
        }
    }
}

/// Step-size control settings for [`AdaptiveIntegrator`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntegratorSettings {
    pub rtol: f64,
    pub atol: f64,
    pub max_steps: usize,
    pub safety: f64,
    pub min_factor: f64,
    pub max_factor: f64,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            rtol: 1e-7,
            atol: 1e-9,
            max_steps: 200_000,
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationStats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub evaluations: usize,
}

/// Error-controlled driver around an embedded stepper.
///
/// The proposed step size carries over between calls to [`advance`](Self::advance),
/// so a trajectory can be integrated output point by output point without
/// restarting the controller. Each call lands exactly on its end time.
pub struct AdaptiveIntegrator<S> {
    stepper: S,
    settings: IntegratorSettings,
    stats: IntegrationStats,
    proposed: Option<f64>,
    out: Vec<f64>,
    err: Vec<f64>,
}

impl<S: EmbeddedStep<f64>> AdaptiveIntegrator<S> {
    pub fn new(stepper: S, dim: usize, settings: IntegratorSettings) -> Self {
        Self {
            stepper,
            settings,
            stats: IntegrationStats::default(),
            proposed: None,
            out: vec![0.0; dim],
            err: vec![0.0; dim],
        }
    }

    pub fn stats(&self) -> IntegrationStats {
        self.stats
    }

    /// Integrates `state` from `*t` up to `t_end`.
    pub fn advance(
        &mut self,
        system: &impl DynamicalSystem<f64>,
        t: &mut f64,
        state: &mut [f64],
        t_end: f64,
    ) -> Result<(), KernelError> {
        let exponent = 1.0 / (self.stepper.error_order() as f64 + 1.0);
        let mut h = match self.proposed {
            Some(h) => h,
            None => self.initial_step(system, *t, state, t_end - *t),
        };
        let mut last_rejected = false;

        while *t < t_end {
            let remaining = t_end - *t;
            let landing = h >= remaining;
            let step = if landing { remaining } else { h };

            let min_step = 16.0 * f64::EPSILON * t.abs().max(1.0);
            if step < min_step && !landing {
                return Err(KernelError::StepSizeUnderflow { t: *t, dt: step });
            }
            if self.stats.accepted_steps + self.stats.rejected_steps >= self.settings.max_steps {
                return Err(KernelError::MaxStepsExceeded {
                    t: *t,
                    steps: self.settings.max_steps,
                });
            }

            self.stepper
                .trial_step(system, *t, state, step, &mut self.out, &mut self.err);
            self.stats.evaluations += self.stepper.evaluations_per_step();
            let err = self.error_norm(state);

            if err <= 1.0 {
                if self.out.iter().any(|v| !v.is_finite()) {
                    return Err(KernelError::NonFiniteState { t: *t + step });
                }
                state.copy_from_slice(&self.out);
                *t = if landing { t_end } else { *t + step };
                self.stats.accepted_steps += 1;

                let mut factor = if err == 0.0 {
                    self.settings.max_factor
                } else {
                    (self.settings.safety * err.powf(-exponent))
                        .clamp(self.settings.min_factor, self.settings.max_factor)
                };
                if last_rejected {
                    factor = factor.min(1.0);
                }
                // A step shortened to hit t_end says nothing about the natural step size.
                h = if landing && step < h { h } else { step * factor };
                last_rejected = false;
            } else {
                self.stats.rejected_steps += 1;
                let factor = if err.is_finite() {
                    (self.settings.safety * err.powf(-exponent)).max(self.settings.min_factor)
                } else {
                    self.settings.min_factor
                };
                h = step * factor;
                last_rejected = true;
            }
        }

        self.proposed = Some(h);
        Ok(())
    }

    /// Scaled RMS norm of the last error estimate.
    fn error_norm(&self, state: &[f64]) -> f64 {
        let n = state.len().max(1) as f64;
        let sum: f64 = state
            .iter()
            .zip(&self.out)
            .zip(&self.err)
            .map(|((y0, y1), e)| {
                let scale = self.settings.atol + self.settings.rtol * y0.abs().max(y1.abs());
                (e / scale).powi(2)
            })
            .sum();
        (sum / n).sqrt()
    }

    fn initial_step(
        &mut self,
        system: &impl DynamicalSystem<f64>,
        t: f64,
        state: &[f64],
        span: f64,
    ) -> f64 {
        let dim = state.len();
        let n = dim.max(1) as f64;
        let scale: Vec<f64> = state
            .iter()
            .map(|y| self.settings.atol + self.settings.rtol * y.abs())
            .collect();
        let norm = |values: &[f64]| -> f64 {
            (values
                .iter()
                .zip(&scale)
                .map(|(v, s)| (v / s).powi(2))
                .sum::<f64>()
                / n)
                .sqrt()
        };

        let mut f0 = vec![0.0; dim];
        system.apply(t, state, &mut f0);
        let d0 = norm(state);
        let d1 = norm(&f0);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };

        let probe: Vec<f64> = state.iter().zip(&f0).map(|(y, f)| y + h0 * f).collect();
        let mut f1 = vec![0.0; dim];
        system.apply(t + h0, &probe, &mut f1);
        self.stats.evaluations += 2;

        let diff: Vec<f64> = f1.iter().zip(&f0).map(|(a, b)| a - b).collect();
        let d2 = norm(&diff) / h0;
        let order = self.stepper.error_order() as f64 + 1.0;
        let h1 = if d1.max(d2) <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(1.0 / order)
        };

        let h = (100.0 * h0).min(h1).min(span.abs().max(f64::MIN_POSITIVE));
        debug!("initial step h = {h:e} (d0 = {d0:e}, d1 = {d1:e}, d2 = {d2:e})");
        h
    }
}

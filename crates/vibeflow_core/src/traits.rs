use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// Floating-point type the integrators are generic over.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// Right-hand side of `dx/dt = f(t, x)`.
pub trait DynamicalSystem<T: Scalar> {
    fn dimension(&self) -> usize;

    /// Writes `f(t, x)` into `out`.
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// Runge-Kutta pair whose embedded solution yields a local error estimate.
pub trait EmbeddedStep<T: Scalar> {
    /// Order of the embedded solution; the controller exponent is `1 / (order + 1)`.
    fn error_order(&self) -> usize;

    /// Vector field evaluations spent by one `trial_step`.
    fn evaluations_per_step(&self) -> usize;

    /// Proposes the state at `t + dt` in `out` and its error estimate in `err`.
    /// `state` is left untouched so a rejected step costs nothing to undo.
    fn trial_step(
        &mut self,
        system: &impl DynamicalSystem<T>,
        t: T,
        state: &[T],
        dt: T,
        out: &mut [T],
        err: &mut [T],
    );
}

//! The `vibeflow_core` crate holds the numeric engine behind the VibeFlow
//! vibration and control sandbox. Every kernel is a pure function from a
//! parameter struct to plot-ready series.
//!
//! Key components:
//! - **Oscillator**: adaptive Tsit5 integration of a forced mass–spring–damper.
//! - **PID**: fixed-step closed loop around the same plant, with step-response metrics.
//! - **Transmissibility**: closed-form isolation curve and base-excitation frames.
//! - **Modal**: natural frequencies and mode shapes of a two-mass chain.
//! - **Solvers / Traits**: the stepper abstractions the oscillator is built on.

pub mod config;
pub mod error;
pub mod grid;
pub mod modal;
pub mod oscillator;
pub mod pid;
pub mod solvers;
pub mod traits;
pub mod transmissibility;

pub use error::KernelError;
pub use modal::{solve_two_dof_modes, ModalResult, Mode, TwoDofSystem};
pub use oscillator::{simulate_oscillator, Forcing, OscillatorParams, TimeSeries};
pub use pid::{simulate_pid_loop, Metrics, PidParams, PidTrace};
pub use transmissibility::{evaluate_transmissibility, IsolationCurve, ISOLATION_RATIO};

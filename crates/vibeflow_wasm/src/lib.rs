//! WASM bindings for the VibeFlow kernels.
//!
//! Each module of the sandbox gets one entry point per computation. Parameters
//! arrive as plain JS objects (snake_case fields, missing fields take the
//! module defaults) and results go back as JS objects ready for charting.

mod control;
mod isolation;
mod modes;
mod oscillator;
mod ranges;
mod shared;

pub use control::simulate_pid_loop;
pub use isolation::{base_excitation, evaluate_transmissibility, transmissibility_values};
pub use modes::{mode_animation, solve_two_dof_modes};
pub use oscillator::simulate_oscillator;
pub use ranges::parameter_ranges;

use thiserror::Error;

/// Failures surfaced by the kernels.
///
/// Numerical singularities that are physically meaningful (the undamped
/// resonance peak, a loop that never settles) are returned as values and never
/// show up here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("step size underflow at t = {t} (dt = {dt:e})")]
    StepSizeUnderflow { t: f64, dt: f64 },

    #[error("integrator exceeded {steps} steps before t = {t}")]
    MaxStepsExceeded { t: f64, steps: usize },

    #[error("state became non-finite at t = {t}")]
    NonFiniteState { t: f64 },

    #[error("stiffness matrix is not positive semi-definite (eigenvalue {eigenvalue})")]
    UnstableSystem { eigenvalue: f64 },
}

pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), KernelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(KernelError::InvalidParameter {
            name,
            value,
            reason: "must be finite and positive",
        })
    }
}

pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<(), KernelError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(KernelError::InvalidParameter {
            name,
            value,
            reason: "must be finite and non-negative",
        })
    }
}

pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<(), KernelError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(KernelError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        })
    }
}

pub(crate) fn require_damping_ratio(value: f64) -> Result<(), KernelError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(KernelError::InvalidParameter {
            name: "damping_ratio",
            value,
            reason: "must lie in [0, 1]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validators_reject_out_of_domain_values() {
        assert!(require_positive("mass", 0.0).is_err());
        assert!(require_positive("mass", f64::NAN).is_err());
        assert!(require_positive("mass", 1.0).is_ok());
        assert!(require_non_negative("kp", -0.1).is_err());
        assert!(require_non_negative("kp", 0.0).is_ok());
        assert!(require_finite("x0", f64::INFINITY).is_err());
        assert!(require_damping_ratio(1.0).is_ok());
        assert!(require_damping_ratio(1.01).is_err());
        assert!(require_damping_ratio(f64::NAN).is_err());
    }

    #[test]
    fn invalid_parameter_message_names_the_field() {
        let err = require_positive("stiffness", -2.0).expect_err("negative stiffness");
        let message = err.to_string();
        assert!(message.contains("stiffness"), "unexpected message: {message}");
        assert!(message.contains("-2"), "unexpected message: {message}");
    }
}

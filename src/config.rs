use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Conservation tolerance applied to |ΔE| and |Δp| after a solve.
pub const DEFAULT_CONSERVATION_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be positive and finite, got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },
    #[error("max_iterations must be at least 1")]
    ZeroIterations,
}

/// Numerical settings shared by the collision solver and its root finder.
///
/// Residuals handed to the root finder are scaled by the total incoming
/// energy, so `residual_tolerance` is relative; `conservation_tolerance` is
/// absolute, in the units of the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub conservation_tolerance: f64,
    pub residual_tolerance: f64,
    pub step_tolerance: f64,
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            conservation_tolerance: DEFAULT_CONSERVATION_TOLERANCE,
            residual_tolerance: 1e-10,
            step_tolerance: 1.5e-8,
            max_iterations: 100,
        }
    }
}

impl SolverConfig {
    pub fn with_conservation_tolerance(mut self, tolerance: f64) -> Self {
        self.conservation_tolerance = tolerance;
        self
    }

    pub fn with_residual_tolerance(mut self, tolerance: f64) -> Self {
        self.residual_tolerance = tolerance;
        self
    }

    pub fn with_step_tolerance(mut self, tolerance: f64) -> Self {
        self.step_tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("conservation_tolerance", self.conservation_tolerance),
            ("residual_tolerance", self.residual_tolerance),
            ("step_tolerance", self.step_tolerance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidTolerance { name, value });
            }
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        Ok(())
    }
}

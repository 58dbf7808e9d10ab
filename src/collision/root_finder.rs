//! Nonlinear root finding behind a small trait so the collision solver can be
//! driven by any method, including deterministic fakes in tests.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;
use tracing::trace;

use crate::config::SolverConfig;

/// A residual function f: ℝⁿ → ℝⁿ. Points outside the residual's domain
/// should evaluate to non-finite components rather than panic.
pub type Residual<'a> = dyn Fn(&DVector<f64>) -> DVector<f64> + 'a;

#[derive(Debug, Clone, PartialEq)]
pub struct Root {
    pub x: DVector<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
}

/// `NotConverged` and `Stalled` keep the best point reached so a caller with a
/// looser acceptance test than `residual_tolerance` can still use it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RootFinderError {
    #[error("no convergence after {iterations} iterations (|f| = {residual_norm:e})")]
    NotConverged {
        iterations: usize,
        residual_norm: f64,
        best: DVector<f64>,
    },
    #[error("stalled at iteration {iteration} with |f| = {residual_norm:e}")]
    Stalled {
        iteration: usize,
        residual_norm: f64,
        best: DVector<f64>,
    },
    #[error("singular Jacobian at iteration {iteration}")]
    SingularJacobian { iteration: usize },
    #[error("residual is not finite at iteration {iteration}")]
    NonFinite { iteration: usize },
}

pub trait RootFinder: Send + Sync {
    /// Search for x* with f(x*) ≈ 0 starting from `x0`.
    fn find_root(&self, f: &Residual<'_>, x0: DVector<f64>) -> Result<Root, RootFinderError>;
}

/// Halvings tried before a Newton step is declared stalled.
const MAX_BACKTRACKS: usize = 40;

/// Damped Newton–Raphson with a forward-difference Jacobian.
///
/// Each full Newton step is halved until the trial point has a finite residual
/// with a smaller norm, which keeps iterates inside domains such as |v| < 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonRaphson {
    pub max_iterations: usize,
    pub residual_tolerance: f64,
    pub step_tolerance: f64,
}

impl Default for NewtonRaphson {
    fn default() -> Self {
        NewtonRaphson::from_config(&SolverConfig::default())
    }
}

impl NewtonRaphson {
    pub fn from_config(config: &SolverConfig) -> Self {
        NewtonRaphson {
            max_iterations: config.max_iterations,
            residual_tolerance: config.residual_tolerance,
            step_tolerance: config.step_tolerance,
        }
    }

    fn jacobian(
        &self,
        f: &Residual<'_>,
        x: &DVector<f64>,
        fx: &DVector<f64>,
        iteration: usize,
    ) -> Result<DMatrix<f64>, RootFinderError> {
        let n = x.len();
        let mut jac = DMatrix::zeros(fx.len(), n);

        for j in 0..n {
            // Step towards the origin so bounded domains are never left
            let mut h = f64::EPSILON.sqrt() * x[j].abs().max(1.0);
            if x[j] > 0.0 {
                h = -h;
            }

            let mut shifted = x.clone();
            shifted[j] += h;
            let column = (f(&shifted) - fx) / h;
            if !is_finite(&column) {
                return Err(RootFinderError::NonFinite { iteration });
            }
            jac.set_column(j, &column);
        }

        Ok(jac)
    }
}

impl RootFinder for NewtonRaphson {
    fn find_root(&self, f: &Residual<'_>, x0: DVector<f64>) -> Result<Root, RootFinderError> {
        let mut x = x0;
        let mut fx = f(&x);
        if !is_finite(&fx) {
            return Err(RootFinderError::NonFinite { iteration: 0 });
        }

        for iteration in 0..self.max_iterations {
            let norm = fx.norm();
            if norm <= self.residual_tolerance {
                return Ok(Root {
                    x,
                    residual_norm: norm,
                    iterations: iteration,
                });
            }

            let jac = self.jacobian(f, &x, &fx, iteration)?;
            let step = jac
                .lu()
                .solve(&(-&fx))
                .ok_or(RootFinderError::SingularJacobian { iteration })?;

            let mut lambda = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let trial = &x + &step * lambda;
                let f_trial = f(&trial);
                if is_finite(&f_trial) && f_trial.norm() < norm {
                    accepted = Some((trial, f_trial));
                    break;
                }
                lambda *= 0.5;
            }

            let Some((next, f_next)) = accepted else {
                return Err(RootFinderError::Stalled {
                    iteration,
                    residual_norm: norm,
                    best: x,
                });
            };

            let step_norm = lambda * step.norm();
            trace!(iteration, residual = norm, step = step_norm, lambda, "newton step");

            x = next;
            fx = f_next;

            // Tiny steps that no longer halve the residual will not get there
            let f_norm = fx.norm();
            if step_norm <= self.step_tolerance * (x.norm() + self.step_tolerance)
                && f_norm > self.residual_tolerance
                && f_norm > 0.5 * norm
            {
                return Err(RootFinderError::Stalled {
                    iteration,
                    residual_norm: f_norm,
                    best: x,
                });
            }
        }

        let residual_norm = fx.norm();
        if residual_norm <= self.residual_tolerance {
            return Ok(Root {
                x,
                residual_norm,
                iterations: self.max_iterations,
            });
        }

        Err(RootFinderError::NotConverged {
            iterations: self.max_iterations,
            residual_norm,
            best: x,
        })
    }
}

fn is_finite(v: &DVector<f64>) -> bool {
    v.iter().all(|c| c.is_finite())
}

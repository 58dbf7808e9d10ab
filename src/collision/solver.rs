//! Relativistic two-body collision solver.
//!
//! Builds the conservation residuals for the chosen mode, hands them to a
//! [`RootFinder`], and validates the root before assembling the outgoing
//! state. Residuals are divided by the incoming total energy so the root
//! finder sees dimensionless values of order one at any γ.

use nalgebra::DVector;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::collision::error::{CollisionError, Divergence};
use crate::collision::frame;
use crate::collision::particle::{CollisionInput, CollisionMode, PreCollision};
use crate::collision::result::{
    CollisionResult, ConservationError, ConservationWarning, OutgoingState,
};
use crate::collision::root_finder::{
    NewtonRaphson, Residual, Root, RootFinder, RootFinderError,
};
use crate::config::{ConfigError, SolverConfig};
use crate::relativity::special;

/// A root closer to the incoming velocities than this fraction of their
/// separation is the no-collision solution, not the physical one.
const TRIVIAL_ROOT_FRACTION: f64 = 1e-3;

#[derive(Debug, Clone)]
pub struct CollisionSolver<R = NewtonRaphson> {
    config: SolverConfig,
    root_finder: R,
}

impl Default for CollisionSolver<NewtonRaphson> {
    fn default() -> Self {
        let config = SolverConfig::default();
        CollisionSolver {
            root_finder: NewtonRaphson::from_config(&config),
            config,
        }
    }
}

impl CollisionSolver<NewtonRaphson> {
    pub fn new(config: SolverConfig) -> Result<Self, ConfigError> {
        Self::with_root_finder(config, NewtonRaphson::from_config(&config))
    }
}

impl<R: RootFinder> CollisionSolver<R> {
    pub fn with_root_finder(config: SolverConfig, root_finder: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(CollisionSolver {
            config,
            root_finder,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn root_finder(&self) -> &R {
        &self.root_finder
    }

    /// Solve one collision.
    ///
    /// # Examples
    ///
    /// ```
    /// use qsis::collision::{CollisionInput, CollisionMode, CollisionSolver};
    ///
    /// let solver = CollisionSolver::default();
    /// let input = CollisionInput::from_raw((1.0, 0.6), (1.0, -0.3), CollisionMode::Elastic).unwrap();
    /// let result = solver.solve(&input).unwrap();
    ///
    /// let (v1, v2) = result.velocities();
    /// assert!((v1 + 0.3).abs() < 1e-4);
    /// assert!((v2 - 0.6).abs() < 1e-4);
    /// ```
    pub fn solve(&self, input: &CollisionInput) -> Result<CollisionResult, CollisionError> {
        debug!(
            mode = %input.mode,
            m1 = input.particle1.mass(),
            v1 = input.particle1.velocity(),
            m2 = input.particle2.mass(),
            v2 = input.particle2.velocity(),
            "solving collision"
        );

        let pre = input.pre_collision();
        let result = match input.mode {
            CollisionMode::Elastic => self.solve_elastic(input, &pre)?,
            CollisionMode::PerfectlyInelastic => self.solve_inelastic(input, &pre)?,
        };

        if let Some(warning) = &result.warning {
            warn!(mode = %input.mode, "{warning}");
        }
        debug!(
            iterations = result.iterations,
            v1_out = result.particle1_out.velocity,
            v2_out = result.particle2_out.velocity,
            "collision solved"
        );

        Ok(result)
    }

    /// Validate raw `(mass, velocity)` pairs and solve. Invalid input fails
    /// with [`CollisionError::Domain`] before the root finder is touched.
    pub fn solve_raw(
        &self,
        particle1: (f64, f64),
        particle2: (f64, f64),
        mode: CollisionMode,
    ) -> Result<CollisionResult, CollisionError> {
        let input = CollisionInput::from_raw(particle1, particle2, mode)?;
        self.solve(&input)
    }

    /// Solve independent collisions in parallel. Results keep input order.
    pub fn solve_batch(
        &self,
        inputs: &[CollisionInput],
    ) -> Vec<Result<CollisionResult, CollisionError>> {
        inputs.par_iter().map(|input| self.solve(input)).collect()
    }

    /// Merged body of mass m1 + m2; only momentum is conserved.
    fn solve_inelastic(
        &self,
        input: &CollisionInput,
        pre: &PreCollision,
    ) -> Result<CollisionResult, CollisionError> {
        let (m1, v1) = (input.particle1.mass(), input.particle1.velocity());
        let (m2, v2) = (input.particle2.mass(), input.particle2.velocity());
        let merged_mass = m1 + m2;
        let scale = pre.energy_total;
        let p_total = pre.momentum_total;

        let residual = |x: &DVector<f64>| {
            DVector::from_element(1, (momentum_or_nan(merged_mass, x[0]) - p_total) / scale)
        };

        // Newtonian estimate
        let guess = (m1 * v1 + m2 * v2) / merged_mass;
        let found = self
            .root_finder
            .find_root(&residual, DVector::from_element(1, guess));
        let root = self
            .settle(found, &residual, scale)
            .map_err(|e| divergence(input.mode, e.into()))?;

        let vf = root.x[0];
        let particle1_out = outgoing(input.mode, merged_mass, vf)?;
        let particle2_out = OutgoingState::vacant(vf);

        let conservation_error = ConservationError {
            delta_energy: None,
            delta_momentum: particle1_out.momentum + particle2_out.momentum - p_total,
        };

        Ok(self.assemble(
            input.mode,
            pre,
            (particle1_out, particle2_out),
            conservation_error,
            root.iterations,
            false,
        ))
    }

    /// Two unknowns (v1', v2'), momentum and energy both conserved.
    fn solve_elastic(
        &self,
        input: &CollisionInput,
        pre: &PreCollision,
    ) -> Result<CollisionResult, CollisionError> {
        let (m1, v1) = (input.particle1.mass(), input.particle1.velocity());
        let (m2, v2) = (input.particle2.mass(), input.particle2.velocity());

        // Zero relative velocity: the bodies never meet
        if (v1 - v2).abs() <= f64::EPSILON {
            let conservation_error = ConservationError {
                delta_energy: Some(0.0),
                delta_momentum: 0.0,
            };
            return Ok(self.assemble(
                input.mode,
                pre,
                (outgoing(input.mode, m1, v1)?, outgoing(input.mode, m2, v2)?),
                conservation_error,
                0,
                false,
            ));
        }

        let scale = pre.energy_total;
        let (e_total, p_total) = (pre.energy_total, pre.momentum_total);

        let residual = |x: &DVector<f64>| {
            let p = momentum_or_nan(m1, x[0]) + momentum_or_nan(m2, x[1]);
            let e = energy_or_nan(m1, x[0]) + energy_or_nan(m2, x[1]);
            DVector::from_vec(vec![(p - p_total) / scale, (e - e_total) / scale])
        };

        let accept = |found: Result<Root, RootFinderError>| -> Result<Root, Divergence> {
            let root = self.settle(found, &residual, scale)?;
            let (a, b) = (root.x[0], root.x[1]);
            if let Some(velocity) = [a, b].into_iter().find(|v| !is_subluminal(*v)) {
                return Err(Divergence::Unphysical { velocity });
            }
            let from_identity = (a - v1).abs() + (b - v2).abs();
            if from_identity <= TRIVIAL_ROOT_FRACTION * (v1 - v2).abs() {
                return Err(Divergence::TrivialRoot);
            }
            Ok(root)
        };

        // Exact velocity exchange for equal masses
        let swapped = DVector::from_vec(vec![v2, v1]);
        let (root, used_fallback_seed) = match accept(self.root_finder.find_root(&residual, swapped)) {
            Ok(root) => (root, false),
            Err(cause) => {
                warn!(%cause, "swapped seed failed, retrying from center-of-momentum reflection");
                let (r1, r2) = frame::elastic_reflection(input)
                    .map_err(|_| divergence(input.mode, cause.clone()))?;
                let retry = self
                    .root_finder
                    .find_root(&residual, DVector::from_vec(vec![r1, r2]));
                (accept(retry).map_err(|cause| divergence(input.mode, cause))?, true)
            }
        };

        let particle1_out = outgoing(input.mode, m1, root.x[0])?;
        let particle2_out = outgoing(input.mode, m2, root.x[1])?;

        let conservation_error = ConservationError {
            delta_energy: Some(particle1_out.energy + particle2_out.energy - e_total),
            delta_momentum: particle1_out.momentum + particle2_out.momentum - p_total,
        };

        Ok(self.assemble(
            input.mode,
            pre,
            (particle1_out, particle2_out),
            conservation_error,
            root.iterations,
            used_fallback_seed,
        ))
    }

    /// A search that stopped short of `residual_tolerance` still yields a root
    /// when its best point already conserves every residual quantity to within
    /// `conservation_tolerance`. `scale` undoes the residual normalisation.
    fn settle(
        &self,
        found: Result<Root, RootFinderError>,
        residual: &Residual<'_>,
        scale: f64,
    ) -> Result<Root, RootFinderError> {
        let err = match found {
            Ok(root) => return Ok(root),
            Err(err) => err,
        };
        let (best, iterations) = match &err {
            RootFinderError::NotConverged {
                best, iterations, ..
            } => (best, *iterations),
            RootFinderError::Stalled {
                best, iteration, ..
            } => (best, *iteration),
            _ => return Err(err),
        };

        let fx = residual(best);
        let tolerance = self.config.conservation_tolerance;
        if !fx.iter().all(|c| c.is_finite() && (c * scale).abs() <= tolerance) {
            return Err(err);
        }

        debug!(%err, "keeping best iterate, conservation already within tolerance");
        Ok(Root {
            x: best.clone(),
            residual_norm: fx.norm(),
            iterations,
        })
    }

    fn assemble(
        &self,
        mode: CollisionMode,
        pre: &PreCollision,
        (particle1_out, particle2_out): (OutgoingState, OutgoingState),
        conservation_error: ConservationError,
        iterations: usize,
        used_fallback_seed: bool,
    ) -> CollisionResult {
        let tolerance = self.config.conservation_tolerance;
        let warning = conservation_error
            .exceeds(tolerance)
            .then_some(ConservationWarning {
                error: conservation_error,
                tolerance,
            });

        CollisionResult {
            mode,
            pre_collision: *pre,
            particle1_out,
            particle2_out,
            conservation_error,
            warning,
            iterations,
            used_fallback_seed,
        }
    }
}

fn is_subluminal(v: f64) -> bool {
    v.abs() < 1.0
}

fn divergence(mode: CollisionMode, cause: Divergence) -> CollisionError {
    CollisionError::SolverDivergence { mode, cause }
}

/// Outgoing slot with the speed bound enforced; a root at or past light
/// speed is a divergence, never a domain error.
fn outgoing(mode: CollisionMode, mass: f64, velocity: f64) -> Result<OutgoingState, CollisionError> {
    if !is_subluminal(velocity) {
        return Err(divergence(mode, Divergence::Unphysical { velocity }));
    }
    OutgoingState::new(mass, velocity)
        .map_err(|_| divergence(mode, Divergence::Unphysical { velocity }))
}

fn momentum_or_nan(mass: f64, v: f64) -> f64 {
    special::momentum(mass, v).unwrap_or(f64::NAN)
}

fn energy_or_nan(mass: f64, v: f64) -> f64 {
    special::energy(mass, v).unwrap_or(f64::NAN)
}

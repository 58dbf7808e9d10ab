use thiserror::Error;

use crate::collision::particle::CollisionMode;
use crate::collision::root_finder::RootFinderError;

/// Invalid kinematic input: a velocity at or beyond light speed, a
/// non-positive mass, or a non-finite number.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum KinematicsError {
    #[error("velocity {velocity} is not strictly inside (-1, 1)")]
    Superluminal { velocity: f64 },
    #[error("mass {mass} must be positive")]
    NonPositiveMass { mass: f64 },
    #[error("{quantity} is not finite ({value})")]
    NonFinite { quantity: &'static str, value: f64 },
}

/// Why a solve could not produce a physical outgoing state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Divergence {
    #[error(transparent)]
    RootFinder(#[from] RootFinderError),
    #[error("root finder returned unphysical velocity {velocity}")]
    Unphysical { velocity: f64 },
    #[error("root finder only recovered the incoming velocities")]
    TrivialRoot,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollisionError {
    #[error("invalid input: {0}")]
    Domain(#[from] KinematicsError),
    #[error("{mode} collision did not converge: {cause}")]
    SolverDivergence {
        mode: CollisionMode,
        cause: Divergence,
    },
}

impl CollisionError {
    /// Divergence depends on the seed and solver settings, so a caller may
    /// retry; a domain error will fail the same way every time.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CollisionError::SolverDivergence { .. })
    }
}

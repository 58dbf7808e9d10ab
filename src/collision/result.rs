use std::fmt;

use serde::Serialize;

use crate::collision::error::KinematicsError;
use crate::collision::particle::{CollisionMode, PreCollision};
use crate::relativity::special;

/// One outgoing slot of a collision.
///
/// After a perfectly inelastic collision the second slot is vacant: zero
/// mass, energy and momentum, moving with the merged body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutgoingState {
    pub mass: f64,
    pub velocity: f64,
    pub momentum: f64,
    pub energy: f64,
}

impl OutgoingState {
    pub fn new(mass: f64, velocity: f64) -> Result<Self, KinematicsError> {
        Ok(OutgoingState {
            mass,
            velocity,
            momentum: special::momentum(mass, velocity)?,
            energy: special::energy(mass, velocity)?,
        })
    }

    pub fn vacant(velocity: f64) -> Self {
        OutgoingState {
            mass: 0.0,
            velocity,
            momentum: 0.0,
            energy: 0.0,
        }
    }

    pub fn is_vacant(&self) -> bool {
        self.mass == 0.0
    }

    pub fn gamma(&self) -> f64 {
        1.0 / (1.0 - self.velocity * self.velocity).sqrt()
    }
}

/// Residual conservation error after a solve.
///
/// `delta_energy` is `None` for perfectly inelastic collisions, where kinetic
/// energy becomes rest mass and total energy is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConservationError {
    pub delta_energy: Option<f64>,
    pub delta_momentum: f64,
}

impl ConservationError {
    /// Largest checked |Δ|.
    pub fn max_abs(&self) -> f64 {
        self.delta_energy
            .map_or(0.0, f64::abs)
            .max(self.delta_momentum.abs())
    }

    pub fn exceeds(&self, tolerance: f64) -> bool {
        self.max_abs() > tolerance
    }
}

/// Non-fatal diagnostic: the solve produced a physical state but a checked
/// invariant drifted beyond tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConservationWarning {
    pub error: ConservationError,
    pub tolerance: f64,
}

impl fmt::Display for ConservationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conservation error exceeds {:e}: ", self.tolerance)?;
        if let Some(delta_energy) = self.error.delta_energy {
            write!(f, "ΔE = {delta_energy:+.4e}, ")?;
        }
        write!(f, "Δp = {:+.4e}", self.error.delta_momentum)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CollisionResult {
    pub mode: CollisionMode,
    pub pre_collision: PreCollision,
    pub particle1_out: OutgoingState,
    pub particle2_out: OutgoingState,
    pub conservation_error: ConservationError,
    pub warning: Option<ConservationWarning>,
    /// Root finder iterations of the accepted solve.
    pub iterations: usize,
    /// Whether the elastic solve had to restart from the CoM reflection seed.
    pub used_fallback_seed: bool,
}

impl CollisionResult {
    pub fn velocities(&self) -> (f64, f64) {
        (self.particle1_out.velocity, self.particle2_out.velocity)
    }

    pub fn total_energy(&self) -> f64 {
        self.particle1_out.energy + self.particle2_out.energy
    }

    pub fn total_momentum(&self) -> f64 {
        self.particle1_out.momentum + self.particle2_out.momentum
    }

    /// Incoming minus outgoing total energy. For a perfectly inelastic merge
    /// this is the kinetic energy absorbed by the merged body; ≈0 when elastic.
    pub fn energy_released(&self) -> f64 {
        self.pre_collision.energy_total - self.total_energy()
    }

    pub fn is_clean(&self) -> bool {
        self.warning.is_none()
    }
}

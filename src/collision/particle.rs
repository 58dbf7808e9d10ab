use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::collision::error::KinematicsError;
use crate::collision::frame;
use crate::relativity::special::{self, KinematicState};

/// A point mass moving along one axis, velocity as a fraction of c.
///
/// Construction is the validation boundary: a `Particle` always has
/// `mass > 0` and `|velocity| < 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    mass: f64,
    velocity: f64,
}

impl Particle {
    /// # Examples
    ///
    /// ```
    /// use qsis::collision::Particle;
    ///
    /// assert!(Particle::new(1.0, 0.6).is_ok());
    /// assert!(Particle::new(1.0, -1.0).is_err());
    /// assert!(Particle::new(0.0, 0.1).is_err());
    /// ```
    pub fn new(mass: f64, velocity: f64) -> Result<Self, KinematicsError> {
        special::check_mass(mass)?;
        special::check_velocity(velocity)?;
        Ok(Particle { mass, velocity })
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn state(&self) -> KinematicState {
        KinematicState::of(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionMode {
    Elastic,
    PerfectlyInelastic,
}

impl fmt::Display for CollisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionMode::Elastic => write!(f, "elastic"),
            CollisionMode::PerfectlyInelastic => write!(f, "perfectly inelastic"),
        }
    }
}

impl FromStr for CollisionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "elastic" => Ok(CollisionMode::Elastic),
            "inelastic" | "perfectly-inelastic" | "perfectly_inelastic" => {
                Ok(CollisionMode::PerfectlyInelastic)
            }
            other => Err(format!(
                "unknown collision mode '{other}' (expected 'elastic' or 'inelastic')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInput {
    pub particle1: Particle,
    pub particle2: Particle,
    pub mode: CollisionMode,
}

impl CollisionInput {
    pub fn new(particle1: Particle, particle2: Particle, mode: CollisionMode) -> Self {
        CollisionInput {
            particle1,
            particle2,
            mode,
        }
    }

    /// Validates raw numbers and builds the input in one step.
    pub fn from_raw(
        (m1, v1): (f64, f64),
        (m2, v2): (f64, f64),
        mode: CollisionMode,
    ) -> Result<Self, KinematicsError> {
        Ok(CollisionInput::new(
            Particle::new(m1, v1)?,
            Particle::new(m2, v2)?,
            mode,
        ))
    }

    pub fn pre_collision(&self) -> PreCollision {
        PreCollision::new(&self.particle1, &self.particle2)
    }

    pub fn center_of_momentum_velocity(&self) -> f64 {
        self.pre_collision().center_of_momentum_velocity()
    }
}

/// Conserved totals of the incoming pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreCollision {
    pub state1: KinematicState,
    pub state2: KinematicState,
    pub energy_total: f64,
    pub momentum_total: f64,
}

impl PreCollision {
    pub fn new(particle1: &Particle, particle2: &Particle) -> Self {
        let state1 = particle1.state();
        let state2 = particle2.state();

        PreCollision {
            state1,
            state2,
            energy_total: state1.energy + state2.energy,
            momentum_total: state1.momentum + state2.momentum,
        }
    }

    /// Always strictly inside (-1, 1) because |p_total| < E_total for two
    /// massive subluminal particles.
    pub fn center_of_momentum_velocity(&self) -> f64 {
        frame::center_of_momentum_velocity(self.energy_total, self.momentum_total)
    }

    /// Total energy seen from the center-of-momentum frame.
    pub fn invariant_mass(&self) -> f64 {
        special::invariant_mass(self.energy_total, self.momentum_total)
    }
}

//! Special-relativistic kinematics in natural units (c = 1).
//!
//! Velocities are fractions of light speed and masses, energies and momenta
//! share one unit. Every function that takes a velocity rejects `|v| >= 1`
//! instead of returning an infinite or NaN Lorentz factor.

use serde::Serialize;

use crate::collision::error::KinematicsError;
use crate::collision::particle::Particle;

/// Lorentz factor γ = 1 / sqrt(1 - v²)
///
/// # Examples
///
/// ```
/// use qsis::relativity::special::lorentz_factor;
///
/// let gamma = lorentz_factor(0.6).unwrap();
/// assert!((gamma - 1.25).abs() < 1e-12);
/// assert!(lorentz_factor(1.0).is_err());
/// ```
pub fn lorentz_factor(v: f64) -> Result<f64, KinematicsError> {
    check_velocity(v)?;
    Ok(lorentz_factor_unchecked(v))
}

/// γ for a velocity already known to be subluminal.
fn lorentz_factor_unchecked(v: f64) -> f64 {
    1.0 / (1.0 - v * v).sqrt()
}

/// Relativistic momentum p = γmv
pub fn momentum(mass: f64, v: f64) -> Result<f64, KinematicsError> {
    check_mass(mass)?;
    Ok(lorentz_factor(v)? * mass * v)
}

/// Total energy E = γm
pub fn energy(mass: f64, v: f64) -> Result<f64, KinematicsError> {
    check_mass(mass)?;
    Ok(lorentz_factor(v)? * mass)
}

/// Kinetic energy K = (γ - 1)m
pub fn kinetic_energy(mass: f64, v: f64) -> Result<f64, KinematicsError> {
    Ok(energy(mass, v)? - mass)
}

/// Invariant mass sqrt(E² - p²) of a system with total energy `energy` and
/// total momentum `momentum`.
///
/// Returns zero when rounding pushes E² - p² slightly negative.
pub fn invariant_mass(energy: f64, momentum: f64) -> f64 {
    (energy * energy - momentum * momentum).max(0.0).sqrt()
}

/// E² - p² - m², zero for any on-shell state.
pub fn energy_momentum_residual(mass: f64, energy: f64, momentum: f64) -> f64 {
    energy * energy - momentum * momentum - mass * mass
}

/// Velocity of a body of mass `mass` carrying momentum `momentum`.
///
/// Inverse of [`momentum`]: with u = p/m, v = u / sqrt(1 + u²), which is
/// strictly subluminal for every finite momentum.
pub fn velocity_from_momentum(mass: f64, momentum: f64) -> Result<f64, KinematicsError> {
    check_mass(mass)?;
    if !momentum.is_finite() {
        return Err(KinematicsError::NonFinite {
            quantity: "momentum",
            value: momentum,
        });
    }
    let u = momentum / mass;
    Ok(u / (1.0 + u * u).sqrt())
}

/// Relativistic velocity composition (u + v) / (1 + uv).
///
/// Composing a velocity `u` measured in a frame that itself moves at `v`.
pub fn add_velocities(u: f64, v: f64) -> Result<f64, KinematicsError> {
    check_velocity(u)?;
    check_velocity(v)?;
    Ok((u + v) / (1.0 + u * v))
}

/// Derived kinematic quantities of a single particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KinematicState {
    pub gamma: f64,
    pub momentum: f64,
    pub energy: f64,
}

impl KinematicState {
    /// Particles are validated on construction, so this cannot fail.
    pub fn of(particle: &Particle) -> Self {
        let v = particle.velocity();
        let m = particle.mass();
        let gamma = lorentz_factor_unchecked(v);

        KinematicState {
            gamma,
            momentum: gamma * m * v,
            energy: gamma * m,
        }
    }

    pub fn kinetic_energy(&self, mass: f64) -> f64 {
        self.energy - mass
    }
}

pub(crate) fn check_velocity(v: f64) -> Result<(), KinematicsError> {
    if !v.is_finite() {
        return Err(KinematicsError::NonFinite {
            quantity: "velocity",
            value: v,
        });
    }
    if v.abs() >= 1.0 {
        return Err(KinematicsError::Superluminal { velocity: v });
    }
    Ok(())
}

pub(crate) fn check_mass(mass: f64) -> Result<(), KinematicsError> {
    if !mass.is_finite() {
        return Err(KinematicsError::NonFinite {
            quantity: "mass",
            value: mass,
        });
    }
    if mass <= 0.0 {
        return Err(KinematicsError::NonPositiveMass { mass });
    }
    Ok(())
}

//! Center-of-momentum frame.
//!
//! In the CoM frame the two momenta cancel, so a one-dimensional elastic
//! collision can only reverse both velocities. Boosting that reversal back
//! to the lab frame gives the physical elastic outcome in closed form.

use crate::collision::error::KinematicsError;
use crate::collision::particle::CollisionInput;
use crate::relativity::special::add_velocities;

/// v_com = p_total / E_total
pub fn center_of_momentum_velocity(energy_total: f64, momentum_total: f64) -> f64 {
    momentum_total / energy_total
}

/// Velocity `v` (lab frame) as seen from a frame moving at `frame_velocity`.
pub fn to_frame(v: f64, frame_velocity: f64) -> Result<f64, KinematicsError> {
    add_velocities(v, -frame_velocity)
}

/// Velocity `u` measured in a frame moving at `frame_velocity`, back in the lab.
pub fn from_frame(u: f64, frame_velocity: f64) -> Result<f64, KinematicsError> {
    add_velocities(u, frame_velocity)
}

/// Closed-form elastic outcome `(v1', v2')`.
///
/// # Examples
///
/// ```
/// use qsis::collision::{CollisionInput, CollisionMode, frame};
///
/// let input = CollisionInput::from_raw((1.0, 0.5), (1.0, -0.2), CollisionMode::Elastic).unwrap();
/// let (v1, v2) = frame::elastic_reflection(&input).unwrap();
///
/// // Equal masses exchange velocities
/// assert!((v1 + 0.2).abs() < 1e-12);
/// assert!((v2 - 0.5).abs() < 1e-12);
/// ```
pub fn elastic_reflection(input: &CollisionInput) -> Result<(f64, f64), KinematicsError> {
    let w = input.center_of_momentum_velocity();

    let u1 = to_frame(input.particle1.velocity(), w)?;
    let u2 = to_frame(input.particle2.velocity(), w)?;

    Ok((from_frame(-u1, w)?, from_frame(-u2, w)?))
}

use approx::{assert_abs_diff_eq, assert_relative_eq};

use crate::collision::error::KinematicsError;
use crate::collision::particle::Particle;
use crate::relativity::special::*;

#[test]
fn test_lorentz_factor_known_values() {
    assert_relative_eq!(lorentz_factor(0.0).unwrap(), 1.0);
    assert_relative_eq!(lorentz_factor(0.6).unwrap(), 1.25, epsilon = 1e-12);
    assert_relative_eq!(lorentz_factor(-0.8).unwrap(), 5.0 / 3.0, epsilon = 1e-12);
}

#[test]
fn test_lorentz_factor_rejects_light_speed() {
    assert_eq!(
        lorentz_factor(1.0),
        Err(KinematicsError::Superluminal { velocity: 1.0 })
    );
    assert!(lorentz_factor(-1.5).is_err());
    assert!(matches!(
        lorentz_factor(f64::NAN),
        Err(KinematicsError::NonFinite { quantity: "velocity", .. })
    ));
}

#[test]
fn test_momentum_and_energy() {
    assert_relative_eq!(momentum(1.0, 0.6).unwrap(), 0.75, epsilon = 1e-12);
    assert_relative_eq!(energy(1.0, 0.6).unwrap(), 1.25, epsilon = 1e-12);
    assert_relative_eq!(kinetic_energy(2.0, 0.6).unwrap(), 0.5, epsilon = 1e-12);

    // Momentum is odd in velocity, energy is even
    assert_relative_eq!(momentum(3.0, -0.4).unwrap(), -momentum(3.0, 0.4).unwrap());
    assert_relative_eq!(energy(3.0, -0.4).unwrap(), energy(3.0, 0.4).unwrap());
}

#[test]
fn test_non_positive_mass_rejected() {
    assert_eq!(
        momentum(0.0, 0.5),
        Err(KinematicsError::NonPositiveMass { mass: 0.0 })
    );
    assert!(energy(-1.0, 0.5).is_err());
}

#[test]
fn test_energy_momentum_relation_holds() {
    for &mass in &[0.1, 1.0, 7.5] {
        for &v in &[-0.9999, -0.5, 0.0, 0.3, 0.99, 0.999999] {
            let e = energy(mass, v).unwrap();
            let p = momentum(mass, v).unwrap();
            let residual = energy_momentum_residual(mass, e, p);
            assert!(
                residual.abs() <= 1e-9 * e * e,
                "m = {mass}, v = {v}: E² - p² - m² = {residual:e}"
            );
            assert_relative_eq!(invariant_mass(e, p), mass, max_relative = 1e-6);
        }
    }
}

#[test]
fn test_velocity_from_momentum_inverts_momentum() {
    assert_relative_eq!(velocity_from_momentum(1.0, 0.75).unwrap(), 0.6, epsilon = 1e-12);

    for &v in &[-0.99, -0.1, 0.0, 0.42, 0.9999] {
        let p = momentum(2.5, v).unwrap();
        assert_abs_diff_eq!(velocity_from_momentum(2.5, p).unwrap(), v, epsilon = 1e-10);
    }

    // Huge momenta stay subluminal
    assert!(velocity_from_momentum(1.0, 1e12).unwrap() < 1.0);
    assert!(velocity_from_momentum(1.0, f64::INFINITY).is_err());
}

#[test]
fn test_add_velocities() {
    assert_relative_eq!(add_velocities(0.5, 0.5).unwrap(), 0.8, epsilon = 1e-12);
    assert_abs_diff_eq!(add_velocities(0.9, -0.9).unwrap(), 0.0);
    assert!(add_velocities(0.99, 0.99).unwrap() < 1.0);
    assert!(add_velocities(1.0, 0.0).is_err());
}

#[test]
fn test_kinematic_state_of_particle() {
    let particle = Particle::new(2.0, -0.6).unwrap();
    let state = KinematicState::of(&particle);

    assert_relative_eq!(state.gamma, 1.25, epsilon = 1e-12);
    assert_relative_eq!(state.momentum, -1.5, epsilon = 1e-12);
    assert_relative_eq!(state.energy, 2.5, epsilon = 1e-12);
    assert_relative_eq!(state.kinetic_energy(particle.mass()), 0.5, epsilon = 1e-12);
}

#[test]
fn test_kinematic_state_matches_free_functions() {
    let particle = Particle::new(3.0, -0.999).unwrap();
    let state = particle.state();

    assert_eq!(state.gamma, lorentz_factor(-0.999).unwrap());
    assert_eq!(state.momentum, momentum(3.0, -0.999).unwrap());
    assert_eq!(state.energy, energy(3.0, -0.999).unwrap());
}

//! Integration tests for the conservation and speed-bound guarantees of the
//! collision solver across many scenarios.

use qsis::collision::{
    CollisionError, CollisionInput, CollisionMode, CollisionSolver, Divergence,
    KinematicsError, Particle,
};
use qsis::collision::frame::elastic_reflection;
use qsis::metrics::random_inputs;
use qsis::relativity::special::energy_momentum_residual;

fn assert_on_shell(mass: f64, energy: f64, momentum: f64) {
    let residual = energy_momentum_residual(mass, energy, momentum);
    assert!(
        residual.abs() <= 1e-9 * energy * energy,
        "E² - p² - m² = {residual:e} for m = {mass}, E = {energy}, p = {momentum}"
    );
}

#[test]
fn momentum_is_conserved_in_both_modes() {
    let solver = CollisionSolver::default();

    for mode in [CollisionMode::Elastic, CollisionMode::PerfectlyInelastic] {
        for input in random_inputs(500, 2024, mode).unwrap() {
            let pre = input.pre_collision();
            let result = solver.solve(&input).unwrap();

            assert!(
                (result.total_momentum() - pre.momentum_total).abs() < 1e-5,
                "{mode}: Δp = {:e}",
                result.conservation_error.delta_momentum
            );
        }
    }
}

#[test]
fn energy_is_conserved_only_when_elastic() {
    let solver = CollisionSolver::default();

    for input in random_inputs(500, 99, CollisionMode::Elastic).unwrap() {
        let pre = input.pre_collision();
        let result = solver.solve(&input).unwrap();
        assert!((result.total_energy() - pre.energy_total).abs() < 1e-5);
        assert!(result.is_clean());
    }

    for input in random_inputs(100, 99, CollisionMode::PerfectlyInelastic).unwrap() {
        let result = solver.solve(&input).unwrap();
        assert_eq!(result.conservation_error.delta_energy, None);
        // Merging never creates energy
        assert!(result.energy_released() >= -1e-6);
    }
}

#[test]
fn outgoing_states_are_on_shell_and_subluminal() {
    let solver = CollisionSolver::default();

    for mode in [CollisionMode::Elastic, CollisionMode::PerfectlyInelastic] {
        for input in random_inputs(300, 5, mode).unwrap() {
            let pre = input.pre_collision();
            assert_on_shell(input.particle1.mass(), pre.state1.energy, pre.state1.momentum);
            assert_on_shell(input.particle2.mass(), pre.state2.energy, pre.state2.momentum);
            assert!(pre.center_of_momentum_velocity().abs() < 1.0);

            let result = solver.solve(&input).unwrap();
            for out in [result.particle1_out, result.particle2_out] {
                assert!(out.velocity.abs() < 1.0);
                if !out.is_vacant() {
                    assert_on_shell(out.mass, out.energy, out.momentum);
                }
            }
        }
    }
}

#[test]
fn near_light_speed_boundary_scenario() {
    let solver = CollisionSolver::default();
    let input =
        CollisionInput::from_raw((1.0, 0.9999), (1.0, 0.0), CollisionMode::Elastic).unwrap();
    let pre = input.pre_collision();

    let result = solver.solve(&input).unwrap();

    assert!(result.is_clean());
    assert!((result.total_energy() - pre.energy_total).abs() < 1e-5);
    assert!((result.total_momentum() - pre.momentum_total).abs() < 1e-5);
}

#[test]
fn unequal_masses_near_light_speed_converge() {
    let solver = CollisionSolver::default();
    let cases = [
        ((1.0, 0.9999), (5.0, -0.5)),
        ((0.1, 0.999), (10.0, 0.0)),
        ((10.0, -0.995), (0.2, 0.99)),
    ];

    for (a, b) in cases {
        let input = CollisionInput::from_raw(a, b, CollisionMode::Elastic).unwrap();
        let pre = input.pre_collision();
        let result = solver.solve(&input).unwrap();

        assert!((result.total_energy() - pre.energy_total).abs() < 1e-5);
        assert!((result.total_momentum() - pre.momentum_total).abs() < 1e-5);
        // Not the no-collision root
        let (v1, v2) = result.velocities();
        assert!((v1 - a.1).abs() + (v2 - b.1).abs() > 1e-3);
    }
}

#[test]
fn extreme_mass_ratio_head_on_resolves_in_every_orientation() {
    let solver = CollisionSolver::default();
    let cases = [
        ((0.1, 0.999), (10.0, -0.999)),
        ((10.0, -0.999), (0.1, 0.999)),
        ((0.1, -0.999), (10.0, 0.999)),
        ((10.0, 0.999), (0.1, -0.999)),
    ];

    for (a, b) in cases {
        let input = CollisionInput::from_raw(a, b, CollisionMode::Elastic).unwrap();
        let pre = input.pre_collision();
        let (r1, r2) = elastic_reflection(&input).unwrap();

        let result = solver.solve(&input).unwrap();

        assert!(result.is_clean(), "{a:?} vs {b:?}: {:?}", result.warning);
        assert!((result.total_energy() - pre.energy_total).abs() < 1e-5);
        assert!((result.total_momentum() - pre.momentum_total).abs() < 1e-5);
        let (v1, v2) = result.velocities();
        assert!((v1 - r1).abs() < 1e-5, "v1' = {v1}, expected {r1}");
        assert!((v2 - r2).abs() < 1e-5, "v2' = {v2}, expected {r2}");
    }
}

#[test]
fn light_speed_input_is_rejected_before_solving() {
    assert_eq!(
        Particle::new(1.0, 1.0),
        Err(KinematicsError::Superluminal { velocity: 1.0 })
    );

    let err: CollisionError = Particle::new(1.0, -1.0).unwrap_err().into();
    assert!(!err.is_recoverable());
}

#[test]
fn divergence_is_isolated_per_call() {
    let strict = CollisionSolver::new(qsis::SolverConfig::default().with_max_iterations(1)).unwrap();
    let input =
        CollisionInput::from_raw((1.0, 0.9), (7.0, -0.2), CollisionMode::PerfectlyInelastic)
            .unwrap();

    let outcomes = strict.solve_batch(&[input, input, input]);
    assert!(outcomes.iter().all(|o| o == &outcomes[0]));
    if let Err(err) = &outcomes[0] {
        assert!(matches!(
            err,
            CollisionError::SolverDivergence {
                cause: Divergence::RootFinder(_),
                ..
            }
        ));
    }

    // A default solver is unaffected by the failures above
    assert!(CollisionSolver::default().solve(&input).is_ok());
}

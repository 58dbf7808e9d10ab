//! Batch runs over many collision scenarios and CSV export of their outcomes.

use std::fmt;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

use crate::collision::{
    CollisionError, CollisionInput, CollisionMode, CollisionResult, CollisionSolver,
    KinematicsError, RootFinder,
};

/// Monte Carlo masses are drawn from [MIN_MASS, MAX_MASS).
pub const MIN_MASS: f64 = 0.1;
pub const MAX_MASS: f64 = 10.0;
/// Monte Carlo speeds stay within ±MAX_SPEED.
pub const MAX_SPEED: f64 = 0.999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Warning,
    Diverged,
}

/// One scenario flattened to a CSV row. Outgoing columns are empty when the
/// solve diverged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRecord {
    pub mode: CollisionMode,
    pub m1: f64,
    pub v1: f64,
    pub m2: f64,
    pub v2: f64,
    pub energy_total: f64,
    pub momentum_total: f64,
    pub v_com: f64,
    pub v1_out: Option<f64>,
    pub v2_out: Option<f64>,
    pub e1_out: Option<f64>,
    pub e2_out: Option<f64>,
    pub p1_out: Option<f64>,
    pub p2_out: Option<f64>,
    pub delta_energy: Option<f64>,
    pub delta_momentum: Option<f64>,
    pub iterations: Option<usize>,
    pub status: Status,
}

impl SweepRecord {
    pub fn new(input: &CollisionInput, outcome: &Result<CollisionResult, CollisionError>) -> Self {
        let pre = input.pre_collision();
        let solved = outcome.as_ref().ok();

        SweepRecord {
            mode: input.mode,
            m1: input.particle1.mass(),
            v1: input.particle1.velocity(),
            m2: input.particle2.mass(),
            v2: input.particle2.velocity(),
            energy_total: pre.energy_total,
            momentum_total: pre.momentum_total,
            v_com: pre.center_of_momentum_velocity(),
            v1_out: solved.map(|r| r.particle1_out.velocity),
            v2_out: solved.map(|r| r.particle2_out.velocity),
            e1_out: solved.map(|r| r.particle1_out.energy),
            e2_out: solved.map(|r| r.particle2_out.energy),
            p1_out: solved.map(|r| r.particle1_out.momentum),
            p2_out: solved.map(|r| r.particle2_out.momentum),
            delta_energy: solved.and_then(|r| r.conservation_error.delta_energy),
            delta_momentum: solved.map(|r| r.conservation_error.delta_momentum),
            iterations: solved.map(|r| r.iterations),
            status: match solved {
                Some(r) if r.is_clean() => Status::Ok,
                Some(_) => Status::Warning,
                None => Status::Diverged,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SweepSummary {
    pub solved: usize,
    pub warnings: usize,
    pub diverged: usize,
    pub max_delta_energy: f64,
    pub max_delta_momentum: f64,
}

impl SweepSummary {
    pub fn from_records(records: &[SweepRecord]) -> Self {
        records.iter().fold(SweepSummary::default(), |mut acc, r| {
            match r.status {
                Status::Ok => acc.solved += 1,
                Status::Warning => {
                    acc.solved += 1;
                    acc.warnings += 1;
                }
                Status::Diverged => acc.diverged += 1,
            }
            if let Some(de) = r.delta_energy {
                acc.max_delta_energy = acc.max_delta_energy.max(de.abs());
            }
            if let Some(dp) = r.delta_momentum {
                acc.max_delta_momentum = acc.max_delta_momentum.max(dp.abs());
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.solved + self.diverged
    }
}

impl fmt::Display for SweepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} scenarios: {} solved ({} with warnings), {} diverged | max |ΔE| = {:.3e}, max |Δp| = {:.3e}",
            self.total(),
            self.solved,
            self.warnings,
            self.diverged,
            self.max_delta_energy,
            self.max_delta_momentum
        )
    }
}

/// Solve every input in parallel and flatten the outcomes.
pub fn run_batch<R: RootFinder>(
    solver: &CollisionSolver<R>,
    inputs: &[CollisionInput],
) -> Vec<SweepRecord> {
    inputs
        .iter()
        .zip(solver.solve_batch(inputs))
        .map(|(input, outcome)| SweepRecord::new(input, &outcome))
        .collect()
}

/// Sweep v1 over `steps` evenly spaced values strictly inside (-1, 1) with the
/// second particle fixed.
pub fn velocity_sweep<R: RootFinder>(
    solver: &CollisionSolver<R>,
    (m1, m2): (f64, f64),
    v2: f64,
    mode: CollisionMode,
    steps: usize,
) -> Result<Vec<SweepRecord>, KinematicsError> {
    let inputs = (1..=steps)
        .map(|i| {
            let v1 = -1.0 + 2.0 * i as f64 / (steps + 1) as f64;
            CollisionInput::from_raw((m1, v1), (m2, v2), mode)
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(steps, %mode, "running velocity sweep");
    Ok(run_batch(solver, &inputs))
}

/// Random scenarios from a seeded generator, so a run is reproducible.
///
/// Every draw lies inside the validated domain for the bounds above; an error
/// here means those bounds were changed to something invalid.
pub fn random_inputs(
    samples: usize,
    seed: u64,
    mode: CollisionMode,
) -> Result<Vec<CollisionInput>, KinematicsError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..samples)
        .map(|_| {
            let m1 = rng.gen_range(MIN_MASS..MAX_MASS);
            let v1 = rng.gen_range(-MAX_SPEED..MAX_SPEED);
            let m2 = rng.gen_range(MIN_MASS..MAX_MASS);
            let v2 = rng.gen_range(-MAX_SPEED..MAX_SPEED);
            CollisionInput::from_raw((m1, v1), (m2, v2), mode)
        })
        .collect()
}

pub fn monte_carlo<R: RootFinder>(
    solver: &CollisionSolver<R>,
    samples: usize,
    seed: u64,
    mode: CollisionMode,
) -> Result<(Vec<SweepRecord>, SweepSummary), KinematicsError> {
    info!(samples, seed, %mode, "running monte carlo");
    let records = run_batch(solver, &random_inputs(samples, seed, mode)?);
    let summary = SweepSummary::from_records(&records);
    Ok((records, summary))
}

pub fn export_csv(path: impl AsRef<Path>, records: &[SweepRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use qsis::collision::{CollisionMode, CollisionResult, CollisionSolver};
use qsis::config::{DEFAULT_CONSERVATION_TOLERANCE, SolverConfig};
use qsis::metrics;

/// QSIS - relativistic collision kinematics (natural units, c = 1)
#[derive(Parser)]
#[command(name = "qsis", about = "Solve 1D relativistic two-body collisions")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Conservation tolerance for |ΔE| and |Δp|
    #[arg(long, global = true, default_value_t = DEFAULT_CONSERVATION_TOLERANCE)]
    tolerance: f64,

    /// Root finder iteration cap
    #[arg(long, global = true, default_value_t = 100)]
    max_iterations: usize,

    /// Log solver internals (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single collision and print both states
    Solve(SolveArgs),
    /// Sweep v1 across (-1, 1) and export to CSV
    Sweep(SweepArgs),
    /// Solve random scenarios and summarise conservation errors
    MonteCarlo(MonteCarloArgs),
    /// Print the effective solver configuration as JSON
    Config,
}

#[derive(Args, Clone)]
struct SolveArgs {
    #[arg(long, default_value_t = 1.0)]
    m1: f64,
    /// Velocity of particle 1 as a fraction of c
    #[arg(long, default_value_t = 0.6, allow_negative_numbers = true)]
    v1: f64,
    #[arg(long, default_value_t = 1.0)]
    m2: f64,
    /// Velocity of particle 2 as a fraction of c
    #[arg(long, default_value_t = -0.3, allow_negative_numbers = true)]
    v2: f64,
    /// elastic | inelastic
    #[arg(long, default_value = "elastic")]
    mode: CollisionMode,
    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

impl Default for SolveArgs {
    fn default() -> Self {
        SolveArgs {
            m1: 1.0,
            v1: 0.6,
            m2: 1.0,
            v2: -0.3,
            mode: CollisionMode::Elastic,
            json: false,
        }
    }
}

#[derive(Args)]
struct SweepArgs {
    #[arg(long, default_value_t = 1.0)]
    m1: f64,
    #[arg(long, default_value_t = 1.0)]
    m2: f64,
    /// Fixed velocity of particle 2
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    v2: f64,
    #[arg(long, default_value = "elastic")]
    mode: CollisionMode,
    #[arg(long, default_value_t = 99)]
    steps: usize,
    #[arg(short, long, default_value = "sweep.csv")]
    output: PathBuf,
}

#[derive(Args)]
struct MonteCarloArgs {
    #[arg(long, default_value_t = 10_000)]
    samples: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value = "elastic")]
    mode: CollisionMode,
    /// Also write every scenario to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = SolverConfig::default()
        .with_conservation_tolerance(cli.tolerance)
        .with_max_iterations(cli.max_iterations);
    let solver = CollisionSolver::new(config).context("invalid solver configuration")?;

    match cli.command {
        Some(Commands::Solve(args)) => run_solve(&solver, &args)?,
        Some(Commands::Sweep(args)) => run_sweep(&solver, &args)?,
        Some(Commands::MonteCarlo(args)) => run_monte_carlo(&solver, &args)?,
        Some(Commands::Config) => println!("{}", serde_json::to_string_pretty(solver.config())?),
        None => run_solve(&solver, &SolveArgs::default())?, // default demo
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "qsis=debug" } else { "qsis=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_solve(solver: &CollisionSolver, args: &SolveArgs) -> Result<()> {
    let result = solver.solve_raw((args.m1, args.v1), (args.m2, args.v2), args.mode)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(args, &result);
    }
    Ok(())
}

fn print_result(args: &SolveArgs, result: &CollisionResult) {
    let pre = &result.pre_collision;
    let (out1, out2) = (&result.particle1_out, &result.particle2_out);

    println!("{} collision", result.mode);
    println!("Initial state");
    println!(
        "  v1 = {:.4}, E1 = {:.4}, p1 = {:.4}",
        args.v1,
        pre.state1.energy,
        pre.state1.momentum
    );
    println!(
        "  v2 = {:.4}, E2 = {:.4}, p2 = {:.4}",
        args.v2,
        pre.state2.energy,
        pre.state2.momentum
    );
    println!(
        "  E_total = {:.4}, p_total = {:.4}",
        pre.energy_total, pre.momentum_total
    );

    println!("Final state");
    println!(
        "  v1' = {:.4}, E1' = {:.4}, p1' = {:.4}",
        out1.velocity, out1.energy, out1.momentum
    );
    println!(
        "  v2' = {:.4}, E2' = {:.4}, p2' = {:.4}",
        out2.velocity, out2.energy, out2.momentum
    );
    match result.conservation_error.delta_energy {
        Some(de) => println!(
            "  ΔE = {de:+.4e}, Δp = {:+.4e}",
            result.conservation_error.delta_momentum
        ),
        None => println!(
            "  Δp = {:+.4e} (energy not conserved, {:.4} absorbed)",
            result.conservation_error.delta_momentum,
            result.energy_released()
        ),
    }

    if let Some(warning) = &result.warning {
        println!("⚠️  {warning}");
    }
    println!(
        "Center-of-momentum velocity: v_com = {:.4}",
        pre.center_of_momentum_velocity()
    );
}

fn run_sweep(solver: &CollisionSolver, args: &SweepArgs) -> Result<()> {
    let records = metrics::velocity_sweep(solver, (args.m1, args.m2), args.v2, args.mode, args.steps)
        .context("invalid sweep parameters")?;

    metrics::export_csv(&args.output, &records)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!("{}", metrics::SweepSummary::from_records(&records));
    println!("✅ Sweep written to {}", args.output.display());
    Ok(())
}

fn run_monte_carlo(solver: &CollisionSolver, args: &MonteCarloArgs) -> Result<()> {
    let (records, summary) = metrics::monte_carlo(solver, args.samples, args.seed, args.mode)
        .context("invalid monte carlo bounds")?;

    if let Some(path) = &args.output {
        metrics::export_csv(path, &records)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("✅ Scenarios written to {}", path.display());
    }

    println!("{summary}");
    Ok(())
}

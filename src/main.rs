use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use validator::Validate;

use ising_sim::config::{LatticeConfig, RunConfig, ScanConfig, TrajectoryConfig};
use ising_sim::export::{write_scan_csv, TrajectoryWriter};
use ising_sim::geometry::Grid;
use ising_sim::lattice::Lattice;
use ising_sim::scan::run_temperature_scan;
use ising_sim::simulation::run_with_export;

#[derive(Parser)]
#[command(name = "ising-sim", about = "Metropolis Monte Carlo Ising model simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a full trajectory: one lattice snapshot and one observable row per sweep.
    Maps(MapsArgs),
    /// Scan a temperature range, one convergence-bounded run per temperature.
    Scan(ScanArgs),
}

#[derive(Args)]
struct MapsArgs {
    #[arg(default_value_t = 150)]
    size_x: usize,
    #[arg(default_value_t = 150)]
    size_y: usize,
    #[arg(default_value_t = 100_000)]
    nb_steps: usize,
    #[arg(default_value_t = 0.1)]
    temperature: f64,
    #[arg(default_value = "ising_map")]
    filename: String,
    /// Output directory; derived from the extents and temperature if omitted.
    out_dir: Option<PathBuf>,
    #[arg(default_value_t = 1.0)]
    anisotropy_x: f64,
    #[arg(default_value_t = 1.0)]
    anisotropy_y: f64,
    /// Third extent; switches to the 3D lattice.
    #[arg(long)]
    size_z: Option<usize>,
    #[arg(long, default_value_t = 1.0)]
    anisotropy_z: f64,
    #[arg(long, default_value_t = 0.45)]
    init_probability: f64,
}

#[derive(Args)]
struct ScanArgs {
    #[arg(default_value_t = 150)]
    size_x: usize,
    #[arg(default_value_t = 150)]
    size_y: usize,
    #[arg(default_value_t = 0.1)]
    t_min: f64,
    #[arg(default_value_t = 1.0)]
    t_max: f64,
    #[arg(default_value_t = 0.1)]
    t_step: f64,
    /// Output file; derived from the extents if omitted.
    filename: Option<PathBuf>,
    /// Third extent; switches to the 3D lattice.
    #[arg(long)]
    size_z: Option<usize>,
    /// Sweep cap per temperature.
    #[arg(long, default_value_t = 20_000)]
    steps: usize,
    #[arg(long, default_value_t = 1e-6)]
    threshold: f64,
    #[arg(long, default_value_t = 0.8)]
    init_probability: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Maps(args) => run_maps(args),
        Command::Scan(args) => run_scan(args),
    }
}

fn run_maps(args: MapsArgs) -> anyhow::Result<()> {
    let (shape, anisotropy) = match args.size_z {
        Some(z) => (
            vec![args.size_x, args.size_y, z],
            vec![args.anisotropy_x, args.anisotropy_y, args.anisotropy_z],
        ),
        None => (
            vec![args.size_x, args.size_y],
            vec![args.anisotropy_x, args.anisotropy_y],
        ),
    };
    let lattice_cfg = LatticeConfig {
        shape: shape.clone(),
        anisotropy: anisotropy.clone(),
    };
    lattice_cfg.validate()?;

    let trajectory = TrajectoryConfig {
        n_steps: args.nb_steps,
        temperature: args.temperature,
        init_probability: args.init_probability,
    };
    trajectory.validate()?;

    let out_dir = args.out_dir.unwrap_or_else(|| {
        let sizes: Vec<String> = shape.iter().map(|s| s.to_string()).collect();
        PathBuf::from(format!(
            "ising{}d_results_{}_T{}",
            shape.len(),
            sizes.join("x"),
            args.temperature
        ))
    });

    let grid = match args.size_z {
        Some(z) => Grid::cubic(args.size_x, args.size_y, z),
        None => Grid::square(args.size_x, args.size_y),
    };
    let mut lattice = Lattice::new(grid, trajectory.temperature)?;
    for (axis, &factor) in anisotropy.iter().enumerate() {
        lattice.set_anisotropy(axis, factor)?;
    }
    lattice.initialize_random(trajectory.init_probability);

    info!(
        ?shape,
        temperature = trajectory.temperature,
        n_steps = trajectory.n_steps,
        out_dir = %out_dir.display(),
        "starting trajectory run"
    );

    let mut writer = TrajectoryWriter::create(&out_dir, &args.filename)
        .with_context(|| format!("preparing output directory {}", out_dir.display()))?;
    run_with_export(&mut lattice, trajectory.n_steps, &mut writer)?;
    writer.finish()?;

    info!(out_dir = %out_dir.display(), "trajectory stored");
    Ok(())
}

fn run_scan(args: ScanArgs) -> anyhow::Result<()> {
    let shape = match args.size_z {
        Some(z) => vec![args.size_x, args.size_y, z],
        None => vec![args.size_x, args.size_y],
    };
    let lattice_cfg = LatticeConfig::isotropic(shape.clone());

    let scan = ScanConfig {
        t_min: args.t_min,
        t_max: args.t_max,
        t_step: args.t_step,
        run: RunConfig {
            n_steps: args.steps,
            convergence_threshold: args.threshold,
            init_probability: args.init_probability,
        },
    };

    let filename = args.filename.unwrap_or_else(|| {
        let sizes: Vec<String> = shape.iter().map(|s| s.to_string()).collect();
        PathBuf::from(format!("ising_scan_{}.csv", sizes.join("x")))
    });

    let rows = run_temperature_scan(&scan, &lattice_cfg)?;
    write_scan_csv(&filename, &rows)
        .with_context(|| format!("writing scan table {}", filename.display()))?;

    info!(rows = rows.len(), file = %filename.display(), "scan table stored");
    Ok(())
}

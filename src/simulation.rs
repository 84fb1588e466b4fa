use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::error::IsingError;
use crate::export::TrajectoryWriter;
use crate::lattice::Lattice;
use crate::observables::{self, SimulationResult};
use crate::sweep::metropolis_sweep;

/// Run up to `n_steps` Metropolis sweeps, stopping early once the lattice
/// looks equilibrated.
///
/// After each sweep, the run stops if the ratio of flipped to total spins or
/// the relative change in total energy since the previous sweep falls below
/// `convergence_threshold`. This is a heuristic stopping rule, not a
/// correlation-time-based statistical test. With `n_steps == 0` the initial
/// state's observables are returned unchanged.
pub fn run_until_converged(
    lattice: &mut Lattice,
    n_steps: usize,
    convergence_threshold: f64,
) -> SimulationResult {
    let n_sites = lattice.n_sites() as f64;
    let mut energy = observables::total_energy(lattice);

    for _ in 0..n_steps {
        metropolis_sweep(lattice);

        let flip_ratio = lattice.flips_last_sweep() as f64 / n_sites;
        let new_energy = observables::total_energy(lattice);
        if flip_ratio < convergence_threshold
            || ((new_energy - energy) / energy).abs() < convergence_threshold
        {
            debug!(
                sweeps = lattice.sweeps_completed(),
                flip_ratio, "converged before the sweep cap"
            );
            return observables::measure(lattice);
        }
        energy = new_energy;
    }

    observables::measure(lattice)
}

/// Run exactly `n_steps` sweeps, recording the full trajectory: one lattice
/// snapshot and one time-series row after every sweep. No early stop.
pub fn run_with_export(
    lattice: &mut Lattice,
    n_steps: usize,
    writer: &mut TrajectoryWriter,
) -> Result<(), IsingError> {
    let pb = ProgressBar::new(n_steps as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{msg} [{bar:40}] {pos}/{len} [{elapsed_precise} < {eta_precise}, {per_sec}]",
        )
        .unwrap()
        .progress_chars("=> "),
    );
    pb.set_message("sweeps");

    for step in 0..n_steps {
        metropolis_sweep(lattice);
        writer.write_snapshot(lattice, step)?;
        writer.append_series_row(lattice)?;
        pb.inc(1);
    }
    pb.finish();
    Ok(())
}

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info};
use validator::Validate;

use crate::config::{LatticeConfig, ScanConfig};
use crate::error::IsingError;
use crate::geometry::Grid;
use crate::lattice::Lattice;
use crate::observables::SimulationResult;
use crate::simulation::run_until_converged;

/// One temperature sample and the observables its run converged to.
#[derive(Debug, Clone, Copy)]
pub struct ScanRow {
    pub temperature: f64,
    pub result: SimulationResult,
}

/// Inclusive arithmetic temperature grid: `min, min+step, …` up to the last
/// value ≤ max, `floor((max-min)/step) + 1` samples in total.
///
/// The epsilon keeps the boundary sample from being dropped when the count
/// lands just under an integer after floating-point accumulation
/// (`[0.1, 0.3]` with step `0.1` must yield 3 samples, not 2).
pub fn temperature_grid(t_min: f64, t_max: f64, t_step: f64) -> Vec<f64> {
    let count = ((t_max - t_min) / t_step + 1.0 + 1e-9).floor() as usize;
    (0..count).map(|i| t_min + i as f64 * t_step).collect()
}

/// Run one independent, convergence-bounded simulation per temperature
/// sample, in parallel over the worker pool.
///
/// Each task owns a fresh entropy-seeded lattice, so tasks share no mutable
/// state; the progress bar is the only shared resource and its increments are
/// synchronized internally. Rows come back ordered by temperature index
/// regardless of task completion order.
pub fn run_temperature_scan(
    scan: &ScanConfig,
    lattice_cfg: &LatticeConfig,
) -> Result<Vec<ScanRow>, IsingError> {
    scan.validate()?;
    lattice_cfg.validate()?;

    let temperatures = temperature_grid(scan.t_min, scan.t_max, scan.t_step);
    info!(
        n_temperatures = temperatures.len(),
        t_min = scan.t_min,
        t_max = scan.t_max,
        "starting temperature scan"
    );

    let pb = ProgressBar::new(temperatures.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{msg} [{bar:40}] {pos}/{len} [{elapsed_precise} < {eta_precise}, {per_sec}]",
        )
        .unwrap()
        .progress_chars("=> "),
    );
    pb.set_message("temperatures");

    let rows: Result<Vec<ScanRow>, IsingError> = temperatures
        .par_iter()
        .map(|&temperature| {
            let mut lattice = build_lattice(lattice_cfg, temperature)?;
            lattice.initialize_random(scan.run.init_probability);
            let result =
                run_until_converged(&mut lattice, scan.run.n_steps, scan.run.convergence_threshold);
            debug!(
                temperature,
                sweeps = lattice.sweeps_completed(),
                energy = result.energy,
                "temperature run finished"
            );
            pb.inc(1);
            Ok(ScanRow {
                temperature,
                result,
            })
        })
        .collect();
    pb.finish();
    rows
}

fn build_lattice(cfg: &LatticeConfig, temperature: f64) -> Result<Lattice, IsingError> {
    let grid = match cfg.shape.as_slice() {
        &[x, y] => Grid::square(x, y),
        &[x, y, z] => Grid::cubic(x, y, z),
        _ => {
            return Err(IsingError::Config(format!(
                "shape must have 2 or 3 axes, got {}",
                cfg.shape.len()
            )))
        }
    };
    let mut lattice = Lattice::new(grid, temperature)?;
    for (axis, &factor) in cfg.anisotropy.iter().enumerate() {
        lattice.set_anisotropy(axis, factor)?;
    }
    Ok(lattice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;

    #[test]
    fn test_grid_keeps_boundary_sample() {
        let temps = temperature_grid(0.1, 0.3, 0.1);
        assert_eq!(temps.len(), 3);
        assert!((temps[0] - 0.1).abs() < 1e-12);
        assert!((temps[1] - 0.2).abs() < 1e-12);
        assert!((temps[2] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_grid_with_non_multiple_range() {
        let temps = temperature_grid(1.0, 2.0, 0.3);
        assert_eq!(temps.len(), 4);
        assert!((temps[3] - 1.9).abs() < 1e-12);
    }

    #[test]
    fn test_grid_single_sample() {
        let temps = temperature_grid(0.5, 0.5, 0.1);
        assert_eq!(temps, vec![0.5]);
    }

    #[test]
    fn test_scan_produces_one_ordered_row_per_temperature() {
        let scan = ScanConfig {
            t_min: 0.5,
            t_max: 1.0,
            t_step: 0.25,
            run: RunConfig {
                n_steps: 30,
                convergence_threshold: 1e-12,
                init_probability: 0.8,
            },
        };
        let lattice_cfg = LatticeConfig::isotropic(vec![8, 8]);

        let rows = run_temperature_scan(&scan, &lattice_cfg).unwrap();
        assert_eq!(rows.len(), 3);
        for (row, expected) in rows.iter().zip([0.5, 0.75, 1.0]) {
            assert!((row.temperature - expected).abs() < 1e-12);
            assert!(row.result.energy.is_finite());
            assert!(row.result.magnetization.abs() <= 64.0);
        }
    }

    #[test]
    fn test_scan_rejects_invalid_config() {
        let scan = ScanConfig {
            t_min: 0.0,
            t_max: 1.0,
            t_step: 0.1,
            run: RunConfig {
                n_steps: 10,
                convergence_threshold: 1e-6,
                init_probability: 0.8,
            },
        };
        let lattice_cfg = LatticeConfig::isotropic(vec![8, 8]);
        assert!(run_temperature_scan(&scan, &lattice_cfg).is_err());
    }
}

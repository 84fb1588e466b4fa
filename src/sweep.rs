use rand::Rng;

use crate::lattice::Lattice;
use crate::observables::energy_at;

/// Acceptance probability for an energy-increasing trial move.
///
/// At `temperature == 0` the Boltzmann factor degenerates; every uphill move
/// is rejected deterministically instead of dividing by zero.
#[inline]
pub fn uphill_acceptance(delta_energy: f64, temperature: f64) -> f64 {
    if temperature == 0.0 {
        0.0
    } else {
        (-delta_energy / temperature).exp()
    }
}

/// One Metropolis sweep: `n_sites` single-spin-flip trials, each at a site
/// drawn uniformly at random over the whole grid.
///
/// For each trial, `delta_energy = -2 * energy_at(site)` is the energy change
/// from flipping that spin. Downhill and neutral moves are accepted
/// unconditionally; uphill moves with probability `exp(-delta/T)`. Updates
/// the lattice's sweep and flip counters and returns the number of accepted
/// flips.
pub fn metropolis_sweep(lattice: &mut Lattice) -> usize {
    let n_sites = lattice.n_sites();
    let temperature = lattice.temperature;
    let mut n_flipped = 0;

    for _ in 0..n_sites {
        let site = lattice.rng.gen_range(0..n_sites);
        let delta_energy = -2.0 * energy_at(lattice, site);

        let accept = if delta_energy <= 0.0 {
            true
        } else {
            let p = uphill_acceptance(delta_energy, temperature);
            p > 0.0 && lattice.rng.gen::<f64>() < p
        };

        if accept {
            lattice.spins[site] = -lattice.spins[site];
            n_flipped += 1;
        }
    }

    lattice.sweeps_completed += 1;
    lattice.flips_last_sweep = n_flipped;
    n_flipped
}

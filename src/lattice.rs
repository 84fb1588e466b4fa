use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::error::IsingError;
use crate::geometry::Grid;

/// Spin lattice state for one simulation run.
///
/// Owns the grid geometry, the spin array (+1/−1), the temperature, the
/// per-axis anisotropy factors, and its own PRNG. Every lattice carries an
/// independently seeded generator so that concurrent runs at different
/// temperatures never share random state.
pub struct Lattice {
    pub(crate) grid: Grid,
    /// Spin values, length `grid.n_sites`, each +1 or −1.
    pub(crate) spins: Vec<i8>,
    pub(crate) temperature: f64,
    /// Per-axis anisotropy factors, length `grid.n_dims`.
    anisotropy: Vec<f64>,
    /// Derived coupling strength per direction: the product of the anisotropy
    /// factors of every axis the direction's offset touches.
    pub(crate) couplings: Vec<f64>,
    pub(crate) rng: Xoshiro256StarStar,
    /// Completed sweeps since the last (re)initialization.
    pub(crate) sweeps_completed: usize,
    /// Spin flips accepted during the most recent sweep.
    pub(crate) flips_last_sweep: usize,
}

impl Lattice {
    /// Create a lattice with all spins up and an entropy-seeded generator.
    ///
    /// Rejects negative or non-finite temperatures; `temperature == 0` is
    /// valid (the sweep handles it with a deterministic acceptance branch).
    pub fn new(grid: Grid, temperature: f64) -> Result<Self, IsingError> {
        Self::with_rng(grid, temperature, Xoshiro256StarStar::from_entropy())
    }

    /// Create a lattice with a deterministic seed. Used by tests.
    pub fn with_seed(grid: Grid, temperature: f64, seed: u64) -> Result<Self, IsingError> {
        Self::with_rng(grid, temperature, Xoshiro256StarStar::seed_from_u64(seed))
    }

    fn with_rng(
        grid: Grid,
        temperature: f64,
        rng: Xoshiro256StarStar,
    ) -> Result<Self, IsingError> {
        check_temperature(temperature)?;
        let anisotropy = vec![1.0; grid.n_dims];
        let couplings = derive_couplings(&grid, &anisotropy);
        let spins = vec![1i8; grid.n_sites];
        Ok(Self {
            grid,
            spins,
            temperature,
            anisotropy,
            couplings,
            rng,
            sweeps_completed: 0,
            flips_last_sweep: 0,
        })
    }

    /// Set each site independently to +1 with the given probability, else −1.
    /// Resets the iteration counters.
    pub fn initialize_random(&mut self, probability: f64) {
        for spin in self.spins.iter_mut() {
            *spin = if self.rng.gen::<f64>() < probability {
                1
            } else {
                -1
            };
        }
        self.sweeps_completed = 0;
        self.flips_last_sweep = 0;
    }

    /// Set all spins up and reset the iteration counters.
    pub fn reset_spins(&mut self) {
        self.spins.fill(1);
        self.sweeps_completed = 0;
        self.flips_last_sweep = 0;
    }

    /// Spin at `coords`; out-of-range coordinates wrap around.
    #[inline]
    pub fn get_spin(&self, coords: &[usize]) -> i8 {
        self.spins[self.grid.flat_index(coords)]
    }

    /// Overwrite the spin at `coords`; out-of-range coordinates wrap around.
    #[inline]
    pub fn set_spin(&mut self, coords: &[usize], value: i8) {
        let idx = self.grid.flat_index(coords);
        self.spins[idx] = value;
    }

    /// Coordinates of every site coupled to `coords` under periodic wrap:
    /// 4 sites on a 2D grid, 8 on a 3D grid.
    pub fn neighbor_sites(&self, coords: &[usize]) -> Vec<Vec<usize>> {
        let flat = self.grid.flat_index(coords);
        let mut sites = Vec::with_capacity(self.grid.n_directions * 2);
        for d in 0..self.grid.n_directions {
            for forward in [true, false] {
                sites.push(self.grid.coords_of(self.grid.neighbor(flat, d, forward)));
            }
        }
        sites
    }

    /// Change the temperature between runs. Rejects negative or non-finite
    /// values; zero is valid.
    pub fn set_temperature(&mut self, temperature: f64) -> Result<(), IsingError> {
        check_temperature(temperature)?;
        self.temperature = temperature;
        Ok(())
    }

    /// Scale the coupling strength along one axis. The coupling of a
    /// direction is the product of the factors of every axis its offset
    /// touches, so the 3D xy-diagonal direction carries both the x and y
    /// factors.
    pub fn set_anisotropy(&mut self, axis: usize, factor: f64) -> Result<(), IsingError> {
        if axis >= self.grid.n_dims {
            return Err(IsingError::Config(format!(
                "anisotropy axis {axis} out of range for a {}-dimensional lattice",
                self.grid.n_dims
            )));
        }
        if !factor.is_finite() {
            return Err(IsingError::Config(format!(
                "anisotropy factor for axis {axis} must be finite, got {factor}"
            )));
        }
        self.anisotropy[axis] = factor;
        self.couplings = derive_couplings(&self.grid, &self.anisotropy);
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn n_sites(&self) -> usize {
        self.grid.n_sites
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn anisotropy(&self) -> &[f64] {
        &self.anisotropy
    }

    pub fn sweeps_completed(&self) -> usize {
        self.sweeps_completed
    }

    pub fn flips_last_sweep(&self) -> usize {
        self.flips_last_sweep
    }
}

fn check_temperature(temperature: f64) -> Result<(), IsingError> {
    if !temperature.is_finite() || temperature < 0.0 {
        return Err(IsingError::Config(format!(
            "temperature must be finite and >= 0, got {temperature}"
        )));
    }
    Ok(())
}

fn derive_couplings(grid: &Grid, anisotropy: &[f64]) -> Vec<f64> {
    (0..grid.n_directions)
        .map(|d| {
            grid.offset(d)
                .iter()
                .zip(anisotropy.iter())
                .filter(|(&step, _)| step != 0)
                .map(|(_, &factor)| factor)
                .product()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_all_up() {
        let mut lat = Lattice::with_seed(Grid::square(4, 4), 1.0, 7).unwrap();
        lat.initialize_random(1.0);
        assert!(lat.spins.iter().all(|&s| s == 1));
    }

    #[test]
    fn test_initialize_all_down() {
        let mut lat = Lattice::with_seed(Grid::square(4, 4), 1.0, 7).unwrap();
        lat.initialize_random(0.0);
        assert!(lat.spins.iter().all(|&s| s == -1));
    }

    #[test]
    fn test_spins_stay_in_domain() {
        let mut lat = Lattice::with_seed(Grid::cubic(3, 3, 3), 1.0, 11).unwrap();
        lat.initialize_random(0.5);
        assert!(lat.spins.iter().all(|&s| s == 1 || s == -1));
    }

    #[test]
    fn test_counters_reset_with_spins() {
        let mut lat = Lattice::with_seed(Grid::square(4, 4), 1.0, 3).unwrap();
        lat.sweeps_completed = 5;
        lat.flips_last_sweep = 9;
        lat.initialize_random(0.5);
        assert_eq!(lat.sweeps_completed(), 0);
        assert_eq!(lat.flips_last_sweep(), 0);

        lat.sweeps_completed = 5;
        lat.reset_spins();
        assert_eq!(lat.sweeps_completed(), 0);
        assert!(lat.spins.iter().all(|&s| s == 1));
    }

    #[test]
    fn test_set_spin_wraps() {
        let mut lat = Lattice::with_seed(Grid::square(4, 4), 1.0, 3).unwrap();
        lat.set_spin(&[5, 1], -1);
        assert_eq!(lat.get_spin(&[1, 1]), -1);
    }

    #[test]
    fn test_neighbor_sites_wrap_2d() {
        let lat = Lattice::with_seed(Grid::square(4, 4), 1.0, 3).unwrap();
        let neighbors = lat.neighbor_sites(&[0, 0]);
        assert_eq!(neighbors.len(), 4);
        assert!(neighbors.contains(&vec![3, 0]));
        assert!(neighbors.contains(&vec![0, 3]));
        assert!(neighbors.contains(&vec![1, 0]));
        assert!(neighbors.contains(&vec![0, 1]));
    }

    #[test]
    fn test_neighbor_sites_3d_stencil() {
        let lat = Lattice::with_seed(Grid::cubic(4, 4, 4), 1.0, 3).unwrap();
        let neighbors = lat.neighbor_sites(&[0, 0, 0]);
        assert_eq!(neighbors.len(), 8);
        // Axis pairs plus the two xy-diagonal partners, all wrapped
        assert!(neighbors.contains(&vec![3, 0, 0]));
        assert!(neighbors.contains(&vec![0, 3, 0]));
        assert!(neighbors.contains(&vec![0, 0, 3]));
        assert!(neighbors.contains(&vec![1, 1, 0]));
        assert!(neighbors.contains(&vec![3, 3, 0]));
    }

    #[test]
    fn test_rejects_negative_temperature() {
        assert!(Lattice::with_seed(Grid::square(4, 4), -1.0, 3).is_err());
        let mut lat = Lattice::with_seed(Grid::square(4, 4), 1.0, 3).unwrap();
        assert!(lat.set_temperature(-0.5).is_err());
        assert!(lat.set_temperature(f64::NAN).is_err());
        assert!(lat.set_temperature(0.0).is_ok());
    }

    #[test]
    fn test_diagonal_coupling_is_factor_product() {
        let mut lat = Lattice::with_seed(Grid::cubic(4, 4, 4), 1.0, 3).unwrap();
        lat.set_anisotropy(0, 2.0).unwrap();
        lat.set_anisotropy(1, 3.0).unwrap();
        lat.set_anisotropy(2, 5.0).unwrap();
        assert_eq!(lat.couplings, vec![2.0, 3.0, 5.0, 6.0]);
    }

    #[test]
    fn test_anisotropy_rejects_bad_input() {
        let mut lat = Lattice::with_seed(Grid::square(4, 4), 1.0, 3).unwrap();
        assert!(lat.set_anisotropy(2, 1.5).is_err());
        assert!(lat.set_anisotropy(0, f64::INFINITY).is_err());
    }
}

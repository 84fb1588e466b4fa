use crate::lattice::Lattice;

/// Thermodynamic observables of one lattice state at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationResult {
    pub energy: f64,
    pub magnetization: f64,
    pub specific_heat: f64,
    pub susceptibility: f64,
}

/// Interaction energy of the spin at `site` with its full neighbor set:
/// `-J_d * s(site) * s(neighbor)` summed over all forward and backward
/// neighbors, where `J_d` is the direction's coupling strength.
#[inline]
pub fn energy_at(lattice: &Lattice, site: usize) -> f64 {
    let grid = lattice.grid();
    let si = lattice.spins[site] as f64;
    let mut energy = 0.0;
    for d in 0..grid.n_directions {
        let coupling = lattice.couplings[d];
        let fwd = lattice.spins[grid.neighbor(site, d, true)] as f64;
        let bwd = lattice.spins[grid.neighbor(site, d, false)] as f64;
        energy += -coupling * si * (fwd + bwd);
    }
    energy
}

/// Sum of `energy_at` over all sites.
///
/// Every bond is counted once from each endpoint, so a fully aligned 4×4
/// square lattice reports −64, not −32. All downstream observables and the
/// convergence test are calibrated to this scale.
pub fn total_energy(lattice: &Lattice) -> f64 {
    (0..lattice.n_sites())
        .map(|site| energy_at(lattice, site))
        .sum()
}

/// Plain sum of all spin values, not normalized by the site count.
pub fn total_magnetization(lattice: &Lattice) -> f64 {
    lattice.spins.iter().map(|&s| s as i64).sum::<i64>() as f64
}

/// `E² / N`, a convenience proxy rather than a fluctuation derivative.
pub fn specific_heat(lattice: &Lattice) -> f64 {
    let energy = total_energy(lattice);
    energy * energy / lattice.n_sites() as f64
}

/// `M² / N`, with the unnormalized magnetization above.
pub fn susceptibility(lattice: &Lattice) -> f64 {
    let magnetization = total_magnetization(lattice);
    magnetization * magnetization / lattice.n_sites() as f64
}

/// Snapshot all four observables, computing the energy and magnetization
/// sums once each.
pub fn measure(lattice: &Lattice) -> SimulationResult {
    let energy = total_energy(lattice);
    let magnetization = total_magnetization(lattice);
    let n = lattice.n_sites() as f64;
    SimulationResult {
        energy,
        magnetization,
        specific_heat: energy * energy / n,
        susceptibility: magnetization * magnetization / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Grid;

    const EPS: f64 = 1e-9;

    fn aligned_square() -> Lattice {
        let mut lat = Lattice::with_seed(Grid::square(4, 4), 1.0, 5).unwrap();
        lat.reset_spins();
        lat
    }

    #[test]
    fn test_aligned_square_observables() {
        let lat = aligned_square();
        assert_eq!(total_magnetization(&lat), 16.0);
        // 4 aligned neighbors per site, each bond term −1, bonds double-counted
        assert_eq!(total_energy(&lat), -64.0);
        assert_eq!(specific_heat(&lat), 256.0);
        assert_eq!(susceptibility(&lat), 16.0);

        let result = measure(&lat);
        assert_eq!(result.energy, -64.0);
        assert_eq!(result.magnetization, 16.0);
        assert_eq!(result.specific_heat, 256.0);
        assert_eq!(result.susceptibility, 16.0);
    }

    #[test]
    fn test_aligned_cubic_energy() {
        let mut lat = Lattice::with_seed(Grid::cubic(3, 3, 3), 1.0, 5).unwrap();
        lat.reset_spins();
        // 8 aligned neighbors per site
        assert!((total_energy(&lat) - (-8.0 * 27.0)).abs() < EPS);
    }

    #[test]
    fn test_anisotropy_scales_energy() {
        let mut lat = aligned_square();
        lat.set_anisotropy(0, 2.0).unwrap();
        // Per site: two x-bonds at −2, two y-bonds at −1
        assert!((energy_at(&lat, 0) - (-6.0)).abs() < EPS);
        assert!((total_energy(&lat) - (-96.0)).abs() < EPS);
    }

    #[test]
    fn test_single_flip_energy_bookkeeping() {
        let mut lat = Lattice::with_seed(Grid::square(6, 5), 1.0, 21).unwrap();
        lat.initialize_random(0.5);

        let site = lat.grid().flat_index(&[2, 3]);
        let e0 = total_energy(&lat);
        let delta = -2.0 * energy_at(&lat, site);

        // Flipping one spin negates its bond terms on both endpoints of each
        // bond, so the double-counted total shifts by twice the single-site
        // delta.
        let flipped = -lat.get_spin(&[2, 3]);
        lat.set_spin(&[2, 3], flipped);
        let e1 = total_energy(&lat);
        assert!((e1 - e0 - 2.0 * delta).abs() < EPS);

        // Flipping back restores the total exactly
        lat.set_spin(&[2, 3], -flipped);
        let e2 = total_energy(&lat);
        assert!((e2 - e0).abs() < EPS);
    }

    #[test]
    fn test_mixed_state_magnetization() {
        let mut lat = aligned_square();
        lat.set_spin(&[0, 0], -1);
        lat.set_spin(&[1, 2], -1);
        assert_eq!(total_magnetization(&lat), 12.0);
        assert_eq!(susceptibility(&lat), 9.0);
    }
}

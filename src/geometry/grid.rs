use super::offsets::{cubic_with_xy_diagonal, hypercubic};

/// Periodic lattice geometry with a precomputed neighbor table.
///
/// Sites are indexed in row-major (C) order. Each site is coupled to
/// `2 * n_directions` neighbors: one forward and one backward partner per
/// offset, with periodic wraparound in every axis.
pub struct Grid {
    /// Extent along each dimension (e.g. `[150, 150]`).
    pub shape: Vec<usize>,
    /// Row-major strides: `strides[d] = product of shape[d+1..]`.
    pub strides: Vec<usize>,
    /// Total number of sites (`shape.iter().product()`).
    pub n_sites: usize,
    /// Number of spatial dimensions (`shape.len()`).
    pub n_dims: usize,
    /// Number of forward neighbor directions per site.
    pub n_directions: usize,
    /// Forward offset vectors, one per direction, each of length `n_dims`.
    offsets: Vec<Vec<isize>>,
    /// Precomputed neighbor table, length `n_sites * n_directions * 2`.
    /// Layout: `neighbors[(i * n_directions + d) * 2 + dir]` where `dir = 0`
    /// is forward and `dir = 1` is backward.
    neighbors: Vec<u32>,
}

impl Grid {
    /// 2D grid with the 4-neighbor square stencil.
    pub fn square(size_x: usize, size_y: usize) -> Self {
        Self::with_offsets(vec![size_x, size_y], hypercubic(2))
    }

    /// 3D grid with the 8-neighbor stencil (±x, ±y, ±z and the xy diagonal pair).
    pub fn cubic(size_x: usize, size_y: usize, size_z: usize) -> Self {
        Self::with_offsets(vec![size_x, size_y, size_z], cubic_with_xy_diagonal())
    }

    /// Create a grid with arbitrary forward neighbor offsets.
    ///
    /// Each offset is a vector of length `n_dims` specifying a displacement in
    /// lattice coordinates. The backward neighbor is the negation of the
    /// offset. Periodic boundary conditions are applied via `rem_euclid`.
    pub fn with_offsets(shape: Vec<usize>, offsets: Vec<Vec<isize>>) -> Self {
        let n_dims = shape.len();
        let n_directions = offsets.len();
        let n_sites: usize = shape.iter().product();

        for (idx, off) in offsets.iter().enumerate() {
            assert_eq!(
                off.len(),
                n_dims,
                "offset {idx} has length {}, expected {n_dims}",
                off.len(),
            );
        }

        let mut strides = vec![1usize; n_dims];
        for d in (0..n_dims.saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * shape[d + 1];
        }

        let mut neighbors = vec![0u32; n_sites * n_directions * 2];

        for i in 0..n_sites {
            let coords: Vec<usize> = (0..n_dims).map(|d| (i / strides[d]) % shape[d]).collect();

            for (d, off) in offsets.iter().enumerate() {
                for (dir, sign) in [(0, 1isize), (1, -1isize)] {
                    let mut flat = 0usize;
                    for dim in 0..n_dims {
                        let c = (coords[dim] as isize + sign * off[dim])
                            .rem_euclid(shape[dim] as isize)
                            as usize;
                        flat += c * strides[dim];
                    }
                    neighbors[(i * n_directions + d) * 2 + dir] = flat as u32;
                }
            }
        }

        Self {
            shape,
            strides,
            n_sites,
            n_dims,
            n_directions,
            offsets,
            neighbors,
        }
    }

    /// Return the neighbor of site `flat_idx` in direction `d`.
    /// `forward = true` means +offset, `forward = false` means −offset.
    #[inline]
    pub fn neighbor(&self, flat_idx: usize, d: usize, forward: bool) -> usize {
        self.neighbors[(flat_idx * self.n_directions + d) * 2 + (!forward as usize)] as usize
    }

    /// Forward offset vector of direction `d`.
    pub fn offset(&self, d: usize) -> &[isize] {
        &self.offsets[d]
    }

    /// Flat row-major index of `coords`, wrapping each coordinate into range.
    #[inline]
    pub fn flat_index(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.n_dims);
        coords
            .iter()
            .zip(self.shape.iter().zip(self.strides.iter()))
            .map(|(&c, (&size, &stride))| (c % size) * stride)
            .sum()
    }

    /// Coordinates of the site at `flat_idx`.
    pub fn coords_of(&self, flat_idx: usize) -> Vec<usize> {
        (0..self.n_dims)
            .map(|d| (flat_idx / self.strides[d]) % self.shape[d])
            .collect()
    }
}

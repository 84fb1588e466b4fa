/// Hypercubic neighbor offsets: one unit vector per dimension.
///
/// For `n_dims = 2` this returns `[[1,0], [0,1]]`; with their negations,
/// the 4-neighbor square stencil.
pub fn hypercubic(n_dims: usize) -> Vec<Vec<isize>> {
    (0..n_dims)
        .map(|d| {
            let mut v = vec![0isize; n_dims];
            v[d] = 1;
            v
        })
        .collect()
}

/// Cubic offsets extended by the `[1,1,0]` in-plane diagonal.
///
/// With negations this gives 8 neighbors per site: ±x, ±y, ±z plus the
/// (+1,+1,0)/(-1,-1,0) diagonal pair in the xy-plane, not the canonical
/// 6-neighbor cubic stencil. Swapping in `hypercubic(3)` recovers the
/// canonical stencil.
pub fn cubic_with_xy_diagonal() -> Vec<Vec<isize>> {
    let mut offsets = hypercubic(3);
    offsets.push(vec![1, 1, 0]);
    offsets
}

pub mod grid;
pub mod offsets;

pub use grid::Grid;
pub use offsets::{cubic_with_xy_diagonal, hypercubic};

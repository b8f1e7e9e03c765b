//! Shared building blocks for the poisson workspace.

pub mod bit_grid;
pub mod grid;
pub mod log_setup;

pub use bit_grid::BitGrid;
pub use grid::Grid;

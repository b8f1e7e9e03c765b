//! Poisson - gradient-domain image operations on sparse linear systems.
//!
//! Both operations share one core: a finite-difference operator over a masked
//! or full pixel grid, a right-hand side encoding the boundary values, a direct
//! sparse solve and the mapping of the solution back to pixels.
//! - Seamless cloning (Poisson blending) of a masked source region into a target
//! - Reconstruction of a grayscale image from its Laplacian and four corners
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use poisson::{poisson_blend, Config, Image, Mask};
//!
//! let mask = Mask::from_fn(width, height, |row, col| inside(row, col));
//! let result = poisson_blend(&source, &target, &mask, &Config::blending(3))?;
//!
//! println!("residual {:.3e}", result.residual);
//! ```

mod config;
pub mod domain;
mod error;
mod image;
mod mapper;
pub mod operator;
mod pipeline;
pub mod rhs;
pub mod solver;
pub mod sparse;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Pixel data
// ============================================================================

pub use image::{Image, Mask};

// ============================================================================
// Configuration and errors
// ============================================================================

pub use config::{BoundaryRule, ChannelFanOut, Config, CornerSource, DomainVariant};
pub use error::{Error, ErrorKind, Result};

// ============================================================================
// Core stages
// ============================================================================

pub use domain::{Domain, DomainIndex, PixelClass};
pub use mapper::{map_grid_result, map_masked_result};
pub use operator::build_boundary_poisson_system;
pub use rhs::{assemble_blending_rhs, assemble_reconstruction_rhs};
pub use solver::{solve_system, Solution};
pub use sparse::CsrMatrix;

// ============================================================================
// Pipelines
// ============================================================================

pub use pipeline::{poisson_blend, reconstruct, BlendResult, ReconstructionResult};

//! End-to-end gradient-domain operations: build the operator, assemble the
//! right-hand sides, solve, map back to pixels.
//!
//! Each call builds its operator from scratch; nothing is cached between calls.

use crate::config::{Config, CornerSource, DomainVariant};
use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::image::{check_shape, Image, Mask};
use crate::mapper::{map_grid_result, map_masked_result};
use crate::operator::build_boundary_poisson_system;
use crate::rhs::{assemble_blending_rhs, assemble_reconstruction_rhs, corner_values};
use crate::solver::{combined_residual, solve_channels, solve_system, Solution};


/// Output of [`poisson_blend`].
#[derive(Debug, Clone)]
pub struct BlendResult {
    /// Target with the masked region replaced by the blended source.
    pub image: Image<u8>,
    /// Frobenius norm of the residuals of all channels.
    pub residual: f64,
    pub channel_residuals: Vec<f64>,
}

/// Output of [`reconstruct`].
#[derive(Debug, Clone)]
pub struct ReconstructionResult {
    pub image: Image<u8>,
    /// Unclipped solution, row-major.
    pub solution: Vec<f64>,
    pub residual: f64,
}

/// Seamlessly clone the masked region of `source` into `target`.
///
/// `source` and `target` must share shape and channel count; the mask selects
/// the pixels to solve for. Every channel is solved against one factorisation
/// of the operator.
pub fn poisson_blend<S, T>(
    source: &Image<S>,
    target: &Image<T>,
    mask: &Mask,
    config: &Config,
) -> Result<BlendResult>
where
    S: Copy + Into<f64>,
    T: Copy + Into<f64>,
{
    config.validate()?;
    if config.domain != DomainVariant::Masked {
        return Err(Error::InvalidConfig(format!(
            "blending needs a masked domain, got {}",
            config.domain
        )));
    }
    if target.channels() != config.channels {
        return Err(Error::ChannelMismatch {
            what: "target",
            expected: config.channels,
            actual: target.channels(),
        });
    }
    check_shape("mask", target.shape(), mask.shape())?;

    let domain = Domain::masked(mask).with_rule(config.boundary);
    let (operator, index) = build_boundary_poisson_system(&domain)?;
    tracing::info!(
        "Blending {}x{}x{}: {} unknowns ({} constrained), nnz={}",
        target.width(),
        target.height(),
        config.channels,
        index.len(),
        index.constrained_count(),
        operator.nnz()
    );

    let rhs = assemble_blending_rhs(source, target, mask, &index)?;
    let solutions = solve_channels(&operator, &rhs, config.fan_out)?;

    let residual = combined_residual(&solutions);
    check_residual(residual, config)?;

    let channel_residuals = solutions.iter().map(|s| s.residual).collect();
    let xs: Vec<Vec<f64>> = solutions.into_iter().map(|s| s.x).collect();
    let image = map_masked_result(&xs, target, mask, &index)?;

    tracing::info!("Blend residual={:.3e}", residual);
    Ok(BlendResult {
        image,
        residual,
        channel_residuals,
    })
}

/// Recover a grayscale image from its own Laplacian field and four corner
/// values.
pub fn reconstruct<T>(known: &Image<T>, config: &Config) -> Result<ReconstructionResult>
where
    T: Copy + Into<f64>,
{
    config.validate()?;
    if config.domain != DomainVariant::FullGrid {
        return Err(Error::InvalidConfig(format!(
            "reconstruction needs a full-grid domain, got {}",
            config.domain
        )));
    }
    if known.channels() != 1 || config.channels != 1 {
        return Err(Error::ChannelMismatch {
            what: "known image",
            expected: 1,
            actual: known.channels().max(config.channels),
        });
    }

    let (height, width) = known.shape();
    let domain = Domain::full_grid(width, height).with_rule(config.boundary);
    let (operator, index) = build_boundary_poisson_system(&domain)?;

    let corners = match config.corners {
        CornerSource::Auto => corner_values(known),
        CornerSource::Fixed(values) => values,
    };
    tracing::info!(
        "Reconstructing {}x{}: {} unknowns, nnz={}, corners={:?}",
        width,
        height,
        index.len(),
        operator.nnz(),
        corners
    );

    let b = assemble_reconstruction_rhs(known, &operator, &corners)?;
    let Solution { x, residual } = solve_system(&operator, &b)?;
    check_residual(residual, config)?;

    let image = map_grid_result(&x, width, height)?;

    tracing::info!("Reconstruction residual={:.3e}", residual);
    Ok(ReconstructionResult {
        image,
        solution: x,
        residual,
    })
}

fn check_residual(residual: f64, config: &Config) -> Result<()> {
    match config.max_residual {
        Some(threshold) if residual > threshold => {
            Err(Error::ResidualExceeded {
                residual,
                threshold,
            })
        }
        _ => Ok(()),
    }
}

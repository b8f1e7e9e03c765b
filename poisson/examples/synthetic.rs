//! Example: Synthetic Poisson blending and reconstruction
//!
//! 1. Blend a bright textured patch into a smooth gradient background
//! 2. Reconstruct a grayscale image from its own Laplacian and corners
//! 3. Reconstruct again with fixed corner values
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --example synthetic -- [log_dir]
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use poisson::{
    poisson_blend, reconstruct, ChannelFanOut, Config, CornerSource, Image, Mask,
};

const SIZE: usize = 96;

fn main() -> Result<()> {
    let log_dir = env::args().nth(1).map(PathBuf::from);
    common::log_setup::setup_logging("info", log_dir.as_deref());

    // === Blending ===
    let target = Image::new(
        SIZE,
        SIZE,
        3,
        (0..SIZE * SIZE * 3)
            .map(|i| {
                let (pixel, ch) = (i / 3, i % 3);
                let (row, col) = (pixel / SIZE, pixel % SIZE);
                (40 + row + col / 2 + ch * 20) as u8
            })
            .collect(),
    );
    let source = Image::new(
        SIZE,
        SIZE,
        3,
        (0..SIZE * SIZE * 3)
            .map(|i| {
                let pixel = i / 3;
                let (row, col) = (pixel / SIZE, pixel % SIZE);
                (200 + ((row / 4 + col / 4) % 2) * 40) as u8
            })
            .collect(),
    );
    let center = SIZE as isize / 2;
    let radius = SIZE as isize / 4;
    let mask = Mask::from_fn(SIZE, SIZE, |row, col| {
        let (dr, dc) = (row as isize - center, col as isize - center);
        dr * dr + dc * dc <= radius * radius
    });
    tracing::info!("Mask covers {} pixels", mask.count_ones());

    let config = Config::blending(3).with_fan_out(ChannelFanOut::Parallel);
    let blended =
        poisson_blend(&source, &target, &mask, &config).context("Poisson blending failed")?;
    tracing::info!(
        "Blended: residual={:.3e}, per channel={:?}",
        blended.residual,
        blended.channel_residuals
    );
    let c = center as usize;
    tracing::info!(
        "Center pixel target={:?} blended={:?}",
        (0..3).map(|ch| target.get(c, c, ch)).collect::<Vec<_>>(),
        (0..3).map(|ch| blended.image.get(c, c, ch)).collect::<Vec<_>>()
    );

    // === Reconstruction with corners from the image ===
    let gray = Image::new(
        SIZE,
        SIZE,
        1,
        (0..SIZE * SIZE)
            .map(|i| ((i / SIZE) * (i % SIZE) * 255 / ((SIZE - 1) * (SIZE - 1))) as u8)
            .collect(),
    );
    let reconstructed =
        reconstruct(&gray, &Config::reconstruction()).context("Reconstruction failed")?;
    let max_error = gray
        .pixels()
        .iter()
        .zip(reconstructed.image.pixels())
        .map(|(&a, &b)| a.abs_diff(b))
        .max()
        .unwrap_or(0);
    tracing::info!(
        "Reconstructed: residual={:.3e}, max pixel error={}",
        reconstructed.residual,
        max_error
    );

    // === Reconstruction with fixed corners ===
    let config = Config::reconstruction().with_corners(CornerSource::Fixed([128.0; 4]));
    let shifted = reconstruct(&gray, &config).context("Fixed-corner reconstruction failed")?;
    tracing::info!(
        "Fixed corners: residual={:.3e}, top-left={}, center={}",
        shifted.residual,
        shifted.image.get(0, 0, 0),
        shifted.image.get(SIZE / 2, SIZE / 2, 0)
    );

    Ok(())
}

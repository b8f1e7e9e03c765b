//! Synthetic inputs shared by the unit tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::image::Image;

/// Single-channel image from `f(row, col)`.
pub fn gray_image<F>(width: usize, height: usize, f: F) -> Image<f64>
where
    F: Fn(usize, usize) -> f64,
{
    multi_channel_image(width, height, 1, |row, col, _| f(row, col))
}

/// `channels`-plane image from `f(row, col, channel)`.
pub fn multi_channel_image<F>(width: usize, height: usize, channels: usize, f: F) -> Image<f64>
where
    F: Fn(usize, usize, usize) -> f64,
{
    let mut pixels = Vec::with_capacity(width * height * channels);
    for row in 0..height {
        for col in 0..width {
            for channel in 0..channels {
                pixels.push(f(row, col, channel));
            }
        }
    }
    Image::new(width, height, channels, pixels)
}

/// Uniform random 8-bit image, reproducible from `seed`.
pub fn random_u8_image(width: usize, height: usize, channels: usize, seed: u64) -> Image<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let pixels = (0..width * height * channels)
        .map(|_| rng.random_range(0..=255u8))
        .collect();
    Image::new(width, height, channels, pixels)
}

/// Bilinear ramp `scale * row * col / ((height - 1) * (width - 1))`, spanning `0..=scale`.
pub fn bilinear_ramp(width: usize, height: usize, scale: f64) -> Image<f64> {
    let denom = ((width - 1) * (height - 1)) as f64;
    gray_image(width, height, |row, col| scale * (row * col) as f64 / denom)
}

#[track_caller]
pub fn assert_all_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "element {i}: {a} differs from {e} by more than {tolerance}"
        );
    }
}

//! Interleaved multi-channel pixel arrays exchanged with the surrounding layers.

use common::{BitGrid, Grid};

use crate::error::{Error, Result};

/// Region mask over an image grid; set cells are unknowns of a masked solve.
pub type Mask = BitGrid;

/// Pixel array of `height x width x channels`, stored row-major with
/// interleaved channels (`(row * width + col) * channels + channel`).
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    pixels: Vec<T>,
    width: usize,
    height: usize,
    channels: usize,
}

impl<T> Image<T> {
    pub fn new(width: usize, height: usize, channels: usize, pixels: Vec<T>) -> Self {
        assert!(channels > 0, "Image must have at least one channel");
        assert_eq!(
            pixels.len(),
            width * height * channels,
            "pixels length must equal width * height * channels"
        );
        Self {
            pixels,
            width,
            height,
            channels,
        }
    }

    /// Single-channel image from a grid.
    pub fn from_grid(grid: Grid<T>) -> Self {
        let (height, width) = grid.shape();
        Self::new(width, height, 1, grid.into_vec())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(height, width)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.pixels
    }

    #[inline]
    fn offset(&self, row: usize, col: usize, channel: usize) -> usize {
        debug_assert!(row < self.height, "row out of bounds");
        debug_assert!(col < self.width, "col out of bounds");
        debug_assert!(channel < self.channels, "channel out of bounds");
        (row * self.width + col) * self.channels + channel
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize, channel: usize) -> T
    where
        T: Copy,
    {
        self.pixels[self.offset(row, col, channel)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: T) {
        let idx = self.offset(row, col, channel);
        self.pixels[idx] = value;
    }
}

impl<T: Copy + Into<f64>> Image<T> {
    /// One channel widened to `f64`.
    pub fn plane(&self, channel: usize) -> Grid<f64> {
        assert!(channel < self.channels, "channel out of bounds");
        Grid::new(
            self.width,
            self.height,
            self.pixels
                .iter()
                .skip(channel)
                .step_by(self.channels)
                .map(|&v| v.into())
                .collect(),
        )
    }
}

/// `Ok` when two `(height, width)` shapes agree.
pub(crate) fn check_shape(
    what: &'static str,
    expected: (usize, usize),
    actual: (usize, usize),
) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            what,
            expected,
            actual,
        })
    }
}

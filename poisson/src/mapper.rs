//! Maps solution vectors back to 8-bit pixel arrays.

use crate::domain::DomainIndex;
use crate::error::{Error, Result};
use crate::image::{check_shape, Image, Mask};

/// Clip to `[0, 255]` and round to the nearest integer. Returns whether the
/// value had to be clipped.
///
/// Rounding rather than truncating is intentional: an exact solve lands a hair
/// below integer pixel values (`41.9999999`), and truncation would shift those
/// pixels down by one.
#[inline]
fn to_pixel(value: f64) -> (u8, bool) {
    let clipped = value.clamp(0.0, 255.0);
    (clipped.round() as u8, clipped != value)
}

fn report_clipping(what: &str, clipped: usize, total: usize) {
    if clipped > 0 {
        tracing::warn!(
            "{}: {} of {} values outside [0, 255] were clipped",
            what,
            clipped,
            total
        );
    } else {
        tracing::debug!("{}: mapped {} values without clipping", what, total);
    }
}

/// Copy `target` and overwrite the masked pixels with the per-channel
/// solutions, taken in `index` order.
pub fn map_masked_result<T>(
    solutions: &[Vec<f64>],
    target: &Image<T>,
    mask: &Mask,
    index: &DomainIndex,
) -> Result<Image<u8>>
where
    T: Copy + Into<f64>,
{
    check_shape("mask", target.shape(), mask.shape())?;
    check_shape("domain index", target.shape(), index.shape())?;
    if !index.matches_mask(mask) {
        return Err(Error::InconsistentOperator(
            "domain index was not built from this mask".to_string(),
        ));
    }
    let channels = target.channels();
    if solutions.len() != channels {
        return Err(Error::ChannelMismatch {
            what: "solutions",
            expected: channels,
            actual: solutions.len(),
        });
    }
    if let Some(x) = solutions.iter().find(|x| x.len() != index.len()) {
        return Err(Error::LengthMismatch {
            what: "solution",
            expected: index.len(),
            actual: x.len(),
        });
    }

    let pixels = target
        .pixels()
        .iter()
        .map(|&v| to_pixel(v.into()).0)
        .collect();
    let mut image = Image::new(target.width(), target.height(), channels, pixels);

    let mut clipped = 0;
    for (unknown, &(row, col)) in index.pixels().iter().enumerate() {
        for (channel, x) in solutions.iter().enumerate() {
            let (value, was_clipped) = to_pixel(x[unknown]);
            clipped += was_clipped as usize;
            image.set(row, col, channel, value);
        }
    }

    report_clipping("masked result", clipped, index.len() * channels);
    Ok(image)
}

/// Reshape a full-grid solution to `height x width`, single channel.
pub fn map_grid_result(x: &[f64], width: usize, height: usize) -> Result<Image<u8>> {
    if x.len() != width * height {
        return Err(Error::LengthMismatch {
            what: "solution",
            expected: width * height,
            actual: x.len(),
        });
    }

    let mut clipped = 0;
    let pixels = x
        .iter()
        .map(|&v| {
            let (value, was_clipped) = to_pixel(v);
            clipped += was_clipped as usize;
            value
        })
        .collect();

    report_clipping("grid result", clipped, x.len());
    Ok(Image::new(width, height, 1, pixels))
}

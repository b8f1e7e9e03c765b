//! Right-hand-side assembly for blending and reconstruction.
//!
//! Both assemblers produce vectors in unknown order of the [`DomainIndex`] (or
//! the row-major full grid) that the operator was built from.

use common::Grid;

use crate::domain::DomainIndex;
use crate::error::{Error, Result};
use crate::image::{check_shape, Image, Mask};
use crate::sparse::CsrMatrix;


/// Discrete 4-neighbour Laplacian (`[0 1 0; 1 -4 1; 0 1 0]`) over the whole
/// plane. Pixels past the border are mirrored without repeating the edge
/// pixel (`reflect-101`).
pub fn laplacian(plane: &Grid<f64>) -> Grid<f64> {
    let (height, width) = plane.shape();
    Grid::from_fn(width, height, |row, col| {
        let up = reflect_101(row as isize - 1, height);
        let down = reflect_101(row as isize + 1, height);
        let left = reflect_101(col as isize - 1, width);
        let right = reflect_101(col as isize + 1, width);
        plane[(up, col)] + plane[(down, col)] + plane[(row, left)] + plane[(row, right)]
            - 4.0 * plane[(row, col)]
    })
}

#[inline]
fn reflect_101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    if i < 0 {
        (-i) as usize
    } else if i > last {
        (2 * last - i) as usize
    } else {
        i as usize
    }
}

/// Blending right-hand side, one vector per channel.
///
/// Constrained unknowns take the target intensity, interior unknowns the
/// Laplacian of the source at the same pixel.
pub fn assemble_blending_rhs<S, T>(
    source: &Image<S>,
    target: &Image<T>,
    mask: &Mask,
    index: &DomainIndex,
) -> Result<Vec<Vec<f64>>>
where
    S: Copy + Into<f64>,
    T: Copy + Into<f64>,
{
    check_shape("source", target.shape(), source.shape())?;
    check_shape("mask", target.shape(), mask.shape())?;
    check_shape("domain index", target.shape(), index.shape())?;
    if source.channels() != target.channels() {
        return Err(Error::ChannelMismatch {
            what: "source",
            expected: target.channels(),
            actual: source.channels(),
        });
    }
    if !index.matches_mask(mask) {
        return Err(Error::InconsistentOperator(
            "mask does not select the pixels of the domain index".into(),
        ));
    }

    let rhs = (0..target.channels())
        .map(|channel| {
            let source_laplacian = laplacian(&source.plane(channel));
            index
                .iter()
                .map(|(_, (row, col), class)| {
                    if class.is_constrained() {
                        target.get(row, col, channel).into()
                    } else {
                        source_laplacian[(row, col)]
                    }
                })
                .collect()
        })
        .collect();

    Ok(rhs)
}

/// Reconstruction right-hand side: `A * flatten(known)` with the four corner rows
/// replaced by `corners` (top-left, top-right, bottom-left, bottom-right).
pub fn assemble_reconstruction_rhs<T>(
    known: &Image<T>,
    operator: &CsrMatrix,
    corners: &[f64],
) -> Result<Vec<f64>>
where
    T: Copy + Into<f64>,
{
    if known.channels() != 1 {
        return Err(Error::ChannelMismatch {
            what: "known image",
            expected: 1,
            actual: known.channels(),
        });
    }
    let corners: [f64; 4] = corners
        .try_into()
        .map_err(|_| Error::InvalidCorners(corners.len()))?;

    let (height, width) = known.shape();
    let n = width * height;
    if n == 0 {
        return Err(Error::EmptyDomain);
    }
    if operator.dim() != n {
        return Err(Error::LengthMismatch {
            what: "operator dimension",
            expected: n,
            actual: operator.dim(),
        });
    }

    let mut b = operator.mul_vec(known.plane(0).cells());
    for (row, value) in corner_rows(width, height).into_iter().zip(corners) {
        b[row] = value;
    }
    Ok(b)
}

/// Corner intensities of channel 0: top-left, top-right, bottom-left, bottom-right.
pub fn corner_values<T>(image: &Image<T>) -> [f64; 4]
where
    T: Copy + Into<f64>,
{
    let (height, width) = image.shape();
    assert!(width > 0 && height > 0, "image must not be empty");
    [
        image.get(0, 0, 0).into(),
        image.get(0, width - 1, 0).into(),
        image.get(height - 1, 0, 0).into(),
        image.get(height - 1, width - 1, 0).into(),
    ]
}

/// Unknown indices of the four corners in a row-major full grid.
#[inline]
fn corner_rows(width: usize, height: usize) -> [usize; 4] {
    let n = width * height;
    [0, width - 1, n - width, n - 1]
}

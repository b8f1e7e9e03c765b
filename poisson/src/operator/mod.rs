//! Discrete Laplacian operator assembly over a [`DomainIndex`].
//!
//! Stencils per [`PixelClass`]:
//!
//! | class            | diagonal | neighbours                 |
//! |------------------|----------|----------------------------|
//! | `Boundary`       | `1`      | none                       |
//! | `Corner`         | `1`      | none                       |
//! | `Interior`       | `-k`     | `+1` for each of the `k` 4-neighbours |
//! | `HorizontalEdge` | `2`      | `-1` left and right        |
//! | `VerticalEdge`   | `2`      | `-1` up and down           |
//!
//! Edge rows of a grid-edge domain use the 1-D second difference along the edge
//! rather than the 2-D Laplacian: those pixels have no neighbour across the
//! image border, and only the four corners are pinned.

use crate::domain::{Domain, DomainIndex, PixelClass, NEIGHBORS_4};
use crate::error::{Error, Result};
use crate::sparse::{CsrBuilder, CsrMatrix};

#[cfg(test)]
mod tests;

/// Offsets along a row, for horizontal-edge rows.
const ALONG_ROW: [(isize, isize); 2] = [(0, -1), (0, 1)];
/// Offsets along a column, for vertical-edge rows.
const ALONG_COL: [(isize, isize); 2] = [(-1, 0), (1, 0)];

/// Build the operator `A` and the index table for `domain`.
pub fn build_boundary_poisson_system(domain: &Domain<'_>) -> Result<(CsrMatrix, DomainIndex)> {
    let index = DomainIndex::build(domain)?;
    let operator = build_operator(&index)?;
    Ok((operator, index))
}

/// Build `A` for an already classified domain.
pub fn build_operator(index: &DomainIndex) -> Result<CsrMatrix> {
    let n = index.len();
    if n == 0 {
        return Err(Error::EmptyDomain);
    }

    let mut builder = CsrBuilder::new(n, 5 * n);
    let mut entries: Vec<(usize, f64)> = Vec::with_capacity(5);

    for (unknown, (row, col), class) in index.iter() {
        entries.clear();
        match class {
            PixelClass::Boundary | PixelClass::Corner => {
                entries.push((unknown, 1.0));
            }
            PixelClass::Interior => {
                push_neighbors(index, unknown, row, col, &NEIGHBORS_4, 1.0, &mut entries)?;
                entries.push((unknown, -(entries.len() as f64)));
            }
            PixelClass::HorizontalEdge => {
                push_neighbors(index, unknown, row, col, &ALONG_ROW, -1.0, &mut entries)?;
                entries.push((unknown, 2.0));
            }
            PixelClass::VerticalEdge => {
                push_neighbors(index, unknown, row, col, &ALONG_COL, -1.0, &mut entries)?;
                entries.push((unknown, 2.0));
            }
        }
        builder.push_row(&mut entries)?;
    }

    let operator = builder.finish()?;
    tracing::debug!(
        "Built {}x{} Poisson operator ({} rule): nnz={}, constrained rows={}",
        n,
        n,
        index.rule(),
        operator.nnz(),
        index.constrained_count()
    );
    Ok(operator)
}

/// Append `(neighbour unknown, weight)` for each offset; every neighbour must be
/// an unknown, otherwise classification and stencil disagree.
fn push_neighbors(
    index: &DomainIndex,
    unknown: usize,
    row: usize,
    col: usize,
    offsets: &[(isize, isize)],
    weight: f64,
    entries: &mut Vec<(usize, f64)>,
) -> Result<()> {
    for &(dr, dc) in offsets {
        let (r, c) = (row as isize + dr, col as isize + dc);
        let neighbor = index
            .index_of(r, c)
            .ok_or_else(|| Error::MissingNeighbor {
                unknown,
                row: r,
                col: c,
            })?;
        entries.push((neighbor, weight));
    }
    Ok(())
}

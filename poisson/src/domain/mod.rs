//! Solve domains and the coordinate <-> unknown index table.
//!
//! A [`Domain`] describes which grid pixels are unknowns and which boundary rule
//! applies. [`DomainIndex::build`] turns it into the table every later stage
//! reads: unknowns are numbered by a row-major scan, and each unknown's
//! [`PixelClass`] is computed once here so the operator and the right-hand side
//! can never disagree about it.

use crate::config::BoundaryRule;
use crate::error::{Error, Result};
use crate::image::Mask;


/// Marker for grid cells that are not unknowns.
const NOT_IN_DOMAIN: usize = usize::MAX;

/// Axis-aligned 4-neighbour offsets as `(d_row, d_col)`: up, down, left, right.
pub(crate) const NEIGHBORS_4: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Role of an unknown in the linear system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelClass {
    /// 5-point Laplacian row.
    Interior,
    /// Dirichlet row under [`BoundaryRule::MaskEdge`].
    Boundary,
    /// Dirichlet row at an image corner under [`BoundaryRule::GridEdge`].
    Corner,
    /// First or last row (not a corner): second difference along the row.
    HorizontalEdge,
    /// First or last column (not a corner): second difference along the column.
    VerticalEdge,
}

impl PixelClass {
    /// Whether the row is an identity constraint.
    #[inline]
    pub fn is_constrained(self) -> bool {
        matches!(self, PixelClass::Boundary | PixelClass::Corner)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum DomainShape<'a> {
    Masked(&'a Mask),
    FullGrid { width: usize, height: usize },
}

/// Which pixels are unknowns, and how they are classified.
#[derive(Debug, Clone, Copy)]
pub struct Domain<'a> {
    pub shape: DomainShape<'a>,
    pub rule: BoundaryRule,
}

impl<'a> Domain<'a> {
    /// Pixels selected by `mask`, classified with [`BoundaryRule::MaskEdge`].
    pub fn masked(mask: &'a Mask) -> Self {
        Self {
            shape: DomainShape::Masked(mask),
            rule: BoundaryRule::MaskEdge,
        }
    }

    /// Every pixel of a `height x width` grid, classified with [`BoundaryRule::GridEdge`].
    pub fn full_grid(width: usize, height: usize) -> Self {
        Self {
            shape: DomainShape::FullGrid { width, height },
            rule: BoundaryRule::GridEdge,
        }
    }

    pub fn with_rule(mut self, rule: BoundaryRule) -> Self {
        self.rule = rule;
        self
    }

    /// `(height, width)` of the underlying grid.
    pub fn shape(&self) -> (usize, usize) {
        match self.shape {
            DomainShape::Masked(mask) => mask.shape(),
            DomainShape::FullGrid { width, height } => (height, width),
        }
    }

    #[inline]
    fn contains(&self, row: isize, col: isize) -> bool {
        match self.shape {
            DomainShape::Masked(mask) => mask.get_checked(row, col),
            DomainShape::FullGrid { width, height } => {
                row >= 0 && col >= 0 && (row as usize) < height && (col as usize) < width
            }
        }
    }

    /// Classify an unknown at `(row, col)` using only the domain geometry.
    pub fn classify(&self, row: usize, col: usize) -> PixelClass {
        let (height, width) = self.shape();
        match self.rule {
            BoundaryRule::MaskEdge => {
                let on_image_edge =
                    row == 0 || row == height - 1 || col == 0 || col == width - 1;
                let (r, c) = (row as isize, col as isize);
                if on_image_edge
                    || NEIGHBORS_4
                        .iter()
                        .any(|&(dr, dc)| !self.contains(r + dr, c + dc))
                {
                    PixelClass::Boundary
                } else {
                    PixelClass::Interior
                }
            }
            BoundaryRule::GridEdge => classify_grid_edge(width, height, row, col),
        }
    }
}

/// Grid-edge classification of `(row, col)` in a `height x width` grid.
pub fn classify_grid_edge(width: usize, height: usize, row: usize, col: usize) -> PixelClass {
    let extreme_row = row == 0 || row == height - 1;
    let extreme_col = col == 0 || col == width - 1;
    match (extreme_row, extreme_col) {
        (true, true) => PixelClass::Corner,
        (true, false) => PixelClass::HorizontalEdge,
        (false, true) => PixelClass::VerticalEdge,
        (false, false) => PixelClass::Interior,
    }
}

/// Array-backed bijection between domain pixels and dense unknown indices.
///
/// Built once per solve and read by the operator builder, the right-hand-side
/// assemblers and the result mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainIndex {
    width: usize,
    height: usize,
    rule: BoundaryRule,
    /// Unknown index for every grid cell, `NOT_IN_DOMAIN` when outside.
    slots: Vec<usize>,
    /// `(row, col)` of every unknown.
    pixels: Vec<(usize, usize)>,
    classes: Vec<PixelClass>,
}

impl DomainIndex {
    pub fn build(domain: &Domain<'_>) -> Result<Self> {
        let (height, width) = domain.shape();
        let mut slots = vec![NOT_IN_DOMAIN; width * height];
        let mut pixels = Vec::new();

        match domain.shape {
            DomainShape::Masked(mask) => {
                pixels.reserve(mask.count_ones());
                for (row, col) in mask.iter_ones() {
                    slots[row * width + col] = pixels.len();
                    pixels.push((row, col));
                }
            }
            DomainShape::FullGrid { .. } => {
                pixels.reserve(width * height);
                for row in 0..height {
                    for col in 0..width {
                        slots[row * width + col] = pixels.len();
                        pixels.push((row, col));
                    }
                }
            }
        }

        if pixels.is_empty() {
            return Err(Error::EmptyDomain);
        }

        let classes = pixels
            .iter()
            .map(|&(row, col)| domain.classify(row, col))
            .collect();

        Ok(Self {
            width,
            height,
            rule: domain.rule,
            slots,
            pixels,
            classes,
        })
    }

    /// Number of unknowns.
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(height, width)` of the grid the index was built over.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    #[inline]
    pub fn rule(&self) -> BoundaryRule {
        self.rule
    }

    /// Unknown index of `(row, col)`, `None` outside the grid or the domain.
    #[inline]
    pub fn index_of(&self, row: isize, col: isize) -> Option<usize> {
        if row < 0 || col < 0 || row as usize >= self.height || col as usize >= self.width {
            return None;
        }
        match self.slots[row as usize * self.width + col as usize] {
            NOT_IN_DOMAIN => None,
            idx => Some(idx),
        }
    }

    #[inline]
    pub fn pixel(&self, unknown: usize) -> (usize, usize) {
        self.pixels[unknown]
    }

    #[inline]
    pub fn class(&self, unknown: usize) -> PixelClass {
        self.classes[unknown]
    }

    #[inline]
    pub fn pixels(&self) -> &[(usize, usize)] {
        &self.pixels
    }

    #[inline]
    pub fn classes(&self) -> &[PixelClass] {
        &self.classes
    }

    /// `(unknown, (row, col), class)` in unknown order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, (usize, usize), PixelClass)> + '_ {
        self.pixels
            .iter()
            .zip(&self.classes)
            .enumerate()
            .map(|(unknown, (&pixel, &class))| (unknown, pixel, class))
    }

    /// Number of identity-constrained unknowns.
    pub fn constrained_count(&self) -> usize {
        self.classes.iter().filter(|c| c.is_constrained()).count()
    }

    /// Whether `mask` selects exactly this index's pixels.
    pub fn matches_mask(&self, mask: &Mask) -> bool {
        mask.shape() == self.shape()
            && mask.count_ones() == self.len()
            && self.pixels.iter().all(|&(row, col)| mask.get(row, col))
    }
}

//! Square compressed-sparse-row operator backed by `faer`.
//!
//! Rows are appended in order through [`CsrBuilder`], which rejects repeated or
//! out-of-range columns before handing the entries to `faer`. While building,
//! the diagonal dominance structure of the rows is recorded so the solver can
//! tell operators that are provably nonsingular from ones that need a guarded
//! factorisation.

use std::collections::VecDeque;

use faer::sparse::{SparseColMat, SparseRowMat, Triplet};
use faer::Mat;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct CsrMatrix {
    matrix: SparseRowMat<usize, f64>,
    /// First row without any stored nonzero.
    zero_row: Option<usize>,
    /// Weakly diagonally dominant and every row chains to a strictly dominant row.
    chained_dominant: bool,
}

impl CsrMatrix {
    /// Number of rows (and columns).
    #[inline]
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    #[inline]
    pub fn nnz(&self) -> usize {
        self.matrix.compute_nnz()
    }

    #[inline]
    pub fn as_faer(&self) -> &SparseRowMat<usize, f64> {
        &self.matrix
    }

    /// `(col, value)` pairs of `row`, sorted by column.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let matrix = self.matrix.as_ref();
        matrix
            .col_idx_of_row_raw(row)
            .iter()
            .copied()
            .zip(matrix.val_of_row(row).iter().copied())
    }

    /// Stored value at `(row, col)`, zero when absent.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let matrix = self.matrix.as_ref();
        match matrix.col_idx_of_row_raw(row).binary_search(&col) {
            Ok(pos) => matrix.val_of_row(row)[pos],
            Err(_) => 0.0,
        }
    }

    /// Row index of the first all-zero row, if any.
    #[inline]
    pub fn zero_row(&self) -> Option<usize> {
        self.zero_row
    }

    /// Whether the operator is weakly chained diagonally dominant, which
    /// guarantees it is nonsingular.
    #[inline]
    pub fn is_chained_dominant(&self) -> bool {
        self.chained_dominant
    }

    /// Column-major copy for factorisation.
    pub fn to_col_major(&self) -> Result<SparseColMat<usize, f64>> {
        self.matrix
            .as_ref()
            .to_col_major()
            .map_err(|e| Error::InconsistentOperator(format!("{e:?}")))
    }

    /// `A * x`.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        let n = self.dim();
        assert_eq!(x.len(), n, "vector length must equal matrix dimension");
        let x = Mat::from_fn(n, 1, |row, _| x[row]);
        let ax: Mat<f64> = self.matrix.as_ref() * x.as_ref();
        (0..n).map(|row| ax[(row, 0)]).collect()
    }

    /// Euclidean norm of `A * x - b`.
    pub fn residual_norm(&self, x: &[f64], b: &[f64]) -> f64 {
        assert_eq!(b.len(), self.dim(), "rhs length must equal matrix dimension");
        self.mul_vec(x)
            .iter()
            .zip(b)
            .map(|(ax, b)| (ax - b) * (ax - b))
            .sum::<f64>()
            .sqrt()
    }
}

impl PartialEq for CsrMatrix {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.matrix.as_ref(), other.matrix.as_ref());
        self.dim() == other.dim()
            && (0..self.dim()).all(|row| {
                a.col_idx_of_row_raw(row) == b.col_idx_of_row_raw(row)
                    && a.val_of_row(row) == b.val_of_row(row)
            })
    }
}

/// Appends rows of a square CSR matrix in order.
#[derive(Debug)]
pub struct CsrBuilder {
    dim: usize,
    rows: usize,
    triplets: Vec<Triplet<usize, usize, f64>>,
    /// `|a_ii|` per row.
    diagonal: Vec<f64>,
    /// Sum of `|a_ij|`, `j != i`, per row.
    off_diagonal: Vec<f64>,
}

impl CsrBuilder {
    pub fn new(dim: usize, nnz_hint: usize) -> Self {
        Self {
            dim,
            rows: 0,
            triplets: Vec::with_capacity(nnz_hint),
            diagonal: Vec::with_capacity(dim),
            off_diagonal: Vec::with_capacity(dim),
        }
    }

    /// Append the next row. Entries may come in any order but must not repeat a column.
    pub fn push_row(&mut self, entries: &mut [(usize, f64)]) -> Result<()> {
        let row = self.rows;
        if row >= self.dim {
            return Err(Error::InconsistentOperator(format!(
                "row {row} exceeds dimension {}",
                self.dim
            )));
        }

        entries.sort_unstable_by_key(|&(col, _)| col);
        for pair in entries.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(Error::InconsistentOperator(format!(
                    "duplicate entry at ({row}, {})",
                    pair[0].0
                )));
            }
        }
        if let Some(&(col, _)) = entries.last() {
            if col >= self.dim {
                return Err(Error::InconsistentOperator(format!(
                    "column {col} out of range in row {row}"
                )));
            }
        }

        let mut diagonal = 0.0;
        let mut off_diagonal = 0.0;
        for &(col, value) in entries.iter() {
            if col == row {
                diagonal = value.abs();
            } else {
                off_diagonal += value.abs();
            }
            self.triplets.push(Triplet::new(row, col, value));
        }
        self.diagonal.push(diagonal);
        self.off_diagonal.push(off_diagonal);
        self.rows += 1;
        Ok(())
    }

    pub fn finish(self) -> Result<CsrMatrix> {
        if self.rows != self.dim {
            return Err(Error::InconsistentOperator(format!(
                "built {} rows for a {1}x{1} operator",
                self.rows, self.dim
            )));
        }

        let zero_row = (0..self.dim)
            .find(|&row| self.diagonal[row] == 0.0 && self.off_diagonal[row] == 0.0);
        let chained_dominant = zero_row.is_none() && self.chains_to_strict_rows();

        let matrix =
            SparseRowMat::<usize, f64>::try_new_from_triplets(self.dim, self.dim, &self.triplets)
                .map_err(|e| Error::InconsistentOperator(format!("{e:?}")))?;

        Ok(CsrMatrix {
            matrix,
            zero_row,
            chained_dominant,
        })
    }

    /// Every row weakly dominant, and from every row a strictly dominant row is
    /// reachable through the nonzero pattern.
    fn chains_to_strict_rows(&self) -> bool {
        if (0..self.dim).any(|row| self.diagonal[row] < self.off_diagonal[row]) {
            return false;
        }

        // rows that reference column j, j != row
        let mut referenced_by: Vec<Vec<usize>> = vec![Vec::new(); self.dim];
        for t in &self.triplets {
            if t.row != t.col && t.val != 0.0 {
                referenced_by[t.col].push(t.row);
            }
        }

        let mut reached = vec![false; self.dim];
        let mut queue: VecDeque<usize> = (0..self.dim)
            .filter(|&row| self.diagonal[row] > self.off_diagonal[row])
            .collect();
        for &row in &queue {
            reached[row] = true;
        }
        while let Some(col) = queue.pop_front() {
            for &row in &referenced_by[col] {
                if !reached[row] {
                    reached[row] = true;
                    queue.push_back(row);
                }
            }
        }
        reached.into_iter().all(|r| r)
    }
}

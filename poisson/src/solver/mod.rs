//! Direct sparse solve of `A x = b` with residual reporting.
//!
//! The operator is factorised once with a sparse LU and the factorisation is
//! reused for every right-hand side (colour channel). The residual
//! `||A x - b||_2` is computed with the CSR operator's product and returned with
//! every solution; it is informational only.
//!
//! Singular operators are reported as [`Error::SingularSystem`]: an empty row
//! is rejected up front, operators that are not provably nonsingular are
//! factorised under a panic guard, and solutions that amplify the right-hand
//! side beyond [`MAX_AMPLIFICATION`] are treated as coming from a numerically
//! singular system.

use std::panic::{catch_unwind, AssertUnwindSafe};

use faer::prelude::Solve;
use faer::sparse::linalg::solvers::Lu;
use faer::Mat;
use rayon::prelude::*;

use crate::config::ChannelFanOut;
use crate::error::{Error, Result};
use crate::sparse::CsrMatrix;


/// Largest accepted `max|x| / max|b|`.
pub const MAX_AMPLIFICATION: f64 = 1e12;

/// Solution of one right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// One value per unknown, in domain index order. Not clipped.
    pub x: Vec<f64>,
    /// `||A x - b||_2`.
    pub residual: f64,
}

/// Sparse LU factorisation of an operator, shared read-only across solves.
pub struct LuSolver<'a> {
    operator: &'a CsrMatrix,
    lu: Lu<usize, f64>,
}

impl<'a> LuSolver<'a> {
    pub fn factorize(operator: &'a CsrMatrix) -> Result<Self> {
        let n = operator.dim();
        if n == 0 {
            return Err(Error::EmptyDomain);
        }

        if let Some(row) = operator.zero_row() {
            return Err(Error::SingularSystem(format!("row {row} of the operator is empty")));
        }

        let matrix = operator.to_col_major()?;
        let factorized = if operator.is_chained_dominant() {
            matrix.as_ref().sp_lu()
        } else {
            // faer panics on an exactly zero pivot
            tracing::debug!("Operator is not chained diagonally dominant, guarding factorization");
            catch_unwind(AssertUnwindSafe(|| matrix.as_ref().sp_lu())).map_err(|_| {
                Error::SingularSystem("zero pivot during LU factorization".to_string())
            })?
        };
        let lu = factorized
            .map_err(|e| Error::SingularSystem(format!("LU factorization failed: {e:?}")))?;

        tracing::debug!("Factorized {}x{} operator, nnz={}", n, n, operator.nnz());
        Ok(Self { operator, lu })
    }

    pub fn solve(&self, b: &[f64]) -> Result<Solution> {
        let n = self.operator.dim();
        if b.len() != n {
            return Err(Error::LengthMismatch {
                what: "right-hand side",
                expected: n,
                actual: b.len(),
            });
        }

        let rhs = Mat::from_fn(n, 1, |row, _| b[row]);
        let solved = self.lu.solve(&rhs);
        let x: Vec<f64> = (0..n).map(|row| solved[(row, 0)]).collect();

        if let Some(row) = x.iter().position(|v| !v.is_finite()) {
            return Err(Error::SingularSystem(format!(
                "non-finite solution value at unknown {row}"
            )));
        }

        let max_b = b.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        let max_x = x.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        if max_x > MAX_AMPLIFICATION * max_b.max(f64::MIN_POSITIVE) {
            return Err(Error::SingularSystem(format!(
                "solution magnitude {max_x:.3e} against right-hand side {max_b:.3e}"
            )));
        }

        let residual = self.operator.residual_norm(&x, b);
        Ok(Solution { x, residual })
    }
}

/// Solve `A x = b` for a single right-hand side.
pub fn solve_system(operator: &CsrMatrix, b: &[f64]) -> Result<Solution> {
    let solution = LuSolver::factorize(operator)?.solve(b)?;
    tracing::debug!("Solved {} unknowns, residual={:.3e}", b.len(), solution.residual);
    Ok(solution)
}

/// Solve one system per channel against a single factorisation of `operator`.
pub fn solve_channels(
    operator: &CsrMatrix,
    rhs: &[Vec<f64>],
    fan_out: ChannelFanOut,
) -> Result<Vec<Solution>> {
    let solver = LuSolver::factorize(operator)?;

    let solutions = match fan_out {
        ChannelFanOut::Sequential => rhs
            .iter()
            .map(|b| solver.solve(b))
            .collect::<Result<Vec<_>>>()?,
        ChannelFanOut::Parallel => rhs
            .par_iter()
            .map(|b| solver.solve(b))
            .collect::<Result<Vec<_>>>()?,
    };

    for (channel, solution) in solutions.iter().enumerate() {
        tracing::debug!(
            "Channel {} solved ({} fan-out), residual={:.3e}",
            channel,
            fan_out,
            solution.residual
        );
    }
    Ok(solutions)
}

/// Frobenius norm of the stacked per-channel residuals.
pub fn combined_residual(solutions: &[Solution]) -> f64 {
    solutions
        .iter()
        .map(|s| s.residual * s.residual)
        .sum::<f64>()
        .sqrt()
}

//! Mathematical Routines - Block Operations (Chapter MB)
//!
//! Low-level block-matrix building blocks used by the interconnection
//! routines: direct sums, horizontal/vertical stacking, and linear solves
//! with a matrix right-hand side.
//!
//! All routines allocate fresh output arrays; inputs are only borrowed.

use ndarray::{s, Array2, ArrayView2};
use ndarray_linalg::{Factorize, ReciprocalConditionNum, Solve};

use crate::error::{Result, SystemError};

/// Direct sum of matrices: places each block along the diagonal of a
/// larger zero matrix.
///
/// Blocks may be empty in either dimension; an empty block still shifts
/// the placement of later blocks by its row/column count.
///
/// # Examples
///
/// ```
/// use ndarray::arr2;
/// use partitioned_ss::mb::block_diag;
///
/// let a = arr2(&[[1.0, 2.0]]);
/// let b = arr2(&[[3.0], [4.0]]);
/// let m = block_diag(&[a.view(), b.view()]);
///
/// assert_eq!(m, arr2(&[[1.0, 2.0, 0.0], [0.0, 0.0, 3.0], [0.0, 0.0, 4.0]]));
/// ```
pub fn block_diag(blocks: &[ArrayView2<f64>]) -> Array2<f64> {
    let rows = blocks.iter().map(|b| b.nrows()).sum();
    let cols = blocks.iter().map(|b| b.ncols()).sum();
    let mut out = Array2::zeros((rows, cols));

    let (mut r, mut c) = (0, 0);
    for block in blocks {
        let (nr, nc) = block.dim();
        if nr > 0 && nc > 0 {
            out.slice_mut(s![r..r + nr, c..c + nc]).assign(block);
        }
        r += nr;
        c += nc;
    }
    out
}

/// Horizontal concatenation `[M1 M2 ...]`.
///
/// `names` labels each block for the error message and must have the same
/// length as `blocks`.
pub fn hstack(blocks: &[ArrayView2<f64>], names: &[&'static str]) -> Result<Array2<f64>> {
    debug_assert_eq!(blocks.len(), names.len());
    let rows = blocks.first().map_or(0, |b| b.nrows());
    for (i, block) in blocks.iter().enumerate().skip(1) {
        if block.nrows() != rows {
            return Err(SystemError::shape(names[0], &blocks[0], names[i], block));
        }
    }

    let cols = blocks.iter().map(|b| b.ncols()).sum();
    let mut out = Array2::zeros((rows, cols));
    let mut c = 0;
    for block in blocks {
        let nc = block.ncols();
        if nc > 0 {
            out.slice_mut(s![.., c..c + nc]).assign(block);
        }
        c += nc;
    }
    Ok(out)
}

/// Vertical concatenation `[M1; M2; ...]`.
pub fn vstack(blocks: &[ArrayView2<f64>], names: &[&'static str]) -> Result<Array2<f64>> {
    debug_assert_eq!(blocks.len(), names.len());
    let cols = blocks.first().map_or(0, |b| b.ncols());
    for (i, block) in blocks.iter().enumerate().skip(1) {
        if block.ncols() != cols {
            return Err(SystemError::shape(names[0], &blocks[0], names[i], block));
        }
    }

    let rows = blocks.iter().map(|b| b.nrows()).sum();
    let mut out = Array2::zeros((rows, cols));
    let mut r = 0;
    for block in blocks {
        let nr = block.nrows();
        if nr > 0 {
            out.slice_mut(s![r..r + nr, ..]).assign(block);
        }
        r += nr;
    }
    Ok(out)
}

/// Block matrix from a grid of blocks, given row by row.
///
/// Blocks within a row must share their row count and every assembled row
/// must have the same total width.
///
/// # Examples
///
/// ```
/// use ndarray::{arr2, Array2};
/// use partitioned_ss::mb::block_matrix;
///
/// let a = arr2(&[[1.0]]);
/// let b = arr2(&[[2.0, 3.0]]);
/// let z = Array2::<f64>::zeros((1, 1));
/// let c = arr2(&[[4.0, 5.0]]);
///
/// let m = block_matrix(&[&[a.view(), b.view()], &[z.view(), c.view()]]).unwrap();
/// assert_eq!(m, arr2(&[[1.0, 2.0, 3.0], [0.0, 4.0, 5.0]]));
/// ```
pub fn block_matrix(rows: &[&[ArrayView2<f64>]]) -> Result<Array2<f64>> {
    let mut assembled = Vec::with_capacity(rows.len());
    for row in rows {
        assembled.push(hstack(row, &vec!["block row"; row.len()])?);
    }
    let views: Vec<_> = assembled.iter().map(|r| r.view()).collect();
    vstack(&views, &vec!["block column"; views.len()])
}

/// Solution of `M X = R` for a square `M` and a matrix right-hand side `R`.
///
/// `M` is LU-factorized once (LAPACK DGETRF via ndarray-linalg) and the
/// factorization is reused for every column of `R`. The inverse of `M` is
/// never formed.
///
/// Returns the solution together with an estimate of the reciprocal
/// condition number of `M` in the 1-norm (`1.0` for an empty system).
///
/// # Errors
///
/// * `NotSquare` if `M` is not square
/// * `Shape` if `R` has the wrong row count
/// * `Singular` if the factorization hits an exactly zero pivot
///
/// # Examples
///
/// ```
/// use ndarray::arr2;
/// use partitioned_ss::mb::solve_left;
///
/// let m = arr2(&[[2.0, 0.0], [0.0, 4.0]]);
/// let r = arr2(&[[2.0, 4.0], [4.0, 8.0]]);
/// let (x, rcond) = solve_left(&m.view(), &r.view()).unwrap();
///
/// assert!((x[(0, 1)] - 2.0).abs() < 1e-12);
/// assert!((x[(1, 0)] - 1.0).abs() < 1e-12);
/// assert!(rcond > 0.0);
/// ```
pub fn solve_left(m: &ArrayView2<f64>, r: &ArrayView2<f64>) -> Result<(Array2<f64>, f64)> {
    let n = m.nrows();
    if m.ncols() != n {
        return Err(SystemError::not_square("M", m));
    }
    if r.nrows() != n {
        return Err(SystemError::shape("M", m, "R", r));
    }

    // Quick return: LAPACK is never called on empty systems
    if n == 0 {
        return Ok((Array2::zeros((0, r.ncols())), 1.0));
    }

    let lu = m
        .factorize()
        .map_err(|e| SystemError::Singular(format!("LU factorization failed: {}", e)))?;
    let rcond = lu.rcond()?;
    if !(rcond > 0.0) {
        return Err(SystemError::Singular(format!(
            "{}×{} matrix has reciprocal condition number {}",
            n, n, rcond
        )));
    }

    let mut x = Array2::zeros(r.raw_dim());
    for (j, col) in r.columns().into_iter().enumerate() {
        let xj = lu
            .solve(&col)
            .map_err(|e| SystemError::Singular(format!("LU solve failed: {}", e)))?;
        x.column_mut(j).assign(&xj);
    }

    Ok((x, rcond))
}

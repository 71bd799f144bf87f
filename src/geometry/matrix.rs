//! Matrix operations.
//!
//! Small dense systems (hyperplane normals, simplex volumes, circumcenters)
//! are solved on the stack with `la-stack` when the runtime size fits
//! [`MAX_STACK_MATRIX_DIM`], and with a heap-allocated `nalgebra` matrix
//! otherwise. Callers describe the matrix with a `fill(row, col)` closure so
//! neither path needs an intermediate buffer.

#![forbid(unsafe_code)]

use la_stack::{DEFAULT_PIVOT_TOL, LaError, Matrix as LaMatrix, Vector as LaVector};
use nalgebra as na;
use thiserror::Error;

/// Stack-matrix dispatch limit.
///
/// Lifting adds one dimension, so this covers Delaunay input up to 17D on the
/// stack; larger systems use `nalgebra::DMatrix`.
pub const MAX_STACK_MATRIX_DIM: usize = 18;

/// Internal linear algebra matrix type used by this crate for fixed-size operations.
pub type Matrix<const D: usize> = LaMatrix<D>;

/// Error type for matrix operations.
///
/// # Examples
///
/// ```rust
/// use nhull::geometry::matrix::MatrixError;
///
/// let err = MatrixError::SingularMatrix;
/// assert!(matches!(err, MatrixError::SingularMatrix));
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    /// Matrix is singular.
    #[error("Matrix is singular!")]
    SingularMatrix,
    /// The solve produced NaN or infinite components.
    #[error("Matrix solve produced non-finite values")]
    NonFinite,
}

/// Dispatch a runtime `k` (matrix dimension) to a stack-allocated `la_stack::Matrix<k>`.
///
/// Callers must guard `k <= MAX_STACK_MATRIX_DIM`.
macro_rules! with_la_stack_matrix {
    ($k:expr, |$m:ident| $body:block) => {{
        match $k {
            0 => { let mut $m = Matrix::<0>::zero(); $body }
            1 => { let mut $m = Matrix::<1>::zero(); $body }
            2 => { let mut $m = Matrix::<2>::zero(); $body }
            3 => { let mut $m = Matrix::<3>::zero(); $body }
            4 => { let mut $m = Matrix::<4>::zero(); $body }
            5 => { let mut $m = Matrix::<5>::zero(); $body }
            6 => { let mut $m = Matrix::<6>::zero(); $body }
            7 => { let mut $m = Matrix::<7>::zero(); $body }
            8 => { let mut $m = Matrix::<8>::zero(); $body }
            9 => { let mut $m = Matrix::<9>::zero(); $body }
            10 => { let mut $m = Matrix::<10>::zero(); $body }
            11 => { let mut $m = Matrix::<11>::zero(); $body }
            12 => { let mut $m = Matrix::<12>::zero(); $body }
            13 => { let mut $m = Matrix::<13>::zero(); $body }
            14 => { let mut $m = Matrix::<14>::zero(); $body }
            15 => { let mut $m = Matrix::<15>::zero(); $body }
            16 => { let mut $m = Matrix::<16>::zero(); $body }
            17 => { let mut $m = Matrix::<17>::zero(); $body }
            18 => { let mut $m = Matrix::<18>::zero(); $body }
            _ => unreachable!(
                "unsupported stack matrix size: {k} (max {max})",
                k = $k,
                max = MAX_STACK_MATRIX_DIM
            ),
        }
    }};
}

#[inline]
fn matrix_set<const D: usize>(m: &mut Matrix<D>, r: usize, c: usize, value: f64) {
    let ok = m.set(r, c, value);
    assert!(ok, "matrix index out of bounds: ({r}, {c}) for {D}x{D}");
}

#[inline]
fn fill_stack_matrix<const D: usize>(m: &mut Matrix<D>, fill: &impl Fn(usize, usize) -> f64) {
    for r in 0..D {
        for c in 0..D {
            matrix_set(m, r, c, fill(r, c));
        }
    }
}

/// LU determinant of a stack matrix, returning 0.0 for singular matrices.
#[inline]
fn stack_determinant<const D: usize>(m: &Matrix<D>) -> f64 {
    match m.det(0.0) {
        Ok(det) => det,
        Err(LaError::Singular { .. }) => 0.0,
        Err(LaError::NonFinite { .. }) => f64::NAN,
    }
}

/// Solves `m · x = rhs` by LU factorisation with partial pivoting.
fn stack_solve<const D: usize>(
    m: &Matrix<D>,
    rhs: &[f64],
    out: &mut [f64],
) -> Result<(), MatrixError> {
    let lu = m
        .lu(DEFAULT_PIVOT_TOL)
        .map_err(|_| MatrixError::SingularMatrix)?;
    let mut b = [0.0f64; D];
    b.copy_from_slice(rhs);
    let x = lu
        .solve_vec(LaVector::<D>::new(b))
        .map_err(|_| MatrixError::SingularMatrix)?
        .into_array();
    if x.iter().any(|v| !v.is_finite()) {
        return Err(MatrixError::NonFinite);
    }
    out.copy_from_slice(&x);
    Ok(())
}

/// Computes the determinant of the `k × k` matrix described by `fill`.
///
/// Singular matrices yield `0.0`.
///
/// # Examples
///
/// ```rust
/// use nhull::geometry::matrix::determinant;
///
/// // diag(2, 3)
/// let det = determinant(2, |r, c| if r == c { (r + 2) as f64 } else { 0.0 });
/// assert!((det - 6.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn determinant(k: usize, fill: impl Fn(usize, usize) -> f64) -> f64 {
    if k <= MAX_STACK_MATRIX_DIM {
        with_la_stack_matrix!(k, |m| {
            fill_stack_matrix(&mut m, &fill);
            stack_determinant(&m)
        })
    } else {
        na::DMatrix::from_fn(k, k, |r, c| fill(r, c)).determinant()
    }
}

/// Solves the `k × k` system `A · x = rhs` where `A[r][c] = fill(r, c)`.
///
/// Uses LU factorisation with partial pivoting. `rhs` and `out` must both
/// have length `k`.
///
/// # Errors
///
/// Returns [`MatrixError::SingularMatrix`] when a pivot falls below the
/// factorisation tolerance, and [`MatrixError::NonFinite`] when the solution
/// overflowed.
///
/// # Examples
///
/// ```rust
/// use nhull::geometry::matrix::solve_linear_system;
///
/// let mut x = [0.0; 2];
/// solve_linear_system(2, |r, c| [[2.0, 0.0], [0.0, 4.0]][r][c], &[2.0, 2.0], &mut x).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-12);
/// assert!((x[1] - 0.5).abs() < 1e-12);
/// ```
pub fn solve_linear_system(
    k: usize,
    fill: impl Fn(usize, usize) -> f64,
    rhs: &[f64],
    out: &mut [f64],
) -> Result<(), MatrixError> {
    debug_assert_eq!(rhs.len(), k);
    debug_assert_eq!(out.len(), k);

    if k <= MAX_STACK_MATRIX_DIM {
        with_la_stack_matrix!(k, |m| {
            fill_stack_matrix(&mut m, &fill);
            stack_solve(&m, rhs, out)
        })
    } else {
        let a = na::DMatrix::from_fn(k, k, |r, c| fill(r, c));
        let b = na::DVector::from_column_slice(rhs);
        let x = a.lu().solve(&b).ok_or(MatrixError::SingularMatrix)?;
        if x.iter().any(|v| !v.is_finite()) {
            return Err(MatrixError::NonFinite);
        }
        out.copy_from_slice(x.as_slice());
        Ok(())
    }
}

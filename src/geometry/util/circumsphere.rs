//! Circumsphere calculations for simplices.
//!
//! This module provides functions for computing the circumcenter and circumradius
//! of simplices in d-dimensional space.

#![forbid(unsafe_code)]

use thiserror::Error;

use crate::geometry::matrix::solve_linear_system;

use super::norms::{squared_distance, squared_norm};

/// Errors raised by circumsphere calculations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CircumcenterError {
    /// No points were supplied.
    #[error("Empty point set")]
    EmptyPointSet,
    /// The point count does not match the ambient dimension.
    #[error(
        "Points do not form a valid simplex: expected {expected} points for dimension {dimension}, got {actual}"
    )]
    InvalidSimplex {
        /// Number of points supplied.
        actual: usize,
        /// `dimension + 1`.
        expected: usize,
        /// Ambient dimension.
        dimension: usize,
    },
    /// The simplex is degenerate and has no finite circumcenter.
    #[error("Matrix inversion failed: {details}")]
    MatrixInversionFailed {
        /// Description of the failure.
        details: String,
    },
}

/// Calculate the circumcenter of a set of points forming a simplex.
///
/// The circumcenter C of a simplex with points `x_0`, ..., `x_d` solves
///
/// ```text
/// 2 (x_i - x_0) · (C - x_0) = |x_i - x_0|²   for i = 1..d
/// ```
///
/// which is the intersection of the perpendicular bisectors of the edges
/// through `x_0`.
///
/// # Errors
///
/// Returns an error if `points` is empty, if it does not hold exactly
/// `dimension + 1` points, or if the simplex is degenerate.
///
/// # Example
///
/// ```
/// use nhull::geometry::util::circumcenter;
///
/// let points: [&[f64]; 3] = [&[0.0, 0.0], &[2.0, 0.0], &[0.0, 2.0]];
/// let center = circumcenter(&points).unwrap();
/// assert!((center[0] - 1.0).abs() < 1e-12);
/// assert!((center[1] - 1.0).abs() < 1e-12);
/// ```
pub fn circumcenter(points: &[&[f64]]) -> Result<Vec<f64>, CircumcenterError> {
    let first = points.first().ok_or(CircumcenterError::EmptyPointSet)?;
    let dimension = first.len();
    if points.len() != dimension + 1 {
        return Err(CircumcenterError::InvalidSimplex {
            actual: points.len(),
            expected: dimension + 1,
            dimension,
        });
    }

    let origin = *first;
    let mut rhs = vec![0.0; dimension];
    let mut edge = vec![0.0; dimension];
    for (row, point) in points[1..].iter().enumerate() {
        for (e, (&x, &o)) in edge.iter_mut().zip(point.iter().zip(origin)) {
            *e = x - o;
        }
        rhs[row] = 0.5 * squared_norm(&edge);
    }

    let mut relative = vec![0.0; dimension];
    solve_linear_system(
        dimension,
        |r, c| points[r + 1][c] - origin[c],
        &rhs,
        &mut relative,
    )
    .map_err(|e| CircumcenterError::MatrixInversionFailed {
        details: format!("LU solve failed: {e}"),
    })?;

    Ok(relative.iter().zip(origin).map(|(&x, &o)| x + o).collect())
}

/// Circumradius given a precomputed circumcenter.
///
/// # Panics
///
/// Panics if `points` is empty.
#[must_use]
pub fn circumradius_with_center(points: &[&[f64]], center: &[f64]) -> f64 {
    squared_distance(points[0], center).sqrt()
}

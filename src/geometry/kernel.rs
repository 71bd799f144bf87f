//! Numeric kernel for the incremental hull.
//!
//! Stateless routines that turn vertex positions into oriented hyperplanes,
//! signed distances and simplex volumes. Everything above this module is
//! purely combinatorial: it asks the kernel whether a vertex is beyond a face
//! and never looks at coordinates itself.

#![forbid(unsafe_code)]

use thiserror::Error;

use crate::core::collections::CoordinateBuffer;
use crate::core::vertex_buffer::VertexBuffer;
use crate::geometry::matrix::{determinant, solve_linear_system};
use crate::geometry::util::{dot, hypot, normalize_in_place, subtract_into};

/// Relative threshold under which a closed-form normal is treated as degenerate.
///
/// Compared against `|n| / Π|e_i|`, i.e. the sine-like measure of how far the
/// face's edges are from being linearly dependent.
pub const NORMAL_DEGENERACY_RATIO: f64 = 1e-12;

/// Errors raised by the kernel.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum KernelError {
    /// The face vertices are affinely dependent: no unique hyperplane exists.
    #[error("Singular normal: {dimension} face vertices are affinely dependent")]
    SingularNormal {
        /// Ambient dimension.
        dimension: usize,
    },
}

/// Orientation data produced alongside a unit normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneOrientation {
    /// Offset such that `normal · x + offset = 0` on the hyperplane.
    pub offset: f64,
    /// `true` if the computed normal had to be negated to point away from the
    /// interior reference point.
    pub flipped: bool,
}

/// Computes the outward unit normal of the hyperplane through `vertices`.
///
/// `vertices` holds `dimension` indices into `buffer`; the unit normal is
/// written into `normal` (length `dimension`). Orientation is fixed so that
/// `interior` has negative signed distance.
///
/// Dimensions 2, 3 and 4 use closed forms (perpendicular, cross product and
/// generalized cross product). Higher dimensions, and closed forms that come
/// out near-zero, solve `(p_i - interior) · n = 1` by LU with partial pivoting.
///
/// # Errors
///
/// Returns [`KernelError::SingularNormal`] if the vertices are affinely
/// dependent (within [`NORMAL_DEGENERACY_RATIO`]) or the solve fails.
///
/// # Examples
///
/// ```rust
/// use nhull::core::vertex_buffer::VertexBuffer;
/// use nhull::geometry::kernel::hyperplane;
///
/// let buffer = VertexBuffer::from_points(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]).unwrap();
/// let mut normal = [0.0; 3];
/// let plane = hyperplane(&buffer, &[0, 1, 2], &[0.0, 0.0, 0.0], &mut normal).unwrap();
/// let expected = 1.0 / 3.0_f64.sqrt();
/// assert!(normal.iter().all(|n| (n - expected).abs() < 1e-12));
/// assert!((plane.offset + expected).abs() < 1e-12);
/// ```
pub fn hyperplane(
    buffer: &VertexBuffer,
    vertices: &[usize],
    interior: &[f64],
    normal: &mut [f64],
) -> Result<PlaneOrientation, KernelError> {
    let dimension = buffer.dimension();
    debug_assert_eq!(vertices.len(), dimension);
    debug_assert_eq!(normal.len(), dimension);

    let closed_form = match dimension {
        2 => normal_2d(buffer, vertices, normal),
        3 => normal_3d(buffer, vertices, normal),
        4 => normal_4d(buffer, vertices, normal),
        _ => false,
    };
    if !closed_form {
        solve_normal(buffer, vertices, interior, normal)?;
    }

    if normalize_in_place(normal).is_none() {
        return Err(KernelError::SingularNormal { dimension });
    }

    let mut offset = -dot(normal, buffer.position(vertices[0]));
    let interior_distance = dot(normal, interior) + offset;
    let flipped = interior_distance > 0.0;
    if flipped {
        for n in normal.iter_mut() {
            *n = -*n;
        }
        offset = -offset;
    }
    Ok(PlaneOrientation { offset, flipped })
}

/// Signed distance of `point` from the plane `normal · x + offset = 0`.
///
/// Positive values lie on the side the normal points to.
#[inline]
#[must_use]
pub fn signed_distance(normal: &[f64], offset: f64, point: &[f64]) -> f64 {
    dot(normal, point) + offset
}

/// Signed `d × d` determinant of the edge matrix `[p_1 - p_0; ...; p_d - p_0]`.
///
/// Positive for positively oriented simplices.
#[must_use]
pub fn simplex_orientation_determinant(points: &[&[f64]]) -> f64 {
    let dimension = points.len().saturating_sub(1);
    let origin = points[0];
    determinant(dimension, |r, c| points[r + 1][c] - origin[c])
}

/// Unsigned volume of the simplex spanned by `dimension + 1` points.
///
/// # Examples
///
/// ```rust
/// use nhull::geometry::kernel::simplex_volume;
///
/// let points: [&[f64]; 4] = [&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0]];
/// assert!((simplex_volume(&points) - 1.0 / 6.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn simplex_volume(points: &[&[f64]]) -> f64 {
    let dimension = points.len().saturating_sub(1);
    let factorial: f64 = (1..=dimension).map(|k| k as f64).product();
    simplex_orientation_determinant(points).abs() / factorial
}

/// Determinant of `[normal; p_1 - p_0; ...; p_{d-1} - p_0]` for a face.
///
/// Positive when the face's vertex order winds counter-clockwise seen from
/// the side `normal` points to.
#[must_use]
pub fn facet_orientation_determinant(normal: &[f64], points: &[&[f64]]) -> f64 {
    let origin = points[0];
    determinant(normal.len(), |r, c| {
        if r == 0 {
            normal[c]
        } else {
            points[r][c] - origin[c]
        }
    })
}

#[inline]
fn edge(buffer: &VertexBuffer, from: usize, to: usize) -> CoordinateBuffer {
    let mut e: CoordinateBuffer = std::iter::repeat_n(0.0, buffer.dimension()).collect();
    subtract_into(buffer.position(to), buffer.position(from), &mut e);
    e
}

/// Writes a raw normal and reports whether it is well conditioned.
fn accept_raw_normal(normal: &[f64], edge_lengths: f64) -> bool {
    let length = hypot(normal);
    length.is_finite() && length > NORMAL_DEGENERACY_RATIO * edge_lengths
}

fn normal_2d(buffer: &VertexBuffer, vertices: &[usize], normal: &mut [f64]) -> bool {
    let e = edge(buffer, vertices[0], vertices[1]);
    normal[0] = e[1];
    normal[1] = -e[0];
    accept_raw_normal(normal, hypot(&e))
}

fn normal_3d(buffer: &VertexBuffer, vertices: &[usize], normal: &mut [f64]) -> bool {
    let a = edge(buffer, vertices[0], vertices[1]);
    let b = edge(buffer, vertices[0], vertices[2]);
    normal[0] = a[1].mul_add(b[2], -(a[2] * b[1]));
    normal[1] = a[2].mul_add(b[0], -(a[0] * b[2]));
    normal[2] = a[0].mul_add(b[1], -(a[1] * b[0]));
    accept_raw_normal(normal, hypot(&a) * hypot(&b))
}

/// Generalized cross product of three edges in 4D: `n_i = (-1)^i det(M_i)`
/// where `M_i` drops column `i` of the 3×4 edge matrix.
fn normal_4d(buffer: &VertexBuffer, vertices: &[usize], normal: &mut [f64]) -> bool {
    let rows = [
        edge(buffer, vertices[0], vertices[1]),
        edge(buffer, vertices[0], vertices[2]),
        edge(buffer, vertices[0], vertices[3]),
    ];
    for (skip, n) in normal.iter_mut().enumerate() {
        let cols: [usize; 3] = match skip {
            0 => [1, 2, 3],
            1 => [0, 2, 3],
            2 => [0, 1, 3],
            _ => [0, 1, 2],
        };
        let m = |r: usize, c: usize| rows[r][cols[c]];
        let minor = m(0, 0) * m(1, 1).mul_add(m(2, 2), -(m(1, 2) * m(2, 1)))
            - m(0, 1) * m(1, 0).mul_add(m(2, 2), -(m(1, 2) * m(2, 0)))
            + m(0, 2) * m(1, 0).mul_add(m(2, 1), -(m(1, 1) * m(2, 0)));
        *n = if skip % 2 == 0 { minor } else { -minor };
    }
    accept_raw_normal(normal, rows.iter().map(|r| hypot(r)).product())
}

/// LU solve of `(p_i - interior) · n = 1`.
///
/// Shifting by the interior point keeps the system regular for hyperplanes
/// through the origin, and the solution points away from `interior`.
fn solve_normal(
    buffer: &VertexBuffer,
    vertices: &[usize],
    interior: &[f64],
    normal: &mut [f64],
) -> Result<(), KernelError> {
    let dimension = buffer.dimension();
    let rhs: CoordinateBuffer = std::iter::repeat_n(1.0, dimension).collect();
    solve_linear_system(
        dimension,
        |r, c| buffer.position(vertices[r])[c] - interior[c],
        &rhs,
        normal,
    )
    .map_err(|_| KernelError::SingularNormal { dimension })?;

    // 1/|n| is the interior point's distance to the plane; compare it with the
    // face's own extent to reject near-singular solves.
    let length = hypot(normal);
    let extent = (1..dimension)
        .map(|i| hypot(&edge(buffer, vertices[0], vertices[i])))
        .fold(0.0_f64, f64::max);
    if !length.is_finite() || length == 0.0 || (1.0 / length) <= NORMAL_DEGENERACY_RATIO * extent
    {
        return Err(KernelError::SingularNormal { dimension });
    }
    Ok(())
}

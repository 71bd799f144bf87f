//! Seeding simplex selection.
//!
//! Finds `dimension + 1` affinely independent vertices to start the
//! incremental hull from. Candidates come from the per-axis extremes first:
//! they bound the data and are cheap to find. Each added vertex must point in
//! a direction well separated from the span of the edges chosen so far, which
//! defeats axis-aligned lattices and near-coplanar clusters that break naive
//! bounding-box seeding.

#![forbid(unsafe_code)]

use thiserror::Error;

use crate::core::collections::{CoordinateBuffer, FastHashSet};
use crate::core::vertex_buffer::VertexBuffer;
use crate::geometry::kernel::simplex_volume;
use crate::geometry::util::{dot, hypot, squared_distance};

/// Largest tolerated alignment between a candidate direction and the span of
/// the already chosen edges. Values above it signal near-collinearity.
pub const MAX_DOT_PRODUCT_IN_SIMPLEX: f64 = 0.995;

/// Simplex volume, relative to the bounding box volume, below which the
/// seeding simplex is considered flat.
pub const FRACTIONAL_NEGLIGIBLE_VOLUME: f64 = 1e-12;

/// Ties per axis extreme admitted into the candidate pool.
const MAX_EXTREME_TIES: usize = 16;

/// Errors raised while selecting the seeding simplex.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InitialSimplexError {
    /// Fewer than `dimension + 1` vertices were supplied.
    #[error(
        "Not enough vertices for a {dimension}D hull: got {actual}, need at least {required}"
    )]
    NotEnoughVertices {
        /// Ambient dimension.
        dimension: usize,
        /// Vertex count supplied.
        actual: usize,
        /// Minimum vertex count (`dimension + 1`).
        required: usize,
    },
    /// No affinely independent `dimension + 1` vertices exist within tolerance.
    #[error(
        "Degenerate input in {dimension}D: found only {found} affinely independent vertices ({message})"
    )]
    DegenerateInput {
        /// Ambient dimension.
        dimension: usize,
        /// Independent vertices found before the search failed.
        found: usize,
        /// Which rule rejected the input.
        message: String,
    },
}

/// Incremental Gram-Schmidt state over the edges of the partial simplex.
struct EdgeSpan {
    origin: CoordinateBuffer,
    basis: Vec<CoordinateBuffer>,
    scratch: CoordinateBuffer,
}

/// How a candidate vertex relates to the current span.
#[derive(Clone, Copy)]
struct Separation {
    /// Norm of the projection of the candidate's unit direction onto the span.
    alignment: f64,
    /// Distance from the candidate to the affine span.
    distance: f64,
}

impl EdgeSpan {
    fn new(origin: &[f64]) -> Self {
        Self {
            origin: origin.iter().copied().collect(),
            basis: Vec::new(),
            scratch: std::iter::repeat_n(0.0, origin.len()).collect(),
        }
    }

    /// Writes the component of `point - origin` orthogonal to the span into
    /// the scratch buffer and returns the separation.
    fn separation(&mut self, point: &[f64]) -> Option<Separation> {
        for ((s, &p), &o) in self.scratch.iter_mut().zip(point).zip(&self.origin) {
            *s = p - o;
        }
        let length = hypot(&self.scratch);
        if length == 0.0 {
            return None;
        }
        let mut projected_squared = 0.0;
        for b in &self.basis {
            let coefficient = dot(&self.scratch, b);
            projected_squared += coefficient * coefficient;
            for (s, &bi) in self.scratch.iter_mut().zip(b) {
                *s -= coefficient * bi;
            }
        }
        Some(Separation {
            alignment: (projected_squared.sqrt() / length).min(1.0),
            distance: hypot(&self.scratch),
        })
    }

    /// Extends the span by `point`.
    fn push(&mut self, point: &[f64]) {
        if self.separation(point).is_some() {
            let length = hypot(&self.scratch);
            self.basis
                .push(self.scratch.iter().map(|&s| s / length).collect());
        }
    }
}

/// Per-axis extreme vertices, ties within `tolerance` included.
fn extreme_pool(buffer: &VertexBuffer, tolerance: f64) -> Vec<usize> {
    let (min, max) = buffer.bounding_box();
    let dimension = buffer.dimension();
    let mut min_counts = vec![0usize; dimension];
    let mut max_counts = vec![0usize; dimension];
    let mut seen = FastHashSet::default();
    let mut pool = Vec::new();
    for (index, position) in buffer.iter().enumerate() {
        for axis in 0..dimension {
            let at_min = position[axis] - min[axis] <= tolerance && min_counts[axis] < MAX_EXTREME_TIES;
            let at_max = max[axis] - position[axis] <= tolerance && max_counts[axis] < MAX_EXTREME_TIES;
            if at_min {
                min_counts[axis] += 1;
            }
            if at_max {
                max_counts[axis] += 1;
            }
            if (at_min || at_max) && seen.insert(index) {
                pool.push(index);
            }
        }
    }
    pool
}

/// Best separated candidate from `candidates` not already chosen.
fn best_candidate(
    buffer: &VertexBuffer,
    span: &mut EdgeSpan,
    candidates: impl Iterator<Item = usize>,
    chosen: &[usize],
    tolerance: f64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for candidate in candidates {
        if chosen.contains(&candidate) {
            continue;
        }
        let Some(separation) = span.separation(buffer.position(candidate)) else {
            continue;
        };
        if separation.alignment > MAX_DOT_PRODUCT_IN_SIMPLEX || separation.distance <= tolerance {
            continue;
        }
        if best.is_none_or(|(_, alignment)| separation.alignment < alignment) {
            best = Some((candidate, separation.alignment));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Selects `dimension + 1` vertices spanning a non-degenerate simplex.
///
/// # Errors
///
/// - [`InitialSimplexError::NotEnoughVertices`] if the buffer holds at most
///   `dimension` vertices
/// - [`InitialSimplexError::DegenerateInput`] if every candidate is within
///   `tolerance` of the span of those already chosen, or the resulting
///   simplex is flat relative to the bounding box
///
/// # Examples
///
/// ```rust
/// use nhull::core::algorithms::initial_simplex::find_initial_simplex;
/// use nhull::core::vertex_buffer::VertexBuffer;
///
/// let buffer = VertexBuffer::from_points(&[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [2.0, 2.0]]).unwrap();
/// let simplex = find_initial_simplex(&buffer, 1e-5).unwrap();
/// assert_eq!(simplex.len(), 3);
/// assert!(!simplex.contains(&4));
/// ```
pub fn find_initial_simplex(
    buffer: &VertexBuffer,
    tolerance: f64,
) -> Result<Vec<usize>, InitialSimplexError> {
    let dimension = buffer.dimension();
    let required = dimension + 1;
    if buffer.len() < required {
        return Err(InitialSimplexError::NotEnoughVertices {
            dimension,
            actual: buffer.len(),
            required,
        });
    }

    let pool = extreme_pool(buffer, tolerance);

    // First edge: the most distant pair among the extremes.
    let mut first_edge = None;
    let mut max_distance = 0.0;
    for (i, &a) in pool.iter().enumerate() {
        for &b in &pool[i + 1..] {
            let distance = squared_distance(buffer.position(a), buffer.position(b));
            if distance > max_distance {
                max_distance = distance;
                first_edge = Some((a, b));
            }
        }
    }
    let Some((a, b)) = first_edge.filter(|_| max_distance.sqrt() > tolerance) else {
        return Err(InitialSimplexError::DegenerateInput {
            dimension,
            found: 1,
            message: "all vertices coincide within tolerance".to_string(),
        });
    };

    let mut chosen = Vec::with_capacity(required);
    chosen.extend([a, b]);
    let mut span = EdgeSpan::new(buffer.position(a));
    span.push(buffer.position(b));

    while chosen.len() < required {
        let next = best_candidate(buffer, &mut span, pool.iter().copied(), &chosen, tolerance)
            .or_else(|| best_candidate(buffer, &mut span, 0..buffer.len(), &chosen, tolerance));
        let Some(next) = next else {
            return Err(InitialSimplexError::DegenerateInput {
                dimension,
                found: chosen.len(),
                message: format!(
                    "no vertex is separated from the span of the first {} by more than {tolerance}",
                    chosen.len()
                ),
            });
        };
        span.push(buffer.position(next));
        chosen.push(next);
    }

    let (min, max) = buffer.bounding_box();
    let box_volume: f64 = min.iter().zip(&max).map(|(lo, hi)| hi - lo).product();
    let points: Vec<&[f64]> = chosen.iter().map(|&v| buffer.position(v)).collect();
    let volume = simplex_volume(&points);
    if !(volume > FRACTIONAL_NEGLIGIBLE_VOLUME * box_volume) {
        return Err(InitialSimplexError::DegenerateInput {
            dimension,
            found: dimension,
            message: format!(
                "seeding simplex volume {volume:e} is negligible against bounding box volume {box_volume:e}"
            ),
        });
    }

    tracing::debug!(dimension, ?chosen, volume, "selected seeding simplex");
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simplex_of<P: AsRef<[f64]>>(points: &[P]) -> Result<Vec<usize>, InitialSimplexError> {
        let buffer = VertexBuffer::from_points(points).unwrap();
        find_initial_simplex(&buffer, 1e-5)
    }

    #[test]
    fn test_square_with_interior_point() {
        let simplex = simplex_of(&[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [2.0, 2.0]])
            .unwrap();
        assert_eq!(simplex.len(), 3);
        assert!(!simplex.contains(&4));
    }

    #[test]
    fn test_not_enough_vertices() {
        assert_eq!(
            simplex_of(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            Err(InitialSimplexError::NotEnoughVertices {
                dimension: 3,
                actual: 3,
                required: 4,
            })
        );
    }

    #[test]
    fn test_collinear_points_are_degenerate() {
        let points: Vec<[f64; 2]> = (0..10).map(|i| [f64::from(i), 2.0 * f64::from(i)]).collect();
        assert!(matches!(
            simplex_of(&points),
            Err(InitialSimplexError::DegenerateInput { found: 2, .. })
        ));
    }

    #[test]
    fn test_coplanar_points_are_degenerate() {
        let points: Vec<[f64; 3]> = (0..5)
            .flat_map(|i| (0..5).map(move |j| [f64::from(i), f64::from(j), 1.0]))
            .collect();
        assert!(matches!(
            simplex_of(&points),
            Err(InitialSimplexError::DegenerateInput { found: 3, .. })
        ));
    }

    #[test]
    fn test_coincident_points_are_degenerate() {
        assert!(matches!(
            simplex_of(&[[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]]),
            Err(InitialSimplexError::DegenerateInput { found: 1, .. })
        ));
    }

    #[test]
    fn test_tilted_plane_in_4d_is_degenerate() {
        // x_3 = x_0 + x_1 + x_2: a hyperplane not aligned with any axis.
        let points: Vec<[f64; 4]> = (0..30)
            .map(|i| {
                let a = f64::from(i % 3);
                let b = f64::from((i / 3) % 5);
                let c = f64::from(i / 15);
                [a, b, c, a + b + c]
            })
            .collect();
        assert!(matches!(
            simplex_of(&points),
            Err(InitialSimplexError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn test_lattice_seeds_full_dimensional_simplex() {
        let points: Vec<[f64; 3]> = (0..27)
            .map(|i| [f64::from(i % 3), f64::from((i / 3) % 3), f64::from(i / 9)])
            .collect();
        let simplex = simplex_of(&points).unwrap();
        let buffer = VertexBuffer::from_points(&points).unwrap();
        let vertices: Vec<&[f64]> = simplex.iter().map(|&v| buffer.position(v)).collect();
        assert!(simplex_volume(&vertices) > 0.1);
    }
}

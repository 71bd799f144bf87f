//! Delaunay triangulation by paraboloid lifting.
//!
//! Every point `x` is lifted to `(x, |x|²)` and the convex hull of the lifted
//! set is computed in one dimension higher. Faces of the lower envelope,
//! those whose outward normal points down the lifted axis, project back to
//! the Delaunay cells.

use std::borrow::Cow;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::algorithms::hull_expansion::{
    ExpandedHull, HullConstructionError, HullStatistics, expand_hull,
};
use crate::core::algorithms::initial_simplex::{InitialSimplexError, find_initial_simplex};
use crate::core::collections::{FastHashMap, FastHashSet};
use crate::core::face::{Face, FaceKey};
use crate::core::options::HullOptions;
use crate::core::vertex_buffer::VertexBuffer;
use crate::geometry::kernel::{simplex_orientation_determinant, simplex_volume};
use crate::geometry::util::{circumcenter, circumradius_with_center, squared_distance};

/// Lifted faces whose unit normal has a last component above `-VERTICAL_FACE_EPSILON`
/// belong to the upper envelope or are vertical, and project to nothing.
pub const VERTICAL_FACE_EPSILON: f64 = 1e-12;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur during triangulation validation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DelaunayValidationError {
    /// A cell has the wrong number of vertices or neighbor slots.
    #[error("Cell {cell_index} has {actual} vertices, expected {expected}")]
    InvalidCell {
        /// Index of the cell.
        cell_index: usize,
        /// `dimension + 1`.
        expected: usize,
        /// Vertex count found.
        actual: usize,
    },
    /// A cell contains a vertex twice.
    #[error("Cell {cell_index} has duplicate vertex {vertex}")]
    DuplicateVerticesInCell {
        /// Index of the cell.
        cell_index: usize,
        /// The repeated vertex.
        vertex: usize,
    },
    /// Neighbor relation is not mutual or the cells do not share a facet.
    #[error("Cell {cell_index} lists {neighbor} as a neighbor, but they do not share a facet")]
    NonMutualNeighbor {
        /// Index of the cell.
        cell_index: usize,
        /// The inconsistent neighbor.
        neighbor: usize,
    },
    /// A cell has no circumsphere.
    #[error("Cell {cell_index} is degenerate: {message}")]
    DegenerateCell {
        /// Index of the cell.
        cell_index: usize,
        /// Why the circumcenter failed.
        message: String,
    },
    /// An input point lies strictly inside a cell's circumsphere.
    #[error("Delaunay property violated: vertex {vertex} is inside the circumsphere of cell {cell_index}")]
    NotDelaunay {
        /// Index of the cell.
        cell_index: usize,
        /// The offending vertex.
        vertex: usize,
    },
}

// =============================================================================
// OUTPUT TYPES
// =============================================================================

/// A `dimension`-simplex of a [`DelaunayTriangulation`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelaunayCell {
    /// `dimension + 1` vertex indices into the input, positively oriented.
    pub vertices: Vec<usize>,
    /// `neighbors[i]` is the cell across the facet opposite `vertices[i]`,
    /// `None` on the convex hull boundary.
    pub neighbors: Vec<Option<usize>>,
}

impl DelaunayCell {
    /// Returns `true` if at least one facet lies on the hull boundary.
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        self.neighbors.iter().any(Option::is_none)
    }
}

/// Delaunay triangulation of a point set.
///
/// # Examples
///
/// ```rust
/// use nhull::geometry::algorithms::delaunay::DelaunayTriangulation;
///
/// let points = [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [2.0, 2.0]];
/// let dt = DelaunayTriangulation::from_points(&points).unwrap();
/// assert_eq!(dt.cell_count(), 4);
/// assert!(dt.cells().iter().all(|cell| cell.vertices.contains(&4)));
/// assert!(dt.validate_delaunay().is_ok());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DelaunayTriangulation {
    points: VertexBuffer,
    cells: Vec<DelaunayCell>,
    singular_vertices: Vec<usize>,
    statistics: HullStatistics,
    tolerance: f64,
}

impl DelaunayTriangulation {
    /// Triangulates `points` with default options.
    ///
    /// # Errors
    ///
    /// See [`DelaunayTriangulation::with_options`].
    pub fn from_points<P: AsRef<[f64]>>(points: &[P]) -> Result<Self, HullConstructionError> {
        Self::with_options(points, &HullOptions::default())
    }

    /// Triangulates `points` with `options`.
    ///
    /// Exactly `dimension + 1` affinely independent points form a single
    /// cell. Points that are cospherical as a whole (for example the four
    /// corners of a square alone) leave the lifted set flat and are rejected
    /// as degenerate unless internal translation is enabled.
    ///
    /// The plane distance tolerance is absolute and applies to the lifted
    /// coordinates, which scale with the square of the input spread. Inputs
    /// much smaller than the tolerance's square root look flat once lifted
    /// and should be rescaled first.
    ///
    /// # Errors
    ///
    /// Returns [`HullConstructionError`] for invalid options or input, too
    /// few or degenerate points, or cancellation.
    pub fn with_options<P: AsRef<[f64]>>(
        points: &[P],
        options: &HullOptions,
    ) -> Result<Self, HullConstructionError> {
        options.validate()?;
        let buffer = VertexBuffer::from_points(points)?;
        Self::build(buffer, options)
    }

    /// Triangulates an already loaded buffer.
    ///
    /// # Errors
    ///
    /// As [`DelaunayTriangulation::with_options`], minus input validation.
    pub fn from_vertex_buffer(
        buffer: VertexBuffer,
        options: &HullOptions,
    ) -> Result<Self, HullConstructionError> {
        options.validate()?;
        Self::build(buffer, options)
    }

    fn build(buffer: VertexBuffer, options: &HullOptions) -> Result<Self, HullConstructionError> {
        let dimension = buffer.dimension();
        let tolerance = options.plane_distance_tolerance();

        if buffer.len() <= dimension + 1 {
            return Self::single_simplex(buffer, tolerance);
        }

        let working = options.point_translation().apply(&buffer);
        let translated = matches!(working, Cow::Owned(_));
        let lifted = working.lifted();
        let expanded = expand_hull(&lifted, options).map_err(|err| match err {
            HullConstructionError::InitialSimplex(InitialSimplexError::DegenerateInput {
                found,
                message,
                ..
            }) => HullConstructionError::InitialSimplex(InitialSimplexError::DegenerateInput {
                dimension,
                found,
                message: format!(
                    "lifted points are cospherical or flat within the absolute tolerance {tolerance} \
                     (lifted coordinates scale with the squared input spread): {message}"
                ),
            }),
            other => other,
        })?;

        let mut triangulation = Self {
            cells: lower_envelope(&buffer, &expanded),
            points: buffer,
            singular_vertices: expanded.singular_vertices().to_vec(),
            statistics: expanded.statistics(),
            tolerance,
        };
        tracing::debug!(
            lifted_faces = expanded.face_count(),
            cells = triangulation.cells.len(),
            "Filtered lower envelope of lifted hull"
        );

        if translated {
            triangulation.peel_zero_volume_boundary(options.zero_cell_volume_tolerance());
        }
        Ok(triangulation)
    }

    fn single_simplex(buffer: VertexBuffer, tolerance: f64) -> Result<Self, HullConstructionError> {
        let mut vertices = find_initial_simplex(&buffer, tolerance)?;
        vertices.sort_unstable();
        let mut cell = DelaunayCell {
            neighbors: vec![None; vertices.len()],
            vertices,
        };
        orient_positively(&buffer, &mut cell);
        Ok(Self {
            points: buffer,
            cells: vec![cell],
            singular_vertices: Vec::new(),
            statistics: HullStatistics::default(),
            tolerance,
        })
    }

    /// Removes boundary cells of (near) zero volume until none remain.
    ///
    /// Translation can turn flat configurations on the hull boundary into
    /// slivers. Removing one may expose another, so neighbors of removed
    /// cells are re-examined.
    fn peel_zero_volume_boundary(&mut self, volume_tolerance: f64) {
        let mut removed = vec![false; self.cells.len()];
        let mut queue: VecDeque<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_boundary())
            .map(|(index, _)| index)
            .collect();

        while let Some(index) = queue.pop_front() {
            if removed[index] || !self.cells[index].is_boundary() {
                continue;
            }
            if self.cell_volume(index) > volume_tolerance {
                continue;
            }
            removed[index] = true;
            let neighbors: Vec<usize> = self.cells[index].neighbors.iter().flatten().copied().collect();
            for neighbor in neighbors {
                for slot in &mut self.cells[neighbor].neighbors {
                    if *slot == Some(index) {
                        *slot = None;
                    }
                }
                queue.push_back(neighbor);
            }
        }

        let count = removed.iter().filter(|&&r| r).count();
        if count == 0 {
            return;
        }

        let mut remap = vec![None; self.cells.len()];
        let mut next = 0;
        for (index, &gone) in removed.iter().enumerate() {
            if !gone {
                remap[index] = Some(next);
                next += 1;
            }
        }
        let cells = std::mem::take(&mut self.cells);
        self.cells = cells
            .into_iter()
            .zip(&removed)
            .filter(|(_, gone)| !**gone)
            .map(|(mut cell, _)| {
                for neighbor in &mut cell.neighbors {
                    *neighbor = neighbor.and_then(|n| remap[n]);
                }
                cell
            })
            .collect();
        tracing::debug!(
            removed = count,
            remaining = self.cells.len(),
            "Peeled zero-volume boundary cells"
        );
    }

    fn cell_positions(&self, cell: &DelaunayCell) -> Vec<&[f64]> {
        cell.vertices.iter().map(|&v| self.points.position(v)).collect()
    }

    fn cell_volume(&self, index: usize) -> f64 {
        simplex_volume(&self.cell_positions(&self.cells[index]))
    }

    /// The dimension of the input points.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.points.dimension()
    }

    /// Input points.
    #[must_use]
    pub const fn points(&self) -> &VertexBuffer {
        &self.points
    }

    /// Delaunay cells.
    #[must_use]
    pub fn cells(&self) -> &[DelaunayCell] {
        &self.cells
    }

    /// Number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cell by index.
    #[must_use]
    pub fn get_cell(&self, index: usize) -> Option<&DelaunayCell> {
        self.cells.get(index)
    }

    /// Number of facets shared by two cells.
    #[must_use]
    pub fn interior_facet_count(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| cell.neighbors.iter().flatten().count())
            .sum::<usize>()
            / 2
    }

    /// Number of facets on the convex hull boundary.
    #[must_use]
    pub fn boundary_facet_count(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| cell.neighbors.iter().filter(|n| n.is_none()).count())
            .sum()
    }

    /// Input points skipped by the lifted hull as singular.
    #[must_use]
    pub fn singular_vertices(&self) -> &[usize] {
        &self.singular_vertices
    }

    /// Counters from the lifted hull construction.
    #[must_use]
    pub const fn statistics(&self) -> HullStatistics {
        self.statistics
    }

    /// Checks cell structure and neighbor mutuality.
    ///
    /// # Errors
    ///
    /// Returns the first [`DelaunayValidationError`] found.
    pub fn validate(&self) -> Result<(), DelaunayValidationError> {
        let expected = self.dimension() + 1;
        for (cell_index, cell) in self.cells.iter().enumerate() {
            if cell.vertices.len() != expected || cell.neighbors.len() != expected {
                return Err(DelaunayValidationError::InvalidCell {
                    cell_index,
                    expected,
                    actual: cell.vertices.len(),
                });
            }
            let mut seen = FastHashSet::default();
            if let Some(&vertex) = cell.vertices.iter().find(|&&v| !seen.insert(v)) {
                return Err(DelaunayValidationError::DuplicateVerticesInCell { cell_index, vertex });
            }

            for (slot, neighbor) in cell.neighbors.iter().enumerate() {
                let Some(neighbor) = *neighbor else {
                    continue;
                };
                let shares_facet = self.cells.get(neighbor).is_some_and(|other| {
                    other
                        .neighbors
                        .iter()
                        .position(|&n| n == Some(cell_index))
                        .is_some_and(|back| {
                            let opposite = other.vertices[back];
                            !cell.vertices.contains(&opposite)
                                && cell
                                    .vertices
                                    .iter()
                                    .enumerate()
                                    .filter(|&(i, _)| i != slot)
                                    .all(|(_, v)| other.vertices.contains(v))
                        })
                });
                if !shares_facet {
                    return Err(DelaunayValidationError::NonMutualNeighbor {
                        cell_index,
                        neighbor,
                    });
                }
            }
        }
        Ok(())
    }

    /// Checks the empty-circumsphere property against every input point.
    ///
    /// A point counts as inside when its squared distance from the
    /// circumcenter falls short of the squared radius by more than the
    /// tolerance, scaled by the squared radius for large cells. Quadratic in
    /// the input; intended for tests and diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`DelaunayValidationError::DegenerateCell`] for a cell without a
    /// circumsphere and [`DelaunayValidationError::NotDelaunay`] for the first
    /// violation.
    pub fn validate_delaunay(&self) -> Result<(), DelaunayValidationError> {
        for (cell_index, cell) in self.cells.iter().enumerate() {
            let positions = self.cell_positions(cell);
            let center = circumcenter(&positions).map_err(|err| {
                DelaunayValidationError::DegenerateCell {
                    cell_index,
                    message: err.to_string(),
                }
            })?;
            let radius = circumradius_with_center(&positions, &center);
            let radius_squared = radius * radius;
            let slack = self.tolerance * radius_squared.max(1.0);
            for (vertex, position) in self.points.iter().enumerate() {
                if cell.vertices.contains(&vertex) {
                    continue;
                }
                if radius_squared - squared_distance(&center, position) > slack {
                    return Err(DelaunayValidationError::NotDelaunay { cell_index, vertex });
                }
            }
        }
        Ok(())
    }
}

/// Projects the lower faces of the lifted hull to cells.
fn lower_envelope(points: &VertexBuffer, expanded: &ExpandedHull) -> Vec<DelaunayCell> {
    let lifted_axis = points.dimension();
    let mut lower: Vec<(FaceKey, &Face)> = expanded
        .faces()
        .filter(|(_, face)| face.normal()[lifted_axis] < -VERTICAL_FACE_EPSILON)
        .collect();
    lower.sort_unstable_by(|a, b| a.1.vertices().cmp(b.1.vertices()));

    let index_of: FastHashMap<FaceKey, usize> = lower
        .iter()
        .enumerate()
        .map(|(index, (key, _))| (*key, index))
        .collect();

    lower
        .iter()
        .map(|(_, face)| {
            let mut cell = DelaunayCell {
                vertices: face.vertices().to_vec(),
                neighbors: face
                    .adjacency()
                    .iter()
                    .map(|neighbor| neighbor.and_then(|key| index_of.get(&key).copied()))
                    .collect(),
            };
            orient_positively(points, &mut cell);
            cell
        })
        .collect()
}

fn orient_positively(points: &VertexBuffer, cell: &mut DelaunayCell) {
    let positions: Vec<&[f64]> = cell.vertices.iter().map(|&v| points.position(v)).collect();
    if simplex_orientation_determinant(&positions) < 0.0 {
        cell.vertices.swap(0, 1);
        cell.neighbors.swap(0, 1);
    }
}

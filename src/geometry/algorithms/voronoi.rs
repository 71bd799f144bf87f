//! Voronoi diagrams as the dual of a Delaunay triangulation.
//!
//! One node per Delaunay cell, one edge per pair of cells sharing a facet.
//! Cells on the hull boundary yield unbounded regions; their nodes are
//! reported in [`VoronoiDiagram::unbounded_nodes`] but no rays are emitted.

use serde::{Deserialize, Serialize};

use crate::core::algorithms::hull_expansion::HullConstructionError;
use crate::core::options::HullOptions;
use crate::geometry::algorithms::delaunay::DelaunayTriangulation;
use crate::geometry::util::circumcenter;

/// Where a Voronoi node is placed within its Delaunay cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoronoiNodePlacement {
    /// Mean of the cell's vertices. Always inside the cell.
    #[default]
    Centroid,
    /// Circumcenter of the cell, the true Voronoi vertex. Falls back to the
    /// centroid for cells without a finite circumcenter.
    Circumcenter,
}

/// Voronoi diagram derived from a [`DelaunayTriangulation`].
///
/// # Examples
///
/// ```rust
/// use nhull::geometry::algorithms::voronoi::VoronoiDiagram;
///
/// let points = [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [2.0, 2.0]];
/// let voronoi = VoronoiDiagram::from_points(&points).unwrap();
/// assert_eq!(voronoi.nodes().len(), 4);
/// assert_eq!(voronoi.edges().len(), 4);
/// assert_eq!(voronoi.unbounded_nodes().len(), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoronoiDiagram {
    nodes: Vec<Vec<f64>>,
    edges: Vec<(usize, usize)>,
    unbounded_nodes: Vec<usize>,
    placement: VoronoiNodePlacement,
}

impl VoronoiDiagram {
    /// Builds the diagram of `points` with default options.
    ///
    /// # Errors
    ///
    /// Returns the [`HullConstructionError`] of the underlying triangulation.
    pub fn from_points<P: AsRef<[f64]>>(points: &[P]) -> Result<Self, HullConstructionError> {
        Self::with_options(points, &HullOptions::default())
    }

    /// Builds the diagram of `points`, placing nodes per
    /// [`HullOptions::voronoi_node_placement`].
    ///
    /// # Errors
    ///
    /// Returns the [`HullConstructionError`] of the underlying triangulation.
    pub fn with_options<P: AsRef<[f64]>>(
        points: &[P],
        options: &HullOptions,
    ) -> Result<Self, HullConstructionError> {
        let triangulation = DelaunayTriangulation::with_options(points, options)?;
        Ok(Self::from_triangulation(
            &triangulation,
            options.voronoi_node_placement(),
        ))
    }

    /// Derives the dual of `triangulation`.
    ///
    /// Node `i` corresponds to cell `i`. Each edge `(a, b)` has `a < b` and
    /// appears once; edges are sorted.
    #[must_use]
    pub fn from_triangulation(
        triangulation: &DelaunayTriangulation,
        placement: VoronoiNodePlacement,
    ) -> Self {
        let points = triangulation.points();
        let dimension = triangulation.dimension();
        let mut nodes = Vec::with_capacity(triangulation.cell_count());
        let mut edges = Vec::new();
        let mut unbounded_nodes = Vec::new();

        for (index, cell) in triangulation.cells().iter().enumerate() {
            let positions: Vec<&[f64]> = cell.vertices.iter().map(|&v| points.position(v)).collect();
            let node = match placement {
                VoronoiNodePlacement::Centroid => centroid(&positions, dimension),
                VoronoiNodePlacement::Circumcenter => circumcenter(&positions)
                    .ok()
                    .filter(|center| center.iter().all(|x| x.is_finite()))
                    .unwrap_or_else(|| centroid(&positions, dimension)),
            };
            nodes.push(node);

            if cell.is_boundary() {
                unbounded_nodes.push(index);
            }
            edges.extend(
                cell.neighbors
                    .iter()
                    .flatten()
                    .filter(|&&neighbor| index < neighbor)
                    .map(|&neighbor| (index, neighbor)),
            );
        }
        edges.sort_unstable();
        edges.dedup();

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            unbounded = unbounded_nodes.len(),
            "Derived Voronoi diagram"
        );

        Self {
            nodes,
            edges,
            unbounded_nodes,
            placement,
        }
    }

    /// Node positions, one per Delaunay cell.
    #[must_use]
    pub fn nodes(&self) -> &[Vec<f64>] {
        &self.nodes
    }

    /// Edges between nodes of adjacent cells.
    #[must_use]
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Nodes whose cell touches the hull boundary.
    #[must_use]
    pub fn unbounded_nodes(&self) -> &[usize] {
        &self.unbounded_nodes
    }

    /// How the nodes were placed.
    #[must_use]
    pub const fn placement(&self) -> VoronoiNodePlacement {
        self.placement
    }

    /// Number of edges incident to `node`.
    #[must_use]
    pub fn degree(&self, node: usize) -> usize {
        self.edges
            .iter()
            .filter(|&&(a, b)| a == node || b == node)
            .count()
    }
}

fn centroid(positions: &[&[f64]], dimension: usize) -> Vec<f64> {
    let mut center = vec![0.0; dimension];
    for position in positions {
        for (c, &x) in center.iter_mut().zip(*position) {
            *c += x;
        }
    }
    let count = positions.len().max(1) as f64;
    for c in &mut center {
        *c /= count;
    }
    center
}

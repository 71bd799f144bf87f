//! Convex hulls of n-dimensional point sets.
//!
//! [`ConvexHull`] runs the incremental expansion on a private copy of the
//! input and reports its simplicial faces in the original coordinates, with
//! outward unit normals, a consistent winding and face-to-face adjacency.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::algorithms::hull_expansion::{
    ExpandedHull, HullConstructionError, HullStatistics, expand_hull,
};
use crate::core::collections::{FastHashMap, FastHashSet};
use crate::core::face::{Face, FaceKey};
use crate::core::options::HullOptions;
use crate::core::vertex_buffer::VertexBuffer;
use crate::geometry::kernel::{facet_orientation_determinant, hyperplane, signed_distance};
use crate::geometry::util::dot;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur during convex hull validation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConvexHullValidationError {
    /// A face has the wrong number of vertices.
    #[error("Face {face_index} has {actual} vertices, expected {expected}")]
    InvalidFace {
        /// Index of the invalid face.
        face_index: usize,
        /// The hull dimension.
        expected: usize,
        /// Vertex count found.
        actual: usize,
    },
    /// A face contains a vertex twice.
    #[error("Face {face_index} has duplicate vertex {vertex}")]
    DuplicateVerticesInFace {
        /// Index of the face.
        face_index: usize,
        /// The repeated vertex.
        vertex: usize,
    },
    /// A hull vertex lies beyond a face.
    #[error("Hull is not convex: vertex {vertex} is {distance} beyond face {face_index}")]
    NotConvex {
        /// Index of the face.
        face_index: usize,
        /// The offending vertex.
        vertex: usize,
        /// Its signed distance from the face.
        distance: f64,
    },
    /// A ridge has no neighboring face.
    #[error("Face {face_index} has no neighbor across slot {slot}")]
    OpenRidge {
        /// Index of the face.
        face_index: usize,
        /// The unmatched adjacency slot.
        slot: usize,
    },
    /// Two faces disagree about their shared ridge.
    #[error("Face {face_index} lists {neighbor} as a neighbor, but not vice versa")]
    NonMutualAdjacency {
        /// Index of the face.
        face_index: usize,
        /// The neighbor that does not point back.
        neighbor: usize,
    },
}

/// Errors returned by hull queries.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HullQueryError {
    /// The query point has the wrong number of coordinates.
    #[error("Query point has {actual} coordinates, hull dimension is {expected}")]
    DimensionMismatch {
        /// The hull dimension.
        expected: usize,
        /// Coordinates supplied.
        actual: usize,
    },
    /// No face with this index exists.
    #[error("Face index {index} is out of range for a hull with {count} faces")]
    FaceOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of faces.
        count: usize,
    },
}

// =============================================================================
// OUTPUT TYPES
// =============================================================================

/// A simplicial face of a [`ConvexHull`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HullFace {
    /// Vertex indices into the input, wound so that
    /// `det[normal; v1 - v0; ...] > 0` (counter-clockwise from outside in 2D
    /// and 3D).
    pub vertices: Vec<usize>,
    /// Outward unit normal.
    pub normal: Vec<f64>,
    /// Plane offset: `normal · x + offset = 0` on the face.
    pub offset: f64,
    /// `adjacency[i]` is the face across the ridge opposite `vertices[i]`.
    pub adjacency: Vec<Option<usize>>,
    /// Whether the vertex order was swapped to obtain the winding.
    pub orientation_flipped: bool,
}

/// Convex hull of a point set.
///
/// # Examples
///
/// ```rust
/// use nhull::geometry::algorithms::convex_hull::ConvexHull;
///
/// let points = [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [2.0, 2.0]];
/// let hull = ConvexHull::from_points(&points).unwrap();
/// assert_eq!(hull.vertices(), &[0, 1, 2, 3]);
/// assert_eq!(hull.face_count(), 4);
/// assert!(hull.validate().is_ok());
/// assert!(hull.is_point_outside(&[5.0, 1.0]).unwrap());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConvexHull {
    points: VertexBuffer,
    vertices: Vec<usize>,
    faces: Vec<HullFace>,
    singular_vertices: Vec<usize>,
    statistics: HullStatistics,
    tolerance: f64,
}

impl ConvexHull {
    /// Computes the hull of `points` with default options.
    ///
    /// # Errors
    ///
    /// See [`ConvexHull::with_options`].
    pub fn from_points<P: AsRef<[f64]>>(points: &[P]) -> Result<Self, HullConstructionError> {
        Self::with_options(points, &HullOptions::default())
    }

    /// Computes the hull of `points` with `options`.
    ///
    /// # Errors
    ///
    /// - [`HullConstructionError::InvalidOptions`] for rejected options
    /// - [`HullConstructionError::VertexBuffer`] for empty, low-dimension,
    ///   non-uniform or non-finite input
    /// - [`HullConstructionError::InitialSimplex`] for too few or degenerate points
    /// - [`HullConstructionError::Cancelled`] if the cancellation flag is raised
    pub fn with_options<P: AsRef<[f64]>>(
        points: &[P],
        options: &HullOptions,
    ) -> Result<Self, HullConstructionError> {
        options.validate()?;
        let buffer = VertexBuffer::from_points(points)?;
        Self::build(buffer, options)
    }

    /// Computes the hull of an already loaded buffer.
    ///
    /// # Errors
    ///
    /// As [`ConvexHull::with_options`], minus input validation.
    pub fn from_vertex_buffer(
        buffer: VertexBuffer,
        options: &HullOptions,
    ) -> Result<Self, HullConstructionError> {
        options.validate()?;
        Self::build(buffer, options)
    }

    fn build(buffer: VertexBuffer, options: &HullOptions) -> Result<Self, HullConstructionError> {
        let working = options.point_translation().apply(&buffer);
        let expanded = expand_hull(&working, options)?;
        let translated = matches!(working, Cow::Owned(_));
        Ok(Self::from_expanded(
            buffer,
            &expanded,
            translated,
            options.plane_distance_tolerance(),
        ))
    }

    fn from_expanded(
        points: VertexBuffer,
        expanded: &ExpandedHull,
        translated: bool,
        tolerance: f64,
    ) -> Self {
        let mut entries: Vec<(FaceKey, &Face)> = expanded.faces().collect();
        entries.sort_unstable_by(|a, b| a.1.vertices().cmp(b.1.vertices()));
        let index_of: FastHashMap<FaceKey, usize> = entries
            .iter()
            .enumerate()
            .map(|(index, (key, _))| (*key, index))
            .collect();

        let dimension = points.dimension();
        let mut faces = Vec::with_capacity(entries.len());
        let mut normal = vec![0.0; dimension];
        for (_, face) in &entries {
            let mut vertices = face.vertices().to_vec();
            let mut adjacency: Vec<Option<usize>> = face
                .adjacency()
                .iter()
                .map(|neighbor| neighbor.and_then(|key| index_of.get(&key).copied()))
                .collect();

            // Report planes in the caller's coordinates. Faces that are only
            // regular thanks to translation keep the working normal.
            let offset = if translated {
                match hyperplane(&points, &vertices, expanded.interior_point(), &mut normal) {
                    Ok(plane) => plane.offset,
                    Err(_) => {
                        normal.copy_from_slice(face.normal());
                        -dot(&normal, points.position(vertices[0]))
                    }
                }
            } else {
                normal.copy_from_slice(face.normal());
                face.offset()
            };

            let positions: Vec<&[f64]> = vertices.iter().map(|&v| points.position(v)).collect();
            let orientation_flipped = facet_orientation_determinant(&normal, &positions) < 0.0;
            if orientation_flipped {
                vertices.swap(0, 1);
                adjacency.swap(0, 1);
            }

            faces.push(HullFace {
                vertices,
                normal: normal.clone(),
                offset,
                adjacency,
                orientation_flipped,
            });
        }

        let mut vertices: Vec<usize> = faces
            .iter()
            .flat_map(|face| face.vertices.iter().copied())
            .collect::<FastHashSet<_>>()
            .into_iter()
            .collect();
        vertices.sort_unstable();

        Self {
            points,
            vertices,
            faces,
            singular_vertices: expanded.singular_vertices().to_vec(),
            statistics: expanded.statistics(),
            tolerance,
        }
    }

    /// The hull dimension.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.points.dimension()
    }

    /// Input points in their original coordinates.
    #[must_use]
    pub const fn points(&self) -> &VertexBuffer {
        &self.points
    }

    /// Sorted indices of the input points that are hull vertices.
    #[must_use]
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Hull faces.
    #[must_use]
    pub fn faces(&self) -> &[HullFace] {
        &self.faces
    }

    /// Face by index.
    #[must_use]
    pub fn get_face(&self, index: usize) -> Option<&HullFace> {
        self.faces.get(index)
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Input points skipped because their cone was singular.
    #[must_use]
    pub fn singular_vertices(&self) -> &[usize] {
        &self.singular_vertices
    }

    /// Counters from the construction.
    #[must_use]
    pub const fn statistics(&self) -> HullStatistics {
        self.statistics
    }

    /// Plane distance tolerance the hull was built with.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn check_dimension(&self, point: &[f64]) -> Result<(), HullQueryError> {
        if point.len() == self.dimension() {
            Ok(())
        } else {
            Err(HullQueryError::DimensionMismatch {
                expected: self.dimension(),
                actual: point.len(),
            })
        }
    }

    /// Signed distance of `point` from face `face`; positive outside.
    ///
    /// # Errors
    ///
    /// Returns [`HullQueryError`] for a bad face index or point dimension.
    pub fn signed_distance(&self, face: usize, point: &[f64]) -> Result<f64, HullQueryError> {
        self.check_dimension(point)?;
        let hull_face = self.faces.get(face).ok_or(HullQueryError::FaceOutOfRange {
            index: face,
            count: self.faces.len(),
        })?;
        Ok(signed_distance(&hull_face.normal, hull_face.offset, point))
    }

    /// Indices of faces `point` lies beyond (by more than the tolerance).
    ///
    /// # Errors
    ///
    /// Returns [`HullQueryError::DimensionMismatch`] for a point of the wrong dimension.
    pub fn find_visible_faces(&self, point: &[f64]) -> Result<Vec<usize>, HullQueryError> {
        self.check_dimension(point)?;
        Ok(self
            .faces
            .iter()
            .enumerate()
            .filter(|(_, face)| signed_distance(&face.normal, face.offset, point) > self.tolerance)
            .map(|(index, _)| index)
            .collect())
    }

    /// The visible face whose plane is closest to `point`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`HullQueryError::DimensionMismatch`] for a point of the wrong dimension.
    pub fn find_nearest_visible_face(&self, point: &[f64]) -> Result<Option<usize>, HullQueryError> {
        let visible = self.find_visible_faces(point)?;
        Ok(visible.into_iter().min_by(|&a, &b| {
            let da = signed_distance(&self.faces[a].normal, self.faces[a].offset, point);
            let db = signed_distance(&self.faces[b].normal, self.faces[b].offset, point);
            da.total_cmp(&db)
        }))
    }

    /// Returns `true` if `point` is beyond at least one face.
    ///
    /// # Errors
    ///
    /// Returns [`HullQueryError::DimensionMismatch`] for a point of the wrong dimension.
    pub fn is_point_outside(&self, point: &[f64]) -> Result<bool, HullQueryError> {
        self.check_dimension(point)?;
        Ok(self
            .faces
            .iter()
            .any(|face| signed_distance(&face.normal, face.offset, point) > self.tolerance))
    }

    /// Checks face structure, closure and convexity.
    ///
    /// - every face has `dimension` distinct vertices
    /// - every adjacency slot is filled, and the neighbor points back across
    ///   the same ridge
    /// - no hull vertex is beyond any face by more than the tolerance
    ///
    /// # Errors
    ///
    /// Returns the first [`ConvexHullValidationError`] found.
    pub fn validate(&self) -> Result<(), ConvexHullValidationError> {
        let dimension = self.dimension();
        for (face_index, face) in self.faces.iter().enumerate() {
            if face.vertices.len() != dimension || face.adjacency.len() != dimension {
                return Err(ConvexHullValidationError::InvalidFace {
                    face_index,
                    expected: dimension,
                    actual: face.vertices.len(),
                });
            }
            let mut seen = FastHashSet::default();
            for &vertex in &face.vertices {
                if !seen.insert(vertex) {
                    return Err(ConvexHullValidationError::DuplicateVerticesInFace {
                        face_index,
                        vertex,
                    });
                }
            }

            for (slot, neighbor) in face.adjacency.iter().enumerate() {
                let Some(neighbor) = *neighbor else {
                    return Err(ConvexHullValidationError::OpenRidge { face_index, slot });
                };
                let mutual = self.faces.get(neighbor).is_some_and(|other| {
                    other
                        .adjacency
                        .iter()
                        .position(|&n| n == Some(face_index))
                        .is_some_and(|back| {
                            let mut ours: Vec<usize> = ridge(&face.vertices, slot).collect();
                            let mut theirs: Vec<usize> = ridge(&other.vertices, back).collect();
                            ours.sort_unstable();
                            theirs.sort_unstable();
                            ours == theirs
                        })
                });
                if !mutual {
                    return Err(ConvexHullValidationError::NonMutualAdjacency {
                        face_index,
                        neighbor,
                    });
                }
            }

            for &vertex in &self.vertices {
                let distance =
                    signed_distance(&face.normal, face.offset, self.points.position(vertex));
                if distance > self.tolerance {
                    return Err(ConvexHullValidationError::NotConvex {
                        face_index,
                        vertex,
                        distance,
                    });
                }
            }
        }
        Ok(())
    }
}

fn ridge(vertices: &[usize], omitted: usize) -> impl Iterator<Item = usize> + '_ {
    vertices
        .iter()
        .enumerate()
        .filter(move |&(i, _)| i != omitted)
        .map(|(_, &v)| v)
}

//! Flat position buffer shared by every hull computation.
//!
//! Vertices are opaque `usize` handles into a `len × dimension` array of
//! `f64`. The buffer is a private working copy: callers' coordinate storage is
//! never touched, and the buffer itself is immutable once a computation has
//! started.

#![forbid(unsafe_code)]

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::core::translation::TranslationGenerator;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised while loading input points into a [`VertexBuffer`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum VertexBufferError {
    /// No points were supplied.
    #[error("No input points were supplied")]
    Empty,
    /// The resolved dimension is below 2.
    #[error("Dimension {dimension} is too small: at least 2 coordinates per point are required")]
    DimensionTooSmall {
        /// The dimension resolved from the first point.
        dimension: usize,
    },
    /// Points disagree on their coordinate count.
    #[error(
        "Non-uniform dimension: point {index} has {actual} coordinates, expected {expected}"
    )]
    NonUniformDimension {
        /// Index of the first offending point.
        index: usize,
        /// The dimension resolved from the first point.
        expected: usize,
        /// The coordinate count of the offending point.
        actual: usize,
    },
    /// A coordinate is NaN or infinite.
    #[error("Point {index} has a non-finite coordinate on axis {axis}")]
    NonFiniteCoordinate {
        /// Index of the offending point.
        index: usize,
        /// Axis of the offending coordinate.
        axis: usize,
    },
    /// A flat coordinate array does not hold a whole number of points.
    #[error("{len} coordinates do not split into points of dimension {dimension}")]
    RaggedPositions {
        /// Number of coordinates supplied.
        len: usize,
        /// The declared dimension.
        dimension: usize,
    },
}

// =============================================================================
// VERTEX BUFFER
// =============================================================================

/// Row-major position storage for `len()` vertices of `dimension()` coordinates.
///
/// # Examples
///
/// ```rust
/// use nhull::core::vertex_buffer::VertexBuffer;
///
/// let buffer = VertexBuffer::from_points(&[[0.0, 0.0], [1.0, 2.0]]).unwrap();
/// assert_eq!(buffer.dimension(), 2);
/// assert_eq!(buffer.len(), 2);
/// assert_eq!(buffer.position(1), &[1.0, 2.0]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VertexBuffer {
    dimension: usize,
    positions: Vec<f64>,
}

/// Serialized layout of [`VertexBuffer`], checked before use.
#[derive(Deserialize)]
struct RawVertexBuffer {
    dimension: usize,
    positions: Vec<f64>,
}

// Deserialized buffers go through the same checks as `from_points`.
impl<'de> Deserialize<'de> for VertexBuffer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawVertexBuffer::deserialize(deserializer)?;
        Self::from_flat(raw.dimension, raw.positions).map_err(D::Error::custom)
    }
}

impl VertexBuffer {
    /// Copies `points` into a new buffer.
    ///
    /// The dimension is taken from the first point and every point is checked
    /// against it, so a malformed point anywhere in the input is reported.
    ///
    /// # Errors
    ///
    /// - [`VertexBufferError::Empty`] if `points` is empty
    /// - [`VertexBufferError::DimensionTooSmall`] if points have fewer than 2 coordinates
    /// - [`VertexBufferError::NonUniformDimension`] naming the first mismatching point
    /// - [`VertexBufferError::NonFiniteCoordinate`] for NaN or infinite input
    pub fn from_points<P: AsRef<[f64]>>(points: &[P]) -> Result<Self, VertexBufferError> {
        let first = points.first().ok_or(VertexBufferError::Empty)?;
        let dimension = first.as_ref().len();
        if dimension < 2 {
            return Err(VertexBufferError::DimensionTooSmall { dimension });
        }

        let mut positions = Vec::with_capacity(points.len() * dimension);
        for (index, point) in points.iter().enumerate() {
            let coords = point.as_ref();
            if coords.len() != dimension {
                return Err(VertexBufferError::NonUniformDimension {
                    index,
                    expected: dimension,
                    actual: coords.len(),
                });
            }
            if let Some(axis) = coords.iter().position(|c| !c.is_finite()) {
                return Err(VertexBufferError::NonFiniteCoordinate { index, axis });
            }
            positions.extend_from_slice(coords);
        }

        Ok(Self {
            dimension,
            positions,
        })
    }

    /// Wraps a row-major coordinate array of `dimension` values per point.
    ///
    /// # Errors
    ///
    /// - [`VertexBufferError::DimensionTooSmall`] if `dimension < 2`
    /// - [`VertexBufferError::Empty`] if `positions` is empty
    /// - [`VertexBufferError::RaggedPositions`] if `positions.len()` is not a
    ///   multiple of `dimension`
    /// - [`VertexBufferError::NonFiniteCoordinate`] for NaN or infinite input
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nhull::core::vertex_buffer::{VertexBuffer, VertexBufferError};
    ///
    /// let buffer = VertexBuffer::from_flat(2, vec![0.0, 0.0, 1.0, 2.0]).unwrap();
    /// assert_eq!(buffer.position(1), &[1.0, 2.0]);
    /// assert_eq!(
    ///     VertexBuffer::from_flat(2, vec![1.0, 2.0, 3.0]),
    ///     Err(VertexBufferError::RaggedPositions { len: 3, dimension: 2 })
    /// );
    /// ```
    pub fn from_flat(dimension: usize, positions: Vec<f64>) -> Result<Self, VertexBufferError> {
        if dimension < 2 {
            return Err(VertexBufferError::DimensionTooSmall { dimension });
        }
        if positions.is_empty() {
            return Err(VertexBufferError::Empty);
        }
        if positions.len() % dimension != 0 {
            return Err(VertexBufferError::RaggedPositions {
                len: positions.len(),
                dimension,
            });
        }
        if let Some(flat) = positions.iter().position(|c| !c.is_finite()) {
            return Err(VertexBufferError::NonFiniteCoordinate {
                index: flat / dimension,
                axis: flat % dimension,
            });
        }
        Ok(Self {
            dimension,
            positions,
        })
    }

    /// The number of coordinates per vertex.
    #[inline]
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// The number of vertices.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.positions.len() / self.dimension
    }

    /// Returns `true` if the buffer holds no vertices.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Coordinates of vertex `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    #[must_use]
    pub fn position(&self, index: usize) -> &[f64] {
        let start = index * self.dimension;
        &self.positions[start..start + self.dimension]
    }

    /// Iterates over all vertex positions in index order.
    pub fn iter(&self) -> std::slice::ChunksExact<'_, f64> {
        self.positions.chunks_exact(self.dimension)
    }

    /// Arithmetic mean of all positions.
    #[must_use]
    pub fn centroid(&self) -> Vec<f64> {
        let mut centroid = vec![0.0; self.dimension];
        for position in self.iter() {
            for (c, &x) in centroid.iter_mut().zip(position) {
                *c += x;
            }
        }
        let n = self.len() as f64;
        for c in &mut centroid {
            *c /= n;
        }
        centroid
    }

    /// Axis-aligned bounding box as `(min, max)` corner coordinates.
    #[must_use]
    pub fn bounding_box(&self) -> (Vec<f64>, Vec<f64>) {
        let mut min = vec![f64::INFINITY; self.dimension];
        let mut max = vec![f64::NEG_INFINITY; self.dimension];
        for position in self.iter() {
            for axis in 0..self.dimension {
                min[axis] = min[axis].min(position[axis]);
                max[axis] = max[axis].max(position[axis]);
            }
        }
        (min, max)
    }

    /// Lifts every vertex onto the paraboloid `x_{d+1} = Σ x_i²`.
    ///
    /// Points are first centred on their centroid. The lower hull of the
    /// lifted set is the Delaunay triangulation of the input, and centring
    /// leaves it unchanged while keeping the lifted coordinate small.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nhull::core::vertex_buffer::VertexBuffer;
    ///
    /// let buffer = VertexBuffer::from_points(&[[1.0, 0.0], [-1.0, 0.0], [0.0, 2.0], [0.0, -2.0]]).unwrap();
    /// let lifted = buffer.lifted();
    /// assert_eq!(lifted.dimension(), 3);
    /// assert_eq!(lifted.position(2), &[0.0, 2.0, 4.0]);
    /// ```
    #[must_use]
    pub fn lifted(&self) -> Self {
        let centroid = self.centroid();
        let dimension = self.dimension + 1;
        let mut positions = Vec::with_capacity(self.len() * dimension);
        for position in self.iter() {
            let mut norm_squared = 0.0;
            for (&x, &c) in position.iter().zip(&centroid) {
                let shifted = x - c;
                norm_squared += shifted * shifted;
                positions.push(shifted);
            }
            positions.push(norm_squared);
        }
        Self {
            dimension,
            positions,
        }
    }

    /// Returns a copy with every coordinate offset by `generator`.
    ///
    /// Used to break ties on lattice or otherwise degenerate input. Results
    /// are always reported against the untranslated buffer.
    #[must_use]
    pub fn translated(&self, generator: &TranslationGenerator) -> Self {
        let offsets = generator.offsets(self.len(), self.dimension);
        let positions = self
            .positions
            .iter()
            .zip(offsets)
            .map(|(&x, offset)| x + offset)
            .collect();
        Self {
            dimension: self.dimension,
            positions,
        }
    }
}

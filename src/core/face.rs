//! Hull faces (facets) and their keys.
//!
//! A face of a d-dimensional hull is a (d-1)-simplex: `d` sorted vertex
//! indices, an outward unit normal with plane offset, `d` adjacency slots and
//! the beyond set of pending vertices strictly outside its hyperplane.
//! Adjacency slot `i` holds the neighbor across the ridge that omits
//! `vertices[i]`.

#![forbid(unsafe_code)]

use slotmap::new_key_type;

use crate::core::collections::{CoordinateBuffer, FaceVertexBuffer, SmallBuffer};
use crate::core::vertex_buffer::VertexBuffer;
use crate::geometry::kernel::signed_distance;

new_key_type! {
    /// Key type for accessing faces in the [`FacePool`](crate::core::face_pool::FacePool).
    ///
    /// Keys are generation-tagged, so a key to a recycled face never
    /// resolves to the face that reused its slot.
    pub struct FaceKey;
}

/// Adjacency slots of a face, one per ridge.
pub type FaceAdjacency = SmallBuffer<Option<FaceKey>, 8>;

/// Lifecycle state of a live face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FaceState {
    /// Created but not yet classified.
    #[default]
    New,
    /// Non-empty beyond set; queued in the worklist.
    Open,
    /// Empty beyond set; part of the hull and never revisited.
    Final,
}

/// Furthest beyond vertex of a face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FurthestVertex {
    /// Vertex index.
    pub vertex: usize,
    /// Its signed distance from the face's hyperplane.
    pub distance: f64,
}

/// A simplicial hull face.
#[derive(Clone, Debug, Default)]
pub struct Face {
    pub(crate) vertices: FaceVertexBuffer,
    pub(crate) normal: CoordinateBuffer,
    pub(crate) offset: f64,
    pub(crate) flipped: bool,
    pub(crate) adjacency: FaceAdjacency,
    pub(crate) beyond: Vec<usize>,
    pub(crate) furthest: Option<FurthestVertex>,
    pub(crate) state: FaceState,
    pub(crate) visit_tag: u64,
}

impl Face {
    /// Clears the face for reuse while keeping its buffers' capacity.
    pub(crate) fn reset(&mut self, dimension: usize) {
        self.vertices.clear();
        self.normal.clear();
        self.normal.resize(dimension, 0.0);
        self.offset = 0.0;
        self.flipped = false;
        self.adjacency.clear();
        self.adjacency.resize(dimension, None);
        self.beyond.clear();
        self.furthest = None;
        self.state = FaceState::New;
        self.visit_tag = 0;
    }

    /// Sorted vertex indices.
    #[must_use]
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Outward unit normal.
    #[must_use]
    pub fn normal(&self) -> &[f64] {
        &self.normal
    }

    /// Plane offset: `normal · x + offset = 0` on the face.
    #[must_use]
    pub const fn offset(&self) -> f64 {
        self.offset
    }

    /// Whether the kernel negated the computed normal to make it outward.
    #[must_use]
    pub const fn orientation_flipped(&self) -> bool {
        self.flipped
    }

    /// Neighbor across the ridge omitting `vertices()[i]`, per slot.
    #[must_use]
    pub fn adjacency(&self) -> &[Option<FaceKey>] {
        &self.adjacency
    }

    /// Pending vertices strictly beyond this face.
    #[must_use]
    pub fn beyond(&self) -> &[usize] {
        &self.beyond
    }

    /// Furthest vertex in the beyond set.
    #[must_use]
    pub const fn furthest(&self) -> Option<FurthestVertex> {
        self.furthest
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> FaceState {
        self.state
    }

    /// Signed distance of `point` from this face's hyperplane.
    #[inline]
    #[must_use]
    pub fn distance_to(&self, point: &[f64]) -> f64 {
        signed_distance(&self.normal, self.offset, point)
    }

    /// Position of `vertex` in the sorted vertex list.
    #[must_use]
    pub fn vertex_position(&self, vertex: usize) -> Option<usize> {
        self.vertices.binary_search(&vertex).ok()
    }

    /// Slot whose adjacency points at `neighbor`.
    #[must_use]
    pub fn slot_of_neighbor(&self, neighbor: FaceKey) -> Option<usize> {
        self.adjacency.iter().position(|&n| n == Some(neighbor))
    }

    /// Vertex indices of the ridge omitting slot `omitted`, in sorted order.
    pub fn ridge(&self, omitted: usize) -> impl Iterator<Item = usize> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(move |&(i, _)| i != omitted)
            .map(|(_, &v)| v)
    }

    /// Recomputes `furthest` from the current beyond set.
    pub(crate) fn refresh_furthest(&mut self, buffer: &VertexBuffer) {
        self.furthest = None;
        for &vertex in &self.beyond {
            let distance = signed_distance(&self.normal, self.offset, buffer.position(vertex));
            if self.furthest.is_none_or(|f| distance > f.distance) {
                self.furthest = Some(FurthestVertex { vertex, distance });
            }
        }
    }
}

//! Beneath-Beyond hull expansion.
//!
//! Starting from the seeding simplex, repeatedly takes the face whose furthest
//! beyond vertex `V` is most distant, finds every face visible from `V` by
//! flood fill across adjacency, replaces that region with a cone of faces from
//! `V` to the horizon ridges, stitches the cone together through the
//! [`AdjacencyConnector`] and redistributes the beyond sets. The hull is done
//! when no face has a pending vertex beyond it.
//!
//! All per-computation state lives in one [`HullExpansion`] context: the
//! vertex buffer is borrowed read-only and every face is owned by its
//! [`FacePool`].

#![forbid(unsafe_code)]

use std::mem;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::algorithms::initial_simplex::{InitialSimplexError, find_initial_simplex};
use crate::core::collections::{FaceVertexBuffer, SmallBuffer};
use crate::core::connector::AdjacencyConnector;
use crate::core::face::{Face, FaceKey, FaceState, FurthestVertex};
use crate::core::face_pool::FacePool;
use crate::core::options::HullOptions;
use crate::core::util::ridge_hash;
use crate::core::vertex_buffer::{VertexBuffer, VertexBufferError};
use crate::core::worklist::Worklist;
use crate::geometry::kernel::{KernelError, hyperplane, signed_distance};

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that abort a hull computation.
///
/// Singular vertices are not errors: they are skipped, counted in
/// [`HullStatistics::singular_vertices`] and listed by the result.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HullConstructionError {
    /// The input points could not be loaded.
    #[error(transparent)]
    VertexBuffer(#[from] VertexBufferError),
    /// No seeding simplex exists.
    #[error(transparent)]
    InitialSimplex(#[from] InitialSimplexError),
    /// An option value was rejected before computation started.
    #[error("Invalid options: {message}")]
    InvalidOptions {
        /// Which option was rejected and why.
        message: String,
    },
    /// The cancellation flag was raised.
    #[error("Hull computation cancelled after {iterations} iterations")]
    Cancelled {
        /// Iterations completed before cancellation was observed.
        iterations: usize,
    },
    /// A face of the seeding simplex has no well-defined normal.
    #[error("Seeding simplex face {face} is singular")]
    InitialFaceSingular {
        /// Index of the face (the simplex vertex it omits).
        face: usize,
    },
}

// =============================================================================
// STATE AND STATISTICS
// =============================================================================

/// Processing state of an input vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexState {
    /// Not yet processed; may sit in beyond sets.
    #[default]
    Pending,
    /// Added to the hull as a seeding vertex or cone apex. It may later be
    /// enclosed by other vertices.
    Processed,
    /// Its cone could not be built; excluded permanently.
    Singular,
}

/// Counters describing one hull computation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HullStatistics {
    /// Cone expansions committed or rolled back.
    pub iterations: usize,
    /// Faces ever created, including the seeding simplex.
    pub faces_created: usize,
    /// Faces served from released ones.
    pub faces_recycled: usize,
    /// Largest number of simultaneously live faces.
    pub peak_live_faces: usize,
    /// Vertices skipped because their cone was singular.
    pub singular_vertices: usize,
    /// Worklist pops whose furthest vertex was no longer pending.
    pub stale_purges: usize,
    /// Horizon neighbors folded into the visible region because the cone
    /// face over their ridge would have been concave.
    pub absorbed_faces: usize,
}

/// A horizon ridge: slot `slot` of visible face `visible` borders the
/// non-visible face `neighbor`.
#[derive(Clone, Copy, Debug)]
struct HorizonRidge {
    visible: FaceKey,
    slot: usize,
    neighbor: FaceKey,
}

/// A ridge matched between two cone faces, applied on commit.
#[derive(Clone, Copy, Debug)]
struct ConeLink {
    face: FaceKey,
    slot: usize,
    other: FaceKey,
    other_slot: usize,
}

/// Why a cone could not be committed.
#[derive(Debug)]
enum ConeFailure {
    /// A cone face has no well-defined normal.
    Singular(KernelError),
    /// Cone ridges were left without a partner; the visible region was not
    /// a topological ball.
    OpenRidges { pending: usize },
    /// The horizon neighbor's opposite vertex lies `distance` beyond the cone
    /// face built over their shared ridge.
    ConcaveRidge { neighbor: FaceKey, distance: f64 },
}

/// Outcome of a finished expansion.
#[derive(Clone, Debug)]
pub struct ExpandedHull {
    pool: FacePool,
    vertex_states: Vec<VertexState>,
    singular_vertices: Vec<usize>,
    interior: Vec<f64>,
    statistics: HullStatistics,
}

impl ExpandedHull {
    /// Final hull faces.
    pub fn faces(&self) -> impl Iterator<Item = (FaceKey, &Face)> {
        self.pool.iter()
    }

    /// Face lookup.
    #[must_use]
    pub fn face(&self, key: FaceKey) -> Option<&Face> {
        self.pool.get(key)
    }

    /// Number of hull faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.pool.len()
    }

    /// Per-vertex processing state.
    #[must_use]
    pub fn vertex_states(&self) -> &[VertexState] {
        &self.vertex_states
    }

    /// Vertices skipped as singular, in the order they were encountered.
    #[must_use]
    pub fn singular_vertices(&self) -> &[usize] {
        &self.singular_vertices
    }

    /// A point strictly inside the hull.
    #[must_use]
    pub fn interior_point(&self) -> &[f64] {
        &self.interior
    }

    /// Counters for the computation.
    #[must_use]
    pub const fn statistics(&self) -> HullStatistics {
        self.statistics
    }
}

// =============================================================================
// EXPANSION CONTEXT
// =============================================================================

/// Per-computation state of the incremental hull.
pub struct HullExpansion<'a> {
    buffer: &'a VertexBuffer,
    options: &'a HullOptions,
    dimension: usize,
    tolerance: f64,
    pool: FacePool,
    worklist: Worklist,
    connector: AdjacencyConnector,
    vertex_states: Vec<VertexState>,
    singular_vertices: Vec<usize>,
    center: Vec<f64>,
    previous_center: Vec<f64>,
    processed: usize,
    visit_tag: u64,
    marks: Vec<u32>,
    mark_epoch: u32,
    stack: Vec<FaceKey>,
    visible: Vec<FaceKey>,
    horizon: Vec<HorizonRidge>,
    absorbed: Vec<FaceKey>,
    cone: Vec<FaceKey>,
    links: Vec<ConeLink>,
    iterations: usize,
    stale_purges: usize,
    absorbed_faces: usize,
}

impl<'a> HullExpansion<'a> {
    /// Creates an expansion context over `buffer`.
    #[must_use]
    pub fn new(buffer: &'a VertexBuffer, options: &'a HullOptions) -> Self {
        let dimension = buffer.dimension();
        Self {
            buffer,
            options,
            dimension,
            tolerance: options.plane_distance_tolerance(),
            pool: FacePool::new(dimension),
            worklist: Worklist::new(),
            connector: AdjacencyConnector::new(),
            vertex_states: vec![VertexState::Pending; buffer.len()],
            singular_vertices: Vec::new(),
            center: vec![0.0; dimension],
            previous_center: vec![0.0; dimension],
            processed: 0,
            visit_tag: 0,
            marks: vec![0; buffer.len()],
            mark_epoch: 0,
            stack: Vec::new(),
            visible: Vec::new(),
            horizon: Vec::new(),
            absorbed: Vec::new(),
            cone: Vec::new(),
            links: Vec::new(),
            iterations: 0,
            stale_purges: 0,
            absorbed_faces: 0,
        }
    }

    /// Runs seeding and expansion to completion.
    ///
    /// # Errors
    ///
    /// Returns [`HullConstructionError::InitialSimplex`] if no seeding simplex
    /// exists, [`HullConstructionError::InitialFaceSingular`] if one of its
    /// faces has no normal, and [`HullConstructionError::Cancelled`] if the
    /// cancellation flag is raised.
    pub fn run(mut self) -> Result<ExpandedHull, HullConstructionError> {
        let simplex = find_initial_simplex(self.buffer, self.tolerance)?;
        self.seed(&simplex)?;

        while !self.worklist.is_empty() {
            if self.options.is_cancelled() {
                return Err(HullConstructionError::Cancelled {
                    iterations: self.iterations,
                });
            }
            self.step();
        }

        Ok(self.finish())
    }

    fn finish(self) -> ExpandedHull {
        let statistics = self.statistics();
        if statistics.singular_vertices > 0 {
            tracing::warn!(
                singular_vertices = statistics.singular_vertices,
                "skipped vertices whose cone faces were singular"
            );
        }
        tracing::debug!(
            dimension = self.dimension,
            vertices = self.buffer.len(),
            faces = self.pool.len(),
            ridges_registered = self.connector.registered(),
            ridges_matched = self.connector.matched(),
            ?statistics,
            "hull expansion finished"
        );

        ExpandedHull {
            pool: self.pool,
            vertex_states: self.vertex_states,
            singular_vertices: self.singular_vertices,
            interior: self.center,
            statistics,
        }
    }

    fn statistics(&self) -> HullStatistics {
        HullStatistics {
            iterations: self.iterations,
            faces_created: self.pool.created(),
            faces_recycled: self.pool.recycled(),
            peak_live_faces: self.pool.peak_live(),
            singular_vertices: self.singular_vertices.len(),
            stale_purges: self.stale_purges,
            absorbed_faces: self.absorbed_faces,
        }
    }

    /// Builds the `dimension + 1` faces of the seeding simplex and assigns
    /// every other vertex to the beyond sets it belongs to.
    fn seed(&mut self, simplex: &[usize]) -> Result<(), HullConstructionError> {
        for &v in simplex {
            for (c, &x) in self.center.iter_mut().zip(self.buffer.position(v)) {
                *c += x;
            }
            self.vertex_states[v] = VertexState::Processed;
        }
        let count = simplex.len() as f64;
        for c in &mut self.center {
            *c /= count;
        }
        self.processed = simplex.len();

        // Face i omits simplex[i].
        let mut keys: SmallBuffer<FaceKey, 8> = SmallBuffer::new();
        for omitted in 0..simplex.len() {
            let key = self.pool.acquire();
            keys.push(key);
            let buffer = self.buffer;
            let center = &self.center;
            if let Some(face) = self.pool.get_mut(key) {
                face.vertices.extend(
                    simplex
                        .iter()
                        .enumerate()
                        .filter(|&(i, _)| i != omitted)
                        .map(|(_, &v)| v),
                );
                face.vertices.sort_unstable();
                let plane = hyperplane(buffer, &face.vertices, center, &mut face.normal)
                    .map_err(|_| HullConstructionError::InitialFaceSingular { face: omitted })?;
                face.offset = plane.offset;
                face.flipped = plane.flipped;
            }
        }

        for &key in &keys {
            let Some(face) = self.pool.get_mut(key) else {
                continue;
            };
            for slot in 0..face.vertices.len() {
                let across = face.vertices[slot];
                face.adjacency[slot] = simplex
                    .iter()
                    .position(|&v| v == across)
                    .map(|i| keys[i]);
            }
        }

        for (vertex, state) in self.vertex_states.iter().enumerate() {
            if *state != VertexState::Pending {
                continue;
            }
            let position = self.buffer.position(vertex);
            for &key in &keys {
                let Some(face) = self.pool.get_mut(key) else {
                    continue;
                };
                let distance = face.distance_to(position);
                if distance > self.tolerance {
                    face.beyond.push(vertex);
                    if face.furthest.is_none_or(|f| distance > f.distance) {
                        face.furthest = Some(FurthestVertex { vertex, distance });
                    }
                }
            }
        }

        for &key in &keys {
            self.classify(key);
        }

        tracing::debug!(
            dimension = self.dimension,
            ?simplex,
            queued = self.worklist.len(),
            "seeded hull expansion"
        );
        Ok(())
    }

    /// Queues `key` if its beyond set is non-empty, otherwise finalizes it.
    fn classify(&mut self, key: FaceKey) {
        let Some(face) = self.pool.get_mut(key) else {
            return;
        };
        if let Some(furthest) = face.furthest {
            face.state = FaceState::Open;
            self.worklist.insert(key, furthest.distance);
        } else {
            face.state = FaceState::Final;
            self.worklist.remove(key);
        }
    }

    /// One main-loop iteration.
    fn step(&mut self) {
        let Some((key, _)) = self.worklist.pop_max() else {
            return;
        };
        let Some(furthest) = self.pool.get(key).and_then(Face::furthest) else {
            self.classify(key);
            return;
        };

        if self.vertex_states[furthest.vertex] != VertexState::Pending {
            self.purge(key);
            return;
        }

        self.iterations += 1;
        self.add_vertex(key, furthest.vertex);
    }

    /// Drops vertices that are no longer pending from a face's beyond set
    /// and requeues or finalizes it.
    fn purge(&mut self, key: FaceKey) {
        self.stale_purges += 1;
        let states = &self.vertex_states;
        if let Some(face) = self.pool.get_mut(key) {
            face.beyond
                .retain(|&v| states[v] == VertexState::Pending);
            face.refresh_furthest(self.buffer);
            tracing::trace!(beyond = face.beyond.len(), "purged stale beyond vertices");
        }
        self.classify(key);
    }

    fn add_vertex(&mut self, start: FaceKey, apex: usize) {
        let buffer = self.buffer;
        let apex_position = buffer.position(apex);

        self.advance_center(apex_position);
        self.absorbed.clear();

        // A horizon neighbor the apex is nearly coplanar with can leave the
        // cone face over their ridge bent outward. Such neighbors join the
        // visible region and the cone is rebuilt.
        loop {
            self.find_horizon(start, apex_position);
            match self.build_cone(apex) {
                Ok(()) => break,
                Err(ConeFailure::ConcaveRidge { neighbor, distance })
                    if self.can_absorb(neighbor, apex_position) =>
                {
                    tracing::trace!(apex, distance, "absorbing concave horizon neighbor");
                    self.absorbed.push(neighbor);
                    self.absorbed_faces += 1;
                    self.discard_cone();
                }
                Err(failure) => {
                    self.rollback(start, apex, &failure);
                    return;
                }
            }
        }

        self.stitch_cone(apex);
        self.assign_beyond_sets(apex);

        for i in 0..self.visible.len() {
            let key = self.visible[i];
            self.worklist.remove(key);
            self.pool.release(key);
        }
        for i in 0..self.cone.len() {
            self.classify(self.cone[i]);
        }

        self.vertex_states[apex] = VertexState::Processed;
        self.processed += 1;
    }

    /// Moves the interior reference point toward the incoming apex, keeping
    /// the old one for rollback.
    fn advance_center(&mut self, apex_position: &[f64]) {
        self.previous_center.copy_from_slice(&self.center);
        let weight = self.processed as f64;
        for (c, &x) in self.center.iter_mut().zip(apex_position) {
            *c = c.mul_add(weight, x) / (weight + 1.0);
        }
    }

    /// A concave horizon neighbor may join the visible region only if the
    /// apex is within tolerance of its plane.
    fn can_absorb(&self, neighbor: FaceKey, apex_position: &[f64]) -> bool {
        !self.absorbed.contains(&neighbor)
            && self
                .pool
                .get(neighbor)
                .is_some_and(|face| face.distance_to(apex_position) > -self.tolerance)
    }

    /// Flood fill from `start` over faces the apex is beyond, plus any
    /// absorbed horizon neighbors.
    ///
    /// Fills `visible` with the affected faces and `horizon` with the ridges
    /// between them and the rest of the hull.
    fn find_horizon(&mut self, start: FaceKey, apex_position: &[f64]) {
        self.visit_tag += 1;
        let tag = self.visit_tag;
        self.visible.clear();
        self.horizon.clear();
        self.stack.clear();

        if let Some(face) = self.pool.get_mut(start) {
            face.visit_tag = tag;
            self.stack.push(start);
        }

        while let Some(key) = self.stack.pop() {
            self.visible.push(key);
            let adjacency = match self.pool.get(key) {
                Some(face) => face.adjacency.clone(),
                None => continue,
            };
            for (slot, neighbor) in adjacency.into_iter().enumerate() {
                let Some(neighbor) = neighbor else {
                    continue;
                };
                let Some(face) = self.pool.get_mut(neighbor) else {
                    continue;
                };
                if face.visit_tag == tag {
                    continue;
                }
                if face.distance_to(apex_position) > self.tolerance
                    || self.absorbed.contains(&neighbor)
                {
                    face.visit_tag = tag;
                    self.stack.push(neighbor);
                } else {
                    self.horizon.push(HorizonRidge {
                        visible: key,
                        slot,
                        neighbor,
                    });
                }
            }
        }
    }

    /// Creates one face per horizon ridge, joining the ridge to the apex, and
    /// matches the cone faces' side ridges against each other.
    ///
    /// Nothing outside the new faces is modified, so a failure only needs to
    /// release them.
    fn build_cone(&mut self, apex: usize) -> Result<(), ConeFailure> {
        self.cone.clear();
        self.links.clear();
        self.connector.clear();
        let buffer = self.buffer;
        let mut vertices = FaceVertexBuffer::new();

        for i in 0..self.horizon.len() {
            let ridge = self.horizon[i];
            vertices.clear();
            if let Some(face) = self.pool.get(ridge.visible) {
                vertices.extend(face.ridge(ridge.slot));
            }
            vertices.push(apex);
            vertices.sort_unstable();

            let key = self.pool.acquire();
            self.cone.push(key);
            if let Some(face) = self.pool.get_mut(key) {
                face.vertices.extend_from_slice(&vertices);
                let plane = hyperplane(buffer, &face.vertices, &self.center, &mut face.normal)
                    .map_err(ConeFailure::Singular)?;
                face.offset = plane.offset;
                face.flipped = plane.flipped;
            }

            let opposite = self.pool.get(ridge.neighbor).and_then(|neighbor| {
                neighbor
                    .slot_of_neighbor(ridge.visible)
                    .map(|slot| neighbor.vertices[slot])
            });
            if let (Some(opposite), Some(face)) = (opposite, self.pool.get(key)) {
                let distance = face.distance_to(buffer.position(opposite));
                if distance > self.tolerance {
                    return Err(ConeFailure::ConcaveRidge {
                        neighbor: ridge.neighbor,
                        distance,
                    });
                }
            }

            for slot in 0..vertices.len() {
                // The ridge omitting the apex is the horizon ridge.
                if vertices[slot] == apex {
                    continue;
                }
                let side = vertices
                    .iter()
                    .enumerate()
                    .filter(move |&(i, _)| i != slot)
                    .map(|(_, &v)| v);
                if let Some((other, other_slot)) =
                    self.connector
                        .register(key, slot, ridge_hash(&vertices, slot), side)
                {
                    self.links.push(ConeLink {
                        face: key,
                        slot,
                        other,
                        other_slot,
                    });
                }
            }
        }

        let pending = self.connector.pending();
        self.connector.clear();
        if pending > 0 {
            return Err(ConeFailure::OpenRidges { pending });
        }
        Ok(())
    }

    /// Undoes a failed cone: the apex is marked singular and removed from the
    /// visible faces, which are left in place.
    fn rollback(&mut self, start: FaceKey, apex: usize, failure: &ConeFailure) {
        self.center.copy_from_slice(&self.previous_center);
        self.discard_cone();

        self.vertex_states[apex] = VertexState::Singular;
        self.singular_vertices.push(apex);
        tracing::trace!(apex, ?failure, "rolled back cone");

        for i in 0..self.visible.len() {
            let key = self.visible[i];
            if let Some(face) = self.pool.get_mut(key) {
                face.beyond.retain(|&v| v != apex);
                face.refresh_furthest(self.buffer);
            }
            if key == start || self.worklist.contains(key) {
                self.classify(key);
            }
        }
    }

    fn discard_cone(&mut self) {
        for i in 0..self.cone.len() {
            self.pool.release(self.cone[i]);
        }
        self.cone.clear();
        self.links.clear();
        self.connector.clear();
    }

    /// Links cone faces to their horizon neighbors and to each other.
    fn stitch_cone(&mut self, apex: usize) {
        for i in 0..self.horizon.len() {
            let ridge = self.horizon[i];
            let key = self.cone[i];

            if let Some(neighbor) = self.pool.get_mut(ridge.neighbor)
                && let Some(slot) = neighbor.slot_of_neighbor(ridge.visible)
            {
                neighbor.adjacency[slot] = Some(key);
            }
            if let Some(face) = self.pool.get_mut(key)
                && let Some(apex_slot) = face.vertex_position(apex)
            {
                face.adjacency[apex_slot] = Some(ridge.neighbor);
            }
        }

        for link in &self.links {
            if let Some(face) = self.pool.get_mut(link.face) {
                face.adjacency[link.slot] = Some(link.other);
            }
            if let Some(other) = self.pool.get_mut(link.other) {
                other.adjacency[link.other_slot] = Some(link.face);
            }
        }
    }

    /// Fills each cone face's beyond set from the beyond sets of the visible
    /// face and horizon neighbor on either side of its horizon ridge.
    fn assign_beyond_sets(&mut self, apex: usize) {
        for i in 0..self.horizon.len() {
            let ridge = self.horizon[i];
            let key = self.cone[i];

            self.mark_epoch = self.mark_epoch.wrapping_add(1);
            if self.mark_epoch == 0 {
                self.marks.fill(0);
                self.mark_epoch = 1;
            }
            let epoch = self.mark_epoch;

            let Some(face) = self.pool.get_mut(key) else {
                continue;
            };
            let mut beyond = mem::take(&mut face.beyond);
            let normal = mem::take(&mut face.normal);
            let offset = face.offset;
            beyond.clear();
            let mut furthest: Option<FurthestVertex> = None;

            for source in [ridge.visible, ridge.neighbor] {
                let Some(source_face) = self.pool.get(source) else {
                    continue;
                };
                for &vertex in &source_face.beyond {
                    if vertex == apex
                        || self.vertex_states[vertex] != VertexState::Pending
                        || self.marks[vertex] == epoch
                    {
                        continue;
                    }
                    self.marks[vertex] = epoch;
                    let distance =
                        signed_distance(&normal, offset, self.buffer.position(vertex));
                    if distance > self.tolerance {
                        beyond.push(vertex);
                        if furthest.is_none_or(|f| distance > f.distance) {
                            furthest = Some(FurthestVertex { vertex, distance });
                        }
                    }
                }
            }

            if let Some(face) = self.pool.get_mut(key) {
                face.beyond = beyond;
                face.normal = normal;
                face.furthest = furthest;
            }
        }
    }
}

/// Computes the hull of `buffer` with `options`.
///
/// # Errors
///
/// See [`HullExpansion::run`].
///
/// # Examples
///
/// ```rust
/// use nhull::core::algorithms::hull_expansion::expand_hull;
/// use nhull::core::options::HullOptions;
/// use nhull::core::vertex_buffer::VertexBuffer;
///
/// let buffer = VertexBuffer::from_points(&[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [2.0, 2.0]]).unwrap();
/// let hull = expand_hull(&buffer, &HullOptions::default()).unwrap();
/// assert_eq!(hull.face_count(), 4);
/// ```
pub fn expand_hull(
    buffer: &VertexBuffer,
    options: &HullOptions,
) -> Result<ExpandedHull, HullConstructionError> {
    HullExpansion::new(buffer, options).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::collections::FastHashSet;

    fn hull_of<P: AsRef<[f64]>>(points: &[P]) -> ExpandedHull {
        let buffer = VertexBuffer::from_points(points).unwrap();
        expand_hull(&buffer, &HullOptions::default()).unwrap()
    }

    fn hull_vertices(hull: &ExpandedHull) -> Vec<usize> {
        let mut vertices: Vec<usize> = hull
            .faces()
            .flat_map(|(_, face)| face.vertices().iter().copied())
            .collect::<FastHashSet<_>>()
            .into_iter()
            .collect();
        vertices.sort_unstable();
        vertices
    }

    fn assert_closed(hull: &ExpandedHull) {
        for (key, face) in hull.faces() {
            assert_eq!(face.state(), FaceState::Final);
            for (slot, neighbor) in face.adjacency().iter().enumerate() {
                let neighbor = neighbor.expect("open ridge");
                let other = hull.face(neighbor).expect("dangling adjacency");
                let back = other.slot_of_neighbor(key).expect("adjacency not mutual");
                let ours: Vec<usize> = face.ridge(slot).collect();
                let theirs: Vec<usize> = other.ridge(back).collect();
                assert_eq!(ours, theirs);
            }
        }
    }

    #[test]
    fn test_square_excludes_interior_point() {
        let hull = hull_of(&[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [2.0, 2.0]]);
        assert_eq!(hull.face_count(), 4);
        assert_eq!(hull_vertices(&hull), vec![0, 1, 2, 3]);
        assert_closed(&hull);
    }

    #[test]
    fn test_cube_has_twelve_triangles() {
        let points: Vec<[f64; 3]> = (0..8)
            .map(|i| {
                [
                    f64::from(i & 1),
                    f64::from((i >> 1) & 1),
                    f64::from((i >> 2) & 1),
                ]
            })
            .collect();
        let hull = hull_of(&points);
        assert_eq!(hull.face_count(), 12);
        assert_eq!(hull_vertices(&hull), (0..8).collect::<Vec<_>>());
        assert_closed(&hull);
    }

    #[test]
    fn test_beyond_sets_are_empty_and_convexity_holds() {
        let points: Vec<[f64; 3]> = (0..200)
            .map(|i| {
                let t = f64::from(i);
                [(t * 0.37).sin() * 3.0, (t * 1.13).cos() * 2.0, (t * 0.71).sin() * (t * 0.29).cos()]
            })
            .collect();
        let buffer = VertexBuffer::from_points(&points).unwrap();
        let hull = expand_hull(&buffer, &HullOptions::default()).unwrap();
        assert_closed(&hull);
        for (_, face) in hull.faces() {
            assert!(face.beyond().is_empty());
            for position in buffer.iter() {
                assert!(face.distance_to(position) <= 1e-5);
            }
        }
        let stats = hull.statistics();
        assert!(stats.faces_recycled > 0);
        assert!(stats.peak_live_faces >= hull.face_count());
        assert_eq!(stats.singular_vertices, 0);
    }

    #[test]
    fn test_cancellation_is_observed() {
        use std::sync::Arc;
        use std::sync::atomic::AtomicBool;

        let points: Vec<[f64; 2]> = (0..50)
            .map(|i| {
                let t = f64::from(i) * 0.1;
                [t.cos(), t.sin()]
            })
            .collect();
        let buffer = VertexBuffer::from_points(&points).unwrap();
        let options = HullOptions::default().with_cancellation(Arc::new(AtomicBool::new(true)));
        assert_eq!(
            expand_hull(&buffer, &options).unwrap_err(),
            HullConstructionError::Cancelled { iterations: 0 }
        );
    }

    #[test]
    fn test_rolled_back_cone_reports_apex_and_restores_state() {
        let points = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
        ];
        let buffer = VertexBuffer::from_points(&points).unwrap();
        let options = HullOptions::default();
        let mut expansion = HullExpansion::new(&buffer, &options);
        let simplex = find_initial_simplex(&buffer, expansion.tolerance).unwrap();
        expansion.seed(&simplex).unwrap();
        let seeded_center = expansion.center.clone();

        let (start, _) = expansion.worklist.pop_max().unwrap();
        let apex = expansion
            .pool
            .get(start)
            .and_then(Face::furthest)
            .unwrap()
            .vertex;
        assert!(!simplex.contains(&apex));

        let apex_position = buffer.position(apex);
        expansion.advance_center(apex_position);
        expansion.find_horizon(start, apex_position);
        expansion.build_cone(apex).unwrap();
        assert!(expansion.pool.len() > 4);

        expansion.rollback(start, apex, &ConeFailure::OpenRidges { pending: 1 });
        assert_eq!(expansion.pool.len(), 4);
        assert_eq!(expansion.center, seeded_center);
        assert_eq!(expansion.vertex_states[apex], VertexState::Singular);

        while !expansion.worklist.is_empty() {
            expansion.step();
        }
        let hull = expansion.finish();
        assert_eq!(hull.singular_vertices(), &[apex]);
        assert_eq!(hull.statistics().singular_vertices, 1);
        assert_eq!(hull.vertex_states()[apex], VertexState::Singular);
        assert_eq!(hull.face_count(), 4);
        assert_closed(&hull);
        let mut seeded = simplex;
        seeded.sort_unstable();
        assert_eq!(hull_vertices(&hull), seeded);
        assert_eq!(hull.interior_point(), seeded_center.as_slice());
    }

    #[test]
    fn test_nearly_coplanar_horizon_neighbors_are_absorbed() {
        use crate::geometry::util::generate_random_points_seeded;

        let points = generate_random_points_seeded(200, 7, (-1.0, 1.0), 11).unwrap();
        let buffer = VertexBuffer::from_points(&points).unwrap();
        let options = HullOptions::default();
        let hull = expand_hull(&buffer, &options).unwrap();
        assert_closed(&hull);
        assert!(hull.statistics().absorbed_faces > 0);

        let tolerance = options.plane_distance_tolerance();
        for (_, face) in hull.faces() {
            for (vertex, state) in hull.vertex_states().iter().enumerate() {
                if *state == VertexState::Singular {
                    continue;
                }
                let distance = face.distance_to(buffer.position(vertex));
                assert!(
                    distance <= tolerance,
                    "vertex {vertex} lies {distance} beyond a hull face"
                );
            }
        }
    }

    #[test]
    fn test_duplicate_and_coplanar_points_are_suppressed() {
        let mut points = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        points.push([1.0, 0.0, 0.0]);
        points.push([0.5, 0.0, 0.0]);
        points.push([0.25, 0.25, 0.0]);
        let hull = hull_of(&points);
        assert_eq!(hull.face_count(), 4);
        assert_eq!(hull_vertices(&hull), vec![0, 1, 2, 3]);
    }
}

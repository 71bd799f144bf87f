//! Arena of live faces with recycling of released ones.
//!
//! Faces live in a [`SlotMap`] keyed by [`FaceKey`]. Released faces are moved
//! to a spare list with their buffers intact, so the vertex, normal, adjacency
//! and beyond-set allocations of destroyed faces are reused by the cone faces
//! that replace them. Peak allocation follows the largest simultaneous face
//! count rather than the total number of faces ever created.

#![forbid(unsafe_code)]

use slotmap::SlotMap;

use crate::core::face::{Face, FaceKey};

/// Owner of every face of one hull computation.
#[derive(Clone, Debug)]
pub struct FacePool {
    faces: SlotMap<FaceKey, Face>,
    spare: Vec<Face>,
    dimension: usize,
    created: usize,
    recycled: usize,
    peak_live: usize,
}

impl FacePool {
    /// Creates an empty pool for faces of a `dimension`-dimensional hull.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            faces: SlotMap::with_key(),
            spare: Vec::new(),
            dimension,
            created: 0,
            recycled: 0,
            peak_live: 0,
        }
    }

    /// Returns a cleared face, reusing a released one when available.
    pub fn acquire(&mut self) -> FaceKey {
        let mut face = match self.spare.pop() {
            Some(face) => {
                self.recycled += 1;
                face
            }
            None => Face::default(),
        };
        face.reset(self.dimension);
        self.created += 1;
        let key = self.faces.insert(face);
        self.peak_live = self.peak_live.max(self.faces.len());
        key
    }

    /// Removes a face from the pool and keeps its buffers for reuse.
    ///
    /// Returns `false` if `key` is stale.
    pub fn release(&mut self, key: FaceKey) -> bool {
        match self.faces.remove(key) {
            Some(face) => {
                self.spare.push(face);
                true
            }
            None => false,
        }
    }

    /// Shared access to a live face.
    #[inline]
    #[must_use]
    pub fn get(&self, key: FaceKey) -> Option<&Face> {
        self.faces.get(key)
    }

    /// Exclusive access to a live face.
    #[inline]
    pub fn get_mut(&mut self, key: FaceKey) -> Option<&mut Face> {
        self.faces.get_mut(key)
    }

    /// Iterates over live faces.
    pub fn iter(&self) -> impl Iterator<Item = (FaceKey, &Face)> {
        self.faces.iter()
    }

    /// Number of live faces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Total faces handed out by [`acquire`](Self::acquire).
    #[must_use]
    pub const fn created(&self) -> usize {
        self.created
    }

    /// Acquisitions served from the spare list.
    #[must_use]
    pub const fn recycled(&self) -> usize {
        self.recycled
    }

    /// Largest number of simultaneously live faces.
    #[must_use]
    pub const fn peak_live(&self) -> usize {
        self.peak_live
    }
}

//! Priority worklist of faces with non-empty beyond sets.
//!
//! Ordered by furthest-vertex distance so the most distant vertex is always
//! processed first. Ties are broken by [`FaceKey`] order, which keeps runs on
//! the same input deterministic.

#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use ordered_float::OrderedFloat;

use crate::core::collections::FastHashMap;
use crate::core::face::FaceKey;

/// Max-priority queue over faces supporting removal by key.
#[derive(Clone, Debug, Default)]
pub struct Worklist {
    ordered: BTreeSet<(OrderedFloat<f64>, FaceKey)>,
    priorities: FastHashMap<FaceKey, OrderedFloat<f64>>,
}

impl Worklist {
    /// Creates an empty worklist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `face` with `priority`, replacing any earlier entry.
    pub fn insert(&mut self, face: FaceKey, priority: f64) {
        let priority = OrderedFloat(priority);
        if let Some(previous) = self.priorities.insert(face, priority) {
            self.ordered.remove(&(previous, face));
        }
        self.ordered.insert((priority, face));
    }

    /// Removes `face` if queued. Returns whether it was present.
    pub fn remove(&mut self, face: FaceKey) -> bool {
        match self.priorities.remove(&face) {
            Some(priority) => self.ordered.remove(&(priority, face)),
            None => false,
        }
    }

    /// Pops the face with the highest priority.
    pub fn pop_max(&mut self) -> Option<(FaceKey, f64)> {
        let (priority, face) = self.ordered.pop_last()?;
        self.priorities.remove(&face);
        Some((face, priority.into_inner()))
    }

    /// Returns `true` if `face` is queued.
    #[must_use]
    pub fn contains(&self, face: FaceKey) -> bool {
        self.priorities.contains_key(&face)
    }

    /// Number of queued faces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

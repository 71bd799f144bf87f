//! Ridge matching for newly built cone faces.
//!
//! Each cone face registers every ridge except the one it shares with its
//! horizon neighbor. Two registrations of the same ridge are matched and both
//! entries are dropped; a ridge still pending after the cone is committed
//! would be an open boundary.

#![forbid(unsafe_code)]

use crate::core::collections::{FaceVertexBuffer, FastHashMap, SmallBuffer};
use crate::core::face::FaceKey;

#[derive(Clone, Debug, Default)]
struct ConnectorEntry {
    face: Option<FaceKey>,
    slot: usize,
    ridge: FaceVertexBuffer,
}

/// Hash table of unmatched ridges, keyed by ridge hash.
///
/// Entries live in an arena with a free list so the per-iteration
/// registrations reuse their ridge buffers.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyConnector {
    buckets: FastHashMap<u64, SmallBuffer<usize, 2>>,
    entries: Vec<ConnectorEntry>,
    free: Vec<usize>,
    pending: usize,
    registered: usize,
    matched: usize,
}

impl AdjacencyConnector {
    /// Creates an empty connector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers ridge `slot` of `face`, whose sorted vertices are `ridge`.
    ///
    /// If another face already registered the same ridge, its entry is
    /// removed and `(other_face, other_slot)` is returned for stitching.
    /// Otherwise the ridge waits for its partner and `None` is returned.
    pub fn register(
        &mut self,
        face: FaceKey,
        slot: usize,
        hash: u64,
        ridge: impl Iterator<Item = usize> + Clone,
    ) -> Option<(FaceKey, usize)> {
        self.registered += 1;
        let bucket = self.buckets.entry(hash).or_default();

        let found = bucket.iter().position(|&index| {
            let entry = &self.entries[index];
            entry.ridge.iter().copied().eq(ridge.clone())
        });
        if let Some(position) = found {
            let index = bucket.swap_remove(position);
            if bucket.is_empty() {
                self.buckets.remove(&hash);
            }
            let entry = &mut self.entries[index];
            let partner = entry.face.take().map(|other| (other, entry.slot));
            self.free.push(index);
            self.pending -= 1;
            self.matched += 1;
            return partner;
        }

        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.entries.push(ConnectorEntry::default());
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[index];
        entry.face = Some(face);
        entry.slot = slot;
        entry.ridge.clear();
        entry.ridge.extend(ridge);
        bucket.push(index);
        self.pending += 1;
        None
    }

    /// Drops every unmatched entry, keeping allocations.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.free.clear();
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.face = None;
            self.free.push(index);
        }
        self.pending = 0;
    }

    /// Ridges registered but not yet matched.
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.pending
    }

    /// Total registrations since creation.
    #[must_use]
    pub const fn registered(&self) -> usize {
        self.registered
    }

    /// Total matched pairs since creation.
    #[must_use]
    pub const fn matched(&self) -> usize {
        self.matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::util::ridge_hash;

    use slotmap::SlotMap;

    fn keys(n: usize) -> Vec<FaceKey> {
        let mut map: SlotMap<FaceKey, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    fn register(
        connector: &mut AdjacencyConnector,
        face: FaceKey,
        vertices: &[usize],
        slot: usize,
    ) -> Option<(FaceKey, usize)> {
        let ridge = vertices
            .iter()
            .enumerate()
            .filter(move |&(i, _)| i != slot)
            .map(|(_, &v)| v);
        connector.register(face, slot, ridge_hash(vertices, slot), ridge)
    }

    #[test]
    fn test_shared_ridge_is_matched_once() {
        let k = keys(2);
        let mut connector = AdjacencyConnector::new();
        // Faces {1, 4, 7} and {1, 7, 9} share ridge {1, 7}.
        assert_eq!(register(&mut connector, k[0], &[1, 4, 7], 1), None);
        assert_eq!(connector.pending(), 1);
        assert_eq!(register(&mut connector, k[1], &[1, 7, 9], 2), Some((k[0], 1)));
        assert_eq!(connector.pending(), 0);
        assert_eq!(connector.registered(), 2);
        assert_eq!(connector.matched(), 1);
    }

    #[test]
    fn test_distinct_ridges_with_equal_hash_do_not_match() {
        let k = keys(2);
        let mut connector = AdjacencyConnector::new();
        assert_eq!(
            connector.register(k[0], 0, 7, [1usize, 2].into_iter()),
            None
        );
        assert_eq!(
            connector.register(k[1], 0, 7, [1usize, 3].into_iter()),
            None
        );
        assert_eq!(connector.pending(), 2);
        assert_eq!(
            connector.register(k[1], 1, 7, [1usize, 2].into_iter()),
            Some((k[0], 0))
        );
    }

    #[test]
    fn test_every_ridge_of_a_closed_cone_is_matched() {
        // Cone from apex 9 over the triangle {0, 1, 2}: three faces in 3D.
        let faces = [[0usize, 1, 9], [1, 2, 9], [0, 2, 9]];
        let k = keys(3);
        let mut connector = AdjacencyConnector::new();
        for (key, vertices) in k.iter().zip(&faces) {
            // Slot 2 omits the apex and faces the horizon.
            for slot in 0..2 {
                register(&mut connector, *key, vertices, slot);
            }
        }
        assert_eq!(connector.pending(), 0);
        assert_eq!(connector.matched(), 3);

        connector.clear();
        assert_eq!(register(&mut connector, k[0], &faces[0], 0), None);
        connector.clear();
        assert_eq!(connector.pending(), 0);
    }
}

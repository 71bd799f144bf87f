use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Optimized `HashMap` type for performance-critical operations.
/// Uses `rustc_hash::FxHasher` for faster hashing in non-cryptographic contexts.
///
/// # Security Warning
///
/// ⚠️ **Not DoS-resistant**: Do not use with attacker-controlled keys.
/// The hull only hashes its own vertex indices and ridge hashes.
///
/// # Examples
///
/// ```rust
/// use nhull::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<u64, usize> = FastHashMap::default();
/// map.insert(123, 456);
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Build hasher that instantiates `rustc_hash::FxHasher`.
pub type FastBuildHasher = FxBuildHasher;

/// Optimized `HashSet` type for membership testing on vertex indices.
///
/// # Examples
///
/// ```rust
/// use nhull::core::collections::FastHashSet;
///
/// let mut singular: FastHashSet<usize> = FastHashSet::default();
/// singular.insert(42);
/// assert!(singular.contains(&42));
/// ```
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-optimized Vec that uses stack allocation for small collections.
///
/// Faces, ridges and normals all hold `dimension` entries, so for the
/// dimensions the hull is normally run in they never touch the heap.
///
/// # Size Guidelines
///
/// - **N=2**: Connector buckets (a ridge is shared by exactly two faces)
/// - **N=8**: Per-face vertex indices, adjacency slots and normals
///
/// # Examples
///
/// ```rust
/// use nhull::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<usize, 8> = SmallBuffer::new();
/// for i in 0..5 {
///     buffer.push(i);
/// }
/// assert!(!buffer.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

// =============================================================================
// SEMANTIC SIZE CONSTANTS AND TYPE ALIASES
// =============================================================================

/// Inline capacity used for per-face buffers.
///
/// A face of a d-dimensional hull has `d` vertices, `d` adjacency slots and a
/// `d`-component normal. Delaunay lifting adds one dimension, so 8 covers
/// lifted 7D input before spilling.
pub const MAX_PRACTICAL_DIMENSION_SIZE: usize = 8;

/// Vertex indices of a single face, sorted ascending.
pub type FaceVertexBuffer = SmallBuffer<usize, MAX_PRACTICAL_DIMENSION_SIZE>;

/// Coordinates of a normal vector or a scratch point.
pub type CoordinateBuffer = SmallBuffer<f64, MAX_PRACTICAL_DIMENSION_SIZE>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_collections_basic_operations() {
        let mut map: FastHashMap<u64, usize> = FastHashMap::default();
        assert!(map.is_empty());

        map.insert(123, 456);
        assert_eq!(map.get(&123), Some(&456));
        assert_eq!(map.len(), 1);

        let mut set: FastHashSet<usize> = FastHashSet::default();
        set.insert(789);
        set.insert(456);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&456));
        assert!(!set.contains(&999));
    }

    #[test]
    fn test_face_buffers_stay_inline_for_practical_dimensions() {
        let mut vertices = FaceVertexBuffer::new();
        for i in 0..MAX_PRACTICAL_DIMENSION_SIZE {
            vertices.push(i);
        }
        assert!(!vertices.spilled());

        vertices.push(MAX_PRACTICAL_DIMENSION_SIZE);
        assert!(vertices.spilled());
    }
}

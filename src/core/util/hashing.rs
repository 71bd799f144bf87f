//! Hashing utilities for ridge keys.

#![forbid(unsafe_code)]

const HASH_PRIME: u64 = 1_099_511_628_211; // FNV prime
const HASH_OFFSET: u64 = 14_695_981_039_346_656_037; // FNV offset basis

/// Hashes an ordered stream of `u64` values.
///
/// FNV-style polynomial rolling hash followed by an avalanche step. An empty
/// stream hashes to `0`.
#[inline]
fn stable_hash_iter(values: impl Iterator<Item = u64>) -> u64 {
    let mut seen_any = false;
    let mut hash = HASH_OFFSET;
    for value in values {
        seen_any = true;
        hash = hash.wrapping_mul(HASH_PRIME).wrapping_add(value);
    }
    if !seen_any {
        return 0;
    }

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51_afd7_ed55_8ccd);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    hash ^= hash >> 33;
    hash
}

/// Applies a stable hash function to a slice of sorted u64 values.
///
/// The input slice should be pre-sorted so that equal sets hash equally.
///
/// # Examples
///
/// ```
/// use nhull::core::util::stable_hash_u64_slice;
///
/// let mut a = vec![3u64, 1, 2];
/// let mut b = vec![2u64, 3, 1];
/// a.sort_unstable();
/// b.sort_unstable();
/// assert_eq!(stable_hash_u64_slice(&a), stable_hash_u64_slice(&b));
/// ```
#[must_use]
pub fn stable_hash_u64_slice(sorted_values: &[u64]) -> u64 {
    stable_hash_iter(sorted_values.iter().copied())
}

/// Hashes the ridge of a face: its sorted vertex indices with the entry at
/// position `omitted` left out.
///
/// Because face vertices are kept sorted, the remaining sequence is already in
/// canonical order and two faces sharing the ridge produce the same key
/// without allocating.
///
/// # Examples
///
/// ```
/// use nhull::core::util::{ridge_hash, stable_hash_u64_slice};
///
/// // Faces {1, 4, 7} and {1, 7, 9} share the ridge {1, 7}.
/// assert_eq!(ridge_hash(&[1, 4, 7], 1), ridge_hash(&[1, 7, 9], 2));
/// assert_eq!(ridge_hash(&[1, 4, 7], 1), stable_hash_u64_slice(&[1, 7]));
/// ```
#[must_use]
pub fn ridge_hash(face_vertices: &[usize], omitted: usize) -> u64 {
    stable_hash_iter(
        face_vertices
            .iter()
            .enumerate()
            .filter(|&(position, _)| position != omitted)
            .map(|(_, &v)| v as u64),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_hash_is_order_sensitive_and_deterministic() {
        let values = vec![1u64, 2, 3];
        let mut reversed = values.clone();
        reversed.reverse();
        assert_ne!(
            stable_hash_u64_slice(&values),
            stable_hash_u64_slice(&reversed)
        );
        assert_eq!(
            stable_hash_u64_slice(&values),
            stable_hash_u64_slice(&[1, 2, 3])
        );
        assert_eq!(stable_hash_u64_slice(&[]), 0);
        assert_ne!(
            stable_hash_u64_slice(&[1, 2]),
            stable_hash_u64_slice(&[1, 2, 3])
        );
    }

    #[test]
    fn test_ridge_hash_matches_explicit_ridge() {
        let face = [2usize, 5, 8, 13];
        for omitted in 0..face.len() {
            let ridge: Vec<u64> = face
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != omitted)
                .map(|(_, &v)| v as u64)
                .collect();
            assert_eq!(ridge_hash(&face, omitted), stable_hash_u64_slice(&ridge));
        }
    }

    #[test]
    fn test_ridge_hash_differs_between_ridges_of_one_face() {
        let face = [0usize, 1, 2];
        assert_ne!(ridge_hash(&face, 0), ridge_hash(&face, 1));
        assert_ne!(ridge_hash(&face, 1), ridge_hash(&face, 2));
    }
}

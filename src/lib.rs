//! # nhull
//!
//! This is a library for computing convex hulls of n-dimensional point sets with the
//! incremental Beneath-Beyond algorithm, and for deriving
//! [Delaunay triangulations](https://en.wikipedia.org/wiki/Delaunay_triangulation) by
//! paraboloid lifting and [Voronoi diagrams](https://en.wikipedia.org/wiki/Voronoi_diagram)
//! as their duals.
//!
//! # Features
//!
//! - d-dimensional convex hulls (d ≥ 2) with face adjacency and outward unit normals
//! - d-dimensional Delaunay triangulations via the lifted hull in d + 1 dimensions
//! - Voronoi nodes and edges dual to the Delaunay cells
//! - Optional internal translation to break lattice and cospherical ties
//! - Cooperative cancellation of long computations
//! - Serialization/Deserialization of all results with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! The dimension is taken from the input, so the same call handles any dimension. Here's a
//! 3D hull:
//!
//! ```rust
//! use nhull::prelude::*;
//!
//! let points = vec![
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 1.0],
//!     [0.1, 0.1, 0.1], // strictly inside
//! ];
//!
//! let hull = ConvexHull::from_points(&points).unwrap();
//!
//! assert_eq!(hull.dimension(), 3);
//! assert_eq!(hull.vertices(), &[0, 1, 2, 3]);
//! assert_eq!(hull.face_count(), 4);
//! assert!(hull.singular_vertices().is_empty());
//! assert!(hull.validate().is_ok());
//! ```
//!
//! # Delaunay and Voronoi
//!
//! ```rust
//! use nhull::prelude::*;
//!
//! let points = [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [2.0, 2.0]];
//!
//! let dt = DelaunayTriangulation::from_points(&points).unwrap();
//! assert_eq!(dt.cell_count(), 4);
//! assert!(dt.validate_delaunay().is_ok());
//!
//! let voronoi = VoronoiDiagram::from_triangulation(&dt, VoronoiNodePlacement::Circumcenter);
//! assert_eq!(voronoi.edges().len(), dt.interior_facet_count());
//! ```
//!
//! # Configuration
//!
//! [`HullOptions`](core::options::HullOptions) carries the plane distance tolerance used to
//! classify points as beyond a face, the volume tolerance for peeling flat Delaunay boundary
//! cells, the translation policy, the Voronoi node placement and an optional cancellation flag:
//!
//! ```rust
//! use nhull::prelude::*;
//!
//! let options = HullOptions::default()
//!     .with_plane_distance_tolerance(1e-7)
//!     .with_point_translation(PointTranslation::TranslateInternal(
//!         TranslationGenerator::seeded(42, 1e-10),
//!     ));
//!
//! let grid = generate_grid_points(4, 3, 1.0).unwrap();
//! let hull = ConvexHull::with_options(&grid, &options).unwrap();
//! assert!(hull.validate().is_ok());
//! // Results refer to the untranslated input.
//! assert_eq!(hull.points().position(63), &[3.0, 3.0, 3.0]);
//! ```
//!
//! # Invariants
//!
//! - **Convexity** – no hull vertex lies beyond any face by more than the tolerance.
//! - **Closure** – every ridge of every face is shared with exactly one other face.
//! - **Winding** – face vertices are ordered so that `det[normal; v1 - v0; ...] > 0`.
//! - **Determinism** – the same input and options yield the same faces in the same order.
//!
//! These are checked by [`ConvexHull::validate`](geometry::algorithms::convex_hull::ConvexHull::validate)
//! and, for triangulations, by
//! [`DelaunayTriangulation::validate`](geometry::algorithms::delaunay::DelaunayTriangulation::validate)
//! and [`DelaunayTriangulation::validate_delaunay`](geometry::algorithms::delaunay::DelaunayTriangulation::validate_delaunay).
//!
//! # Limitations
//!
//! - Arithmetic is `f64` with a tolerance; there are no exact predicates.
//! - Points whose cone has no well-defined normal are skipped and reported through
//!   `singular_vertices()`, never silently dropped.
//! - Voronoi regions of boundary cells are unbounded; their nodes are listed but no rays
//!   are emitted.

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

/// The `core` module contains the combinatorial data structures and the incremental hull
/// algorithm: the vertex buffer, faces and their pool, the worklist, the ridge connector and
/// the configuration types.
pub mod core {
    /// Hull construction algorithms
    pub mod algorithms {
        /// Incremental expansion of the hull from the seed simplex
        pub mod hull_expansion;
        /// Selection of the seed simplex
        pub mod initial_simplex;
    }
    pub mod collections;
    pub mod connector;
    pub mod face;
    pub mod face_pool;
    pub mod options;
    pub mod translation;
    pub mod util;
    pub mod vertex_buffer;
    pub mod worklist;
}

/// Contains the numeric kernel, dense linear algebra, geometric utilities and the
/// user-facing hull, Delaunay and Voronoi types.
pub mod geometry {
    /// Convex hull, Delaunay triangulation and Voronoi diagram
    pub mod algorithms {
        pub mod convex_hull;
        pub mod delaunay;
        pub mod voronoi;
        pub use convex_hull::*;
        pub use delaunay::*;
        pub use voronoi::*;
    }
    pub mod kernel;
    pub mod matrix;
    pub mod util;
    pub use algorithms::*;
    pub use util::*;
}

/// A prelude module that re-exports commonly used types.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    // Re-export from core
    pub use crate::core::{
        algorithms::{
            hull_expansion::{HullConstructionError, HullStatistics, VertexState, expand_hull},
            initial_simplex::{InitialSimplexError, find_initial_simplex},
        },
        options::HullOptions,
        translation::{PointTranslation, TranslationGenerator},
        vertex_buffer::{VertexBuffer, VertexBufferError},
    };

    // Re-export commonly used collection types from core::collections
    pub use crate::core::collections::{
        FastHashMap, FastHashSet, SmallBuffer, fast_hash_map_with_capacity,
        fast_hash_set_with_capacity,
    };

    // Re-export from geometry
    pub use crate::geometry::{
        algorithms::*, kernel::KernelError, matrix::MatrixError, util::*,
    };
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{
        core::{options::HullOptions, vertex_buffer::VertexBuffer},
        geometry::algorithms::{ConvexHull, DelaunayTriangulation, VoronoiDiagram},
        is_normal,
    };

    // =============================================================================
    // TYPE SAFETY TESTS
    // =============================================================================

    #[test]
    fn normal_types() {
        assert!(is_normal::<VertexBuffer>());
        assert!(is_normal::<HullOptions>());
        assert!(is_normal::<ConvexHull>());
        assert!(is_normal::<DelaunayTriangulation>());
        assert!(is_normal::<VoronoiDiagram>());
    }

    #[test]
    fn test_prelude_collections_exports() {
        use crate::prelude::*;

        let mut map: FastHashMap<u64, usize> = FastHashMap::default();
        map.insert(123, 456);
        assert_eq!(map.get(&123), Some(&456));

        let mut set: FastHashSet<u64> = FastHashSet::default();
        set.insert(789);
        assert!(set.contains(&789));

        let mut buffer: SmallBuffer<i32, 8> = SmallBuffer::new();
        buffer.push(42);
        assert_eq!(buffer.len(), 1);

        let map_with_cap = fast_hash_map_with_capacity::<u64, usize>(100);
        assert!(map_with_cap.capacity() >= 100);

        let set_with_cap = fast_hash_set_with_capacity::<u64>(50);
        assert!(set_with_cap.capacity() >= 50);
    }

    #[test]
    fn test_prelude_algorithm_exports() {
        use crate::prelude::*;

        let points = generate_random_points_seeded(30, 3, (-1.0, 1.0), 5).unwrap();
        let hull = ConvexHull::from_points(&points).unwrap();
        assert!(hull.validate().is_ok());

        let dt = DelaunayTriangulation::from_points(&points).unwrap();
        let voronoi = VoronoiDiagram::from_triangulation(&dt, VoronoiNodePlacement::Centroid);
        assert_eq!(voronoi.nodes().len(), dt.cell_count());
    }
}

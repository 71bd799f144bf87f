//! Property-based tests for convex hull construction.
//!
//! This module uses proptest to verify fundamental properties of the
//! incremental hull on random input, including:
//! - Convexity: no input point lies beyond any face
//! - Closure: every face has a mutual neighbor across every ridge
//! - Winding: every face is ordered counter-clockwise seen from outside
//! - Determinism: repeated runs produce identical output
//!
//! Tests are generated for dimensions 2D-7D using macros to reduce duplication.
//! The 7D cases and larger 6D inputs need the `slow-tests` feature.

use nhull::geometry::kernel::facet_orientation_determinant;
use nhull::prelude::*;
use proptest::prelude::*;

// =============================================================================
// TEST CONFIGURATION
// =============================================================================

/// Strategy for generating finite f64 coordinates
fn finite_coordinate() -> impl Strategy<Value = f64> {
    (-100.0..100.0).prop_filter("must be finite", |x: &f64| x.is_finite())
}

// =============================================================================
// DIMENSIONAL TEST GENERATION MACROS
// =============================================================================

/// Macro to generate convex hull property tests for a given dimension
macro_rules! test_convex_hull_properties {
    ($dim:literal, $min_vertices:literal, $max_vertices:literal) => {
        pastey::paste! {
            proptest! {
                /// Property: every input point is on or inside the hull
                #[test]
                fn [<prop_hull_contains_all_points_ $dim d>](
                    points in prop::collection::vec(
                        prop::array::[<uniform $dim>](finite_coordinate()),
                        $min_vertices..=$max_vertices
                    )
                ) {
                    // Degenerate samples are covered by the error path tests
                    if let Ok(hull) = ConvexHull::from_points(&points) {
                        for (index, point) in points.iter().enumerate() {
                            // Skipped vertices are reported, not enclosed
                            if hull.singular_vertices().contains(&index) {
                                continue;
                            }
                            prop_assert!(
                                !hull.is_point_outside(point).unwrap(),
                                "{}D point {:?} lies outside its own hull",
                                $dim,
                                point
                            );
                        }
                    }
                }

                /// Property: the hull passes structural and convexity validation
                #[test]
                fn [<prop_hull_is_closed_and_convex_ $dim d>](
                    points in prop::collection::vec(
                        prop::array::[<uniform $dim>](finite_coordinate()),
                        $min_vertices..=$max_vertices
                    )
                ) {
                    if let Ok(hull) = ConvexHull::from_points(&points) {
                        prop_assert!(
                            hull.validate().is_ok(),
                            "{}D hull failed validation: {:?}",
                            $dim,
                            hull.validate().err()
                        );
                        prop_assert!(
                            hull.face_count() > $dim,
                            "{}D hull must have more than {} faces, got {}",
                            $dim,
                            $dim,
                            hull.face_count()
                        );
                        prop_assert!(hull.vertices().len() > $dim);
                    }
                }

                /// Property: faces are wound counter-clockwise seen from outside
                #[test]
                fn [<prop_hull_winding_ $dim d>](
                    points in prop::collection::vec(
                        prop::array::[<uniform $dim>](finite_coordinate()),
                        $min_vertices..=$max_vertices
                    )
                ) {
                    if let Ok(hull) = ConvexHull::from_points(&points) {
                        for face in hull.faces() {
                            let positions: Vec<&[f64]> = face
                                .vertices
                                .iter()
                                .map(|&v| hull.points().position(v))
                                .collect();
                            prop_assert!(facet_orientation_determinant(&face.normal, &positions) > 0.0);
                        }
                    }
                }

                /// Property: construction is deterministic
                #[test]
                fn [<prop_hull_is_deterministic_ $dim d>](
                    points in prop::collection::vec(
                        prop::array::[<uniform $dim>](finite_coordinate()),
                        $min_vertices..=$max_vertices
                    )
                ) {
                    if let Ok(first) = ConvexHull::from_points(&points) {
                        let second = ConvexHull::from_points(&points).unwrap();
                        prop_assert_eq!(first.vertices(), second.vertices());
                        prop_assert_eq!(first.faces(), second.faces());
                    }
                }
            }
        }
    };
}

// Generate tests for dimensions 2-7
test_convex_hull_properties!(2, 4, 30);
test_convex_hull_properties!(3, 5, 40);
test_convex_hull_properties!(4, 6, 40);
test_convex_hull_properties!(5, 7, 30);
#[cfg(not(feature = "slow-tests"))]
test_convex_hull_properties!(6, 8, 24);
#[cfg(feature = "slow-tests")]
test_convex_hull_properties!(6, 8, 120);
#[cfg(feature = "slow-tests")]
test_convex_hull_properties!(7, 9, 120);

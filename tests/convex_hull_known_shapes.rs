//! Integration tests for hulls of shapes with known combinatorics.
//!
//! Covers the classic fixtures (square with an interior point, simplices,
//! hypercubes, cross-polytopes) plus determinism and statistics reporting.

use nhull::prelude::*;

// =============================================================================
// TEST FIXTURES
// =============================================================================

/// Corners of the unit hypercube in `dimension` dimensions.
fn hypercube(dimension: usize) -> Vec<Vec<f64>> {
    generate_grid_points(2, dimension, 1.0).unwrap()
}

/// Origin plus the unit vectors.
fn simplex(dimension: usize) -> Vec<Vec<f64>> {
    let mut points = vec![vec![0.0; dimension]];
    for axis in 0..dimension {
        let mut point = vec![0.0; dimension];
        point[axis] = 1.0;
        points.push(point);
    }
    points
}

/// `±e_i` for every axis.
fn cross_polytope(dimension: usize) -> Vec<Vec<f64>> {
    let mut points = Vec::new();
    for axis in 0..dimension {
        for sign in [1.0, -1.0] {
            let mut point = vec![0.0; dimension];
            point[axis] = sign;
            points.push(point);
        }
    }
    points
}

/// Sorted ridge (face minus one vertex) multiset, used to check closure.
fn ridge_counts(hull: &ConvexHull) -> FastHashMap<Vec<usize>, usize> {
    let mut counts = FastHashMap::default();
    for face in hull.faces() {
        for omitted in 0..face.vertices.len() {
            let mut ridge: Vec<usize> = face
                .vertices
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != omitted)
                .map(|(_, &v)| v)
                .collect();
            ridge.sort_unstable();
            *counts.entry(ridge).or_insert(0) += 1;
        }
    }
    counts
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_square_with_interior_point() {
    let points = [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [2.0, 2.0]];
    let hull = ConvexHull::from_points(&points).unwrap();

    assert_eq!(hull.vertices(), &[0, 1, 2, 3]);
    assert_eq!(hull.face_count(), 4);

    let mut edges: Vec<Vec<usize>> = hull
        .faces()
        .iter()
        .map(|face| {
            let mut edge = face.vertices.clone();
            edge.sort_unstable();
            edge
        })
        .collect();
    edges.sort();
    assert_eq!(edges, vec![vec![0, 1], vec![0, 3], vec![1, 2], vec![2, 3]]);

    // Counter-clockwise seen from outside: for the edge on y = 0 the normal
    // is -y, so the edge runs from (0,0) to (4,0).
    let bottom = hull
        .faces()
        .iter()
        .find(|face| face.normal[1] < -0.5)
        .unwrap();
    assert_eq!(bottom.vertices, vec![0, 1]);
    assert!(hull.validate().is_ok());
}

#[test]
fn test_tetrahedron() {
    let hull = ConvexHull::from_points(&simplex(3)).unwrap();
    assert_eq!(hull.vertices(), &[0, 1, 2, 3]);
    assert_eq!(hull.face_count(), 4);

    for (i, face) in hull.faces().iter().enumerate() {
        assert_eq!(face.vertices.len(), 3);
        for (j, other) in hull.faces().iter().enumerate() {
            if i == j {
                continue;
            }
            let shared = face
                .vertices
                .iter()
                .filter(|v| other.vertices.contains(v))
                .count();
            assert_eq!(shared, 2, "faces {i} and {j} must share exactly one edge");
        }
    }
    assert!(hull.validate().is_ok());
}

#[test]
fn test_cube_is_triangulated_into_twelve_faces() {
    let hull = ConvexHull::from_points(&hypercube(3)).unwrap();
    assert_eq!(hull.vertices().len(), 8);
    assert_eq!(hull.face_count(), 12);
    for face in hull.faces() {
        // Every triangle lies in one of the six axis-aligned square faces.
        let axis_aligned = face
            .normal
            .iter()
            .filter(|n| (n.abs() - 1.0).abs() < 1e-12)
            .count();
        assert_eq!(axis_aligned, 1);
    }
    assert!(hull.validate().is_ok());
}

#[test]
fn test_simplices_and_cross_polytopes_up_to_six_dimensions() {
    for dimension in 2..=6 {
        let hull = ConvexHull::from_points(&simplex(dimension)).unwrap();
        assert_eq!(hull.face_count(), dimension + 1, "{dimension}D simplex");
        assert!(hull.validate().is_ok());

        let hull = ConvexHull::from_points(&cross_polytope(dimension)).unwrap();
        assert_eq!(hull.vertices().len(), 2 * dimension);
        assert_eq!(hull.face_count(), 1 << dimension, "{dimension}D cross-polytope");
        assert!(hull.validate().is_ok());
    }
}

#[test]
fn test_hull_is_closed() {
    let points = generate_points_on_sphere_seeded(200, 4, 1.0, 17).unwrap();
    let hull = ConvexHull::from_points(&points).unwrap();
    assert!(ridge_counts(&hull).values().all(|&count| count == 2));
    assert!(
        hull.faces()
            .iter()
            .all(|face| face.adjacency.iter().all(Option::is_some))
    );
    // Points on a sphere are all extreme.
    assert_eq!(hull.vertices().len() + hull.singular_vertices().len(), 200);
}

#[test]
fn test_interior_points_are_not_hull_vertices() {
    let mut points = hypercube(4);
    points.extend(generate_random_points_seeded(100, 4, (0.1, 0.9), 3).unwrap());
    let hull = ConvexHull::from_points(&points).unwrap();
    assert_eq!(hull.vertices(), (0..16).collect::<Vec<_>>().as_slice());
    for point in &points[16..] {
        assert!(!hull.is_point_outside(point).unwrap());
    }
    assert!(hull.validate().is_ok());
}

/// Validates `hull` and checks that no input point it did not skip lies outside.
fn assert_encloses_input(hull: &ConvexHull, points: &[Vec<f64>]) {
    assert!(hull.validate().is_ok(), "{:?}", hull.validate());
    for (index, point) in points.iter().enumerate() {
        if hull.singular_vertices().contains(&index) {
            continue;
        }
        assert!(
            !hull.is_point_outside(point).unwrap(),
            "{}D point {index} lies outside the hull",
            hull.dimension()
        );
    }
}

#[test]
fn test_random_hulls_in_six_and_seven_dimensions_are_convex() {
    for (dimension, seed) in [(6, 3), (7, 11)] {
        let points = generate_random_points_seeded(200, dimension, (-1.0, 1.0), seed).unwrap();
        let hull = ConvexHull::from_points(&points).unwrap();
        assert_encloses_input(&hull, &points);
    }
}

#[cfg(feature = "slow-tests")]
#[test]
fn test_random_hulls_up_to_seven_dimensions_across_seeds() {
    for dimension in 4..=7 {
        for seed in 0..16 {
            let points =
                generate_random_points_seeded(300, dimension, (-1.0, 1.0), seed).unwrap();
            let hull = ConvexHull::from_points(&points).unwrap();
            assert_encloses_input(&hull, &points);
        }
    }
}

// =============================================================================
// DETERMINISM AND STATISTICS
// =============================================================================

#[test]
fn test_repeated_runs_are_identical() {
    let points = generate_random_points_seeded(300, 3, (-5.0, 5.0), 99).unwrap();
    let first = ConvexHull::from_points(&points).unwrap();
    let second = ConvexHull::from_points(&points).unwrap();
    assert_eq!(first.vertices(), second.vertices());
    assert_eq!(first.faces(), second.faces());
    assert_eq!(first.statistics(), second.statistics());
}

#[test]
fn test_statistics_are_reported() {
    let points = generate_random_points_seeded(500, 3, (-1.0, 1.0), 1).unwrap();
    let hull = ConvexHull::from_points(&points).unwrap();
    let statistics = hull.statistics();

    // One iteration per vertex added after the seed simplex.
    assert!(statistics.iterations >= hull.vertices().len() - 4);
    assert!(statistics.faces_created >= hull.face_count());
    assert!(statistics.peak_live_faces >= hull.face_count());
    assert!(statistics.faces_recycled > 0);
    assert_eq!(statistics.singular_vertices, hull.singular_vertices().len());
}

#[test]
fn test_translation_reports_original_coordinates() {
    let points = hypercube(3);
    let options = HullOptions::default().with_point_translation(
        PointTranslation::TranslateInternal(TranslationGenerator::seeded(7, 1e-9)),
    );
    let hull = ConvexHull::with_options(&points, &options).unwrap();
    assert_eq!(hull.points().position(7), &[1.0, 1.0, 1.0]);
    assert_eq!(hull.vertices().len(), 8);
    for face in hull.faces() {
        for &vertex in &face.vertices {
            let distance = face
                .normal
                .iter()
                .zip(hull.points().position(vertex))
                .map(|(n, x)| n * x)
                .sum::<f64>()
                + face.offset;
            assert!(distance.abs() < 1e-12);
        }
    }
    assert!(hull.validate().is_ok());
}

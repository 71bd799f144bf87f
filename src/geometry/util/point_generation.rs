//! Point generation for tests and benchmarks.

#![forbid(unsafe_code)]

use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Errors raised by the point generators.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RandomPointGenerationError {
    /// The coordinate range is empty or reversed.
    #[error("Invalid coordinate range: min {min} must be less than max {max}")]
    InvalidRange {
        /// Formatted lower bound.
        min: String,
        /// Formatted upper bound.
        max: String,
    },
    /// Grids need at least one point per axis.
    #[error("Invalid point count: {n_points}")]
    InvalidPointCount {
        /// The rejected count.
        n_points: usize,
    },
}

fn check_range(range: (f64, f64)) -> Result<(), RandomPointGenerationError> {
    if range.0 < range.1 && range.0.is_finite() && range.1.is_finite() {
        Ok(())
    } else {
        Err(RandomPointGenerationError::InvalidRange {
            min: format!("{:?}", range.0),
            max: format!("{:?}", range.1),
        })
    }
}

/// Generate random points with a seeded RNG for reproducible results.
///
/// # Errors
///
/// * `RandomPointGenerationError::InvalidRange` if min >= max
///
/// # Examples
///
/// ```
/// use nhull::geometry::util::generate_random_points_seeded;
///
/// let points1 = generate_random_points_seeded(100, 3, (-5.0, 5.0), 42).unwrap();
/// let points2 = generate_random_points_seeded(100, 3, (-5.0, 5.0), 42).unwrap();
/// assert_eq!(points1, points2);
/// assert_eq!(points1[0].len(), 3);
///
/// let points3 = generate_random_points_seeded(100, 3, (-5.0, 5.0), 123).unwrap();
/// assert_ne!(points1, points3);
/// ```
pub fn generate_random_points_seeded(
    n_points: usize,
    dimension: usize,
    range: (f64, f64),
    seed: u64,
) -> Result<Vec<Vec<f64>>, RandomPointGenerationError> {
    check_range(range)?;
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    Ok((0..n_points)
        .map(|_| {
            (0..dimension)
                .map(|_| rng.random_range(range.0..range.1))
                .collect()
        })
        .collect())
}

/// Generate seeded random points on the sphere of `radius` about the origin.
///
/// Every generated point is extreme, which makes this the worst case for
/// hull output size.
///
/// # Errors
///
/// * `RandomPointGenerationError::InvalidRange` if `radius` is not positive
pub fn generate_points_on_sphere_seeded(
    n_points: usize,
    dimension: usize,
    radius: f64,
    seed: u64,
) -> Result<Vec<Vec<f64>>, RandomPointGenerationError> {
    check_range((0.0, radius))?;
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(n_points);
    while points.len() < n_points {
        let direction: Vec<f64> = (0..dimension)
            .map(|_| rng.random_range(-1.0..1.0))
            .collect();
        let length = super::norms::hypot(&direction);
        // Rejection sampling inside the unit ball gives a uniform direction.
        if length <= 1e-3 || length > 1.0 {
            continue;
        }
        points.push(direction.iter().map(|x| x * radius / length).collect());
    }
    Ok(points)
}

/// Generate points arranged in a regular grid pattern.
///
/// Produces `points_per_dim ^ dimension` points using a mixed-radix counter.
/// Grids are the canonical degenerate input: many co-planar and co-spherical
/// subsets.
///
/// # Errors
///
/// * `RandomPointGenerationError::InvalidPointCount` if `points_per_dim` is zero
///
/// # Examples
///
/// ```
/// use nhull::geometry::util::generate_grid_points;
///
/// let grid = generate_grid_points(3, 2, 1.0).unwrap();
/// assert_eq!(grid.len(), 9);
/// assert_eq!(grid[4], vec![1.0, 1.0]);
/// ```
pub fn generate_grid_points(
    points_per_dim: usize,
    dimension: usize,
    spacing: f64,
) -> Result<Vec<Vec<f64>>, RandomPointGenerationError> {
    if points_per_dim == 0 {
        return Err(RandomPointGenerationError::InvalidPointCount { n_points: 0 });
    }
    let total = points_per_dim.pow(u32::try_from(dimension).unwrap_or(u32::MAX));
    let mut points = Vec::with_capacity(total);
    let mut counter = vec![0usize; dimension];
    for _ in 0..total {
        points.push(counter.iter().map(|&i| i as f64 * spacing).collect());
        for digit in &mut counter {
            *digit += 1;
            if *digit < points_per_dim {
                break;
            }
            *digit = 0;
        }
    }
    Ok(points)
}

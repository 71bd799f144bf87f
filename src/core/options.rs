//! Tunable options shared by hull, Delaunay and Voronoi computations.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::algorithms::hull_expansion::HullConstructionError;
use crate::core::translation::PointTranslation;
use crate::geometry::algorithms::voronoi::VoronoiNodePlacement;

/// Default distance a vertex must exceed to count as beyond a face.
pub const DEFAULT_PLANE_DISTANCE_TOLERANCE: f64 = 1e-5;

/// Default volume under which translated boundary Delaunay cells are discarded.
pub const DEFAULT_ZERO_CELL_VOLUME_TOLERANCE: f64 = 1e-5;

/// Options for [`ConvexHull`](crate::geometry::algorithms::convex_hull::ConvexHull),
/// [`DelaunayTriangulation`](crate::geometry::algorithms::delaunay::DelaunayTriangulation)
/// and [`VoronoiDiagram`](crate::geometry::algorithms::voronoi::VoronoiDiagram).
///
/// # Examples
///
/// ```rust
/// use nhull::core::options::HullOptions;
/// use nhull::core::translation::{PointTranslation, TranslationGenerator};
///
/// let options = HullOptions::default()
///     .with_plane_distance_tolerance(1e-7)
///     .with_point_translation(PointTranslation::TranslateInternal(
///         TranslationGenerator::seeded(42, 1e-10),
///     ));
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct HullOptions {
    plane_distance_tolerance: f64,
    zero_cell_volume_tolerance: f64,
    point_translation: PointTranslation,
    voronoi_node_placement: VoronoiNodePlacement,
    cancellation: Option<Arc<AtomicBool>>,
}

impl Default for HullOptions {
    fn default() -> Self {
        Self {
            plane_distance_tolerance: DEFAULT_PLANE_DISTANCE_TOLERANCE,
            zero_cell_volume_tolerance: DEFAULT_ZERO_CELL_VOLUME_TOLERANCE,
            point_translation: PointTranslation::None,
            voronoi_node_placement: VoronoiNodePlacement::Centroid,
            cancellation: None,
        }
    }
}

impl HullOptions {
    /// Sets the beyond/coplanar classification tolerance.
    #[must_use]
    pub const fn with_plane_distance_tolerance(mut self, tolerance: f64) -> Self {
        self.plane_distance_tolerance = tolerance;
        self
    }

    /// Sets the volume threshold for discarding translated boundary cells.
    #[must_use]
    pub const fn with_zero_cell_volume_tolerance(mut self, tolerance: f64) -> Self {
        self.zero_cell_volume_tolerance = tolerance;
        self
    }

    /// Sets the internal point translation policy.
    #[must_use]
    pub fn with_point_translation(mut self, translation: PointTranslation) -> Self {
        self.point_translation = translation;
        self
    }

    /// Sets where Voronoi nodes are placed.
    #[must_use]
    pub const fn with_voronoi_node_placement(mut self, placement: VoronoiNodePlacement) -> Self {
        self.voronoi_node_placement = placement;
        self
    }

    /// Installs a cooperative cancellation flag.
    ///
    /// The expansion loop polls the flag once per iteration and returns
    /// [`HullConstructionError::Cancelled`] after it is set.
    #[must_use]
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// Beyond/coplanar classification tolerance.
    #[must_use]
    pub const fn plane_distance_tolerance(&self) -> f64 {
        self.plane_distance_tolerance
    }

    /// Volume threshold for translated boundary Delaunay cells.
    #[must_use]
    pub const fn zero_cell_volume_tolerance(&self) -> f64 {
        self.zero_cell_volume_tolerance
    }

    /// Internal translation policy.
    #[must_use]
    pub const fn point_translation(&self) -> &PointTranslation {
        &self.point_translation
    }

    /// Voronoi node placement.
    #[must_use]
    pub const fn voronoi_node_placement(&self) -> VoronoiNodePlacement {
        self.voronoi_node_placement
    }

    /// Returns `true` once the cancellation flag (if any) has been raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Checks option values before any computation starts.
    ///
    /// # Errors
    ///
    /// Returns [`HullConstructionError::InvalidOptions`] if a tolerance is
    /// negative or non-finite, or if a seeded translation magnitude is not
    /// positive and strictly below the plane distance tolerance.
    pub fn validate(&self) -> Result<(), HullConstructionError> {
        if !self.plane_distance_tolerance.is_finite() || self.plane_distance_tolerance <= 0.0 {
            return Err(HullConstructionError::InvalidOptions {
                message: format!(
                    "plane_distance_tolerance must be finite and positive, got {}",
                    self.plane_distance_tolerance
                ),
            });
        }
        if !self.zero_cell_volume_tolerance.is_finite() || self.zero_cell_volume_tolerance < 0.0 {
            return Err(HullConstructionError::InvalidOptions {
                message: format!(
                    "zero_cell_volume_tolerance must be finite and non-negative, got {}",
                    self.zero_cell_volume_tolerance
                ),
            });
        }
        if let Some(magnitude) = self
            .point_translation
            .generator()
            .and_then(|generator| generator.magnitude())
        {
            if !magnitude.is_finite() || magnitude <= 0.0 {
                return Err(HullConstructionError::InvalidOptions {
                    message: format!(
                        "translation magnitude must be finite and positive, got {magnitude}"
                    ),
                });
            }
            if magnitude >= self.plane_distance_tolerance {
                return Err(HullConstructionError::InvalidOptions {
                    message: format!(
                        "translation magnitude {magnitude} must be below plane_distance_tolerance {}",
                        self.plane_distance_tolerance
                    ),
                });
            }
            if magnitude > self.plane_distance_tolerance * 1e-2 {
                tracing::warn!(
                    magnitude,
                    tolerance = self.plane_distance_tolerance,
                    "translation magnitude is not well below the plane distance tolerance"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::translation::TranslationGenerator;

    #[test]
    fn test_defaults() {
        let options = HullOptions::default();
        assert_eq!(options.plane_distance_tolerance(), 1e-5);
        assert_eq!(options.zero_cell_volume_tolerance(), 1e-5);
        assert!(matches!(options.point_translation(), PointTranslation::None));
        assert_eq!(
            options.voronoi_node_placement(),
            VoronoiNodePlacement::Centroid
        );
        assert!(!options.is_cancelled());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_invalid_tolerances_are_rejected() {
        for tolerance in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let options = HullOptions::default().with_plane_distance_tolerance(tolerance);
            assert!(matches!(
                options.validate(),
                Err(HullConstructionError::InvalidOptions { .. })
            ));
        }
        let options = HullOptions::default().with_zero_cell_volume_tolerance(-1e-3);
        assert!(matches!(
            options.validate(),
            Err(HullConstructionError::InvalidOptions { .. })
        ));
        // Zero disables peeling and is allowed.
        assert!(
            HullOptions::default()
                .with_zero_cell_volume_tolerance(0.0)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_translation_magnitude_must_be_below_tolerance() {
        let too_large = HullOptions::default().with_point_translation(
            PointTranslation::TranslateInternal(TranslationGenerator::seeded(1, 1e-5)),
        );
        assert!(matches!(
            too_large.validate(),
            Err(HullConstructionError::InvalidOptions { .. })
        ));

        let zero = HullOptions::default().with_point_translation(
            PointTranslation::TranslateInternal(TranslationGenerator::seeded(1, 0.0)),
        );
        assert!(zero.validate().is_err());

        let custom = HullOptions::default().with_point_translation(
            PointTranslation::TranslateInternal(TranslationGenerator::from_fn(|_, _| 0.0)),
        );
        assert!(custom.validate().is_ok());
    }

    #[test]
    fn test_cancellation_flag_is_observed() {
        let flag = Arc::new(AtomicBool::new(false));
        let options = HullOptions::default().with_cancellation(Arc::clone(&flag));
        assert!(!options.is_cancelled());
        flag.store(true, Ordering::Relaxed);
        assert!(options.is_cancelled());
    }
}

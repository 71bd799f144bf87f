//! Internal point translation for degenerate input.
//!
//! Lattice-like inputs (grids, co-spherical point sets) produce ties that the
//! incremental hull resolves arbitrarily or rejects as degenerate. Translating
//! every coordinate by an offset much smaller than the plane distance
//! tolerance breaks those ties without changing which points are extreme.

#![forbid(unsafe_code)]

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use rand::{Rng, SeedableRng};

use crate::core::vertex_buffer::VertexBuffer;

/// Whether coordinates are jittered before the hull is built.
///
/// Because the generator lives inside the `TranslateInternal` variant,
/// enabling translation without supplying a generator is not expressible.
#[derive(Clone, Debug, Default)]
pub enum PointTranslation {
    /// Use the input coordinates as given.
    #[default]
    None,
    /// Offset each working coordinate by the supplied generator. Results are
    /// still reported in the original coordinates.
    TranslateInternal(TranslationGenerator),
}

impl PointTranslation {
    /// Returns the generator if translation is enabled.
    #[must_use]
    pub const fn generator(&self) -> Option<&TranslationGenerator> {
        match self {
            Self::None => None,
            Self::TranslateInternal(generator) => Some(generator),
        }
    }

    /// The working copy of `buffer` the hull is computed on.
    ///
    /// Borrowed unchanged when translation is off.
    #[must_use]
    pub fn apply<'b>(&self, buffer: &'b VertexBuffer) -> Cow<'b, VertexBuffer> {
        match self {
            Self::None => Cow::Borrowed(buffer),
            Self::TranslateInternal(generator) => Cow::Owned(buffer.translated(generator)),
        }
    }
}

/// Source of per-coordinate offsets.
#[derive(Clone)]
pub enum TranslationGenerator {
    /// Uniform offsets in `[-magnitude, magnitude)` from a seeded `StdRng`.
    Seeded {
        /// RNG seed; equal seeds give equal offsets.
        seed: u64,
        /// Half-width of the offset interval.
        magnitude: f64,
    },
    /// Caller-supplied offset for `(vertex, axis)`.
    Custom(Arc<dyn Fn(usize, usize) -> f64 + Send + Sync>),
}

impl TranslationGenerator {
    /// Seeded uniform offsets of at most `magnitude` per coordinate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nhull::core::translation::TranslationGenerator;
    ///
    /// let generator = TranslationGenerator::seeded(7, 1e-9);
    /// assert_eq!(generator.magnitude(), Some(1e-9));
    /// ```
    #[must_use]
    pub const fn seeded(seed: u64, magnitude: f64) -> Self {
        Self::Seeded { seed, magnitude }
    }

    /// Offsets computed by `f(vertex, axis)`.
    #[must_use]
    pub fn from_fn(f: impl Fn(usize, usize) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// The declared offset bound, when known.
    #[must_use]
    pub const fn magnitude(&self) -> Option<f64> {
        match self {
            Self::Seeded { magnitude, .. } => Some(*magnitude),
            Self::Custom(_) => None,
        }
    }

    /// Produces `count × dimension` offsets in row-major vertex order.
    pub(crate) fn offsets(&self, count: usize, dimension: usize) -> Vec<f64> {
        let total = count * dimension;
        match self {
            Self::Seeded { seed, magnitude } => {
                if !(*magnitude > 0.0) || !magnitude.is_finite() {
                    return vec![0.0; total];
                }
                let mut rng = rand::rngs::StdRng::seed_from_u64(*seed);
                (0..total)
                    .map(|_| rng.random_range(-*magnitude..*magnitude))
                    .collect()
            }
            Self::Custom(f) => (0..total)
                .map(|i| f(i / dimension, i % dimension))
                .collect(),
        }
    }
}

impl fmt::Debug for TranslationGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seeded { seed, magnitude } => f
                .debug_struct("Seeded")
                .field("seed", seed)
                .field("magnitude", magnitude)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

//! Geometric utility functions for d-dimensional geometry calculations.
//!
//! Everything here works on runtime-dimension coordinate slices so the same
//! helpers serve the hull in `d` dimensions and the lifted hull in `d + 1`.

mod circumsphere;
mod norms;
mod point_generation;

pub use circumsphere::*;
pub use norms::*;
pub use point_generation::*;

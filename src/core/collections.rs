//! High-performance collection types used by the hull algorithms.
//!
//! These aliases pin the hashing strategy and the inline sizes in one place so
//! that the face pool, the connector and the expansion engine agree on them.

mod aliases;
mod helpers;

pub use aliases::*;
pub use helpers::*;

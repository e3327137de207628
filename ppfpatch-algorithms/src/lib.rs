//! # ppfpatch algorithms
//!
//! The patch extraction pipeline: spatial indexing, normal estimation,
//! fixed-cardinality neighbor sampling, point-pair-feature encoding, and
//! patch batch assembly.
//!
//! The entry point for most callers is [`PatchBuilder`], which turns a point
//! cloud and a list of reference indices into a dense
//! `[num_references, num_points_per_patch, 4]` tensor of rotation-invariant
//! features.

pub mod spatial;
pub mod normals;
pub mod sampler;
pub mod ppf;
pub mod patch;

// Re-export commonly used items
pub use spatial::*;
pub use normals::*;
pub use sampler::*;
pub use ppf::*;
pub use patch::*;

//! # ppfpatch loader
//!
//! Adapts the patch extraction pipeline to a random-access, per-sample-id
//! interface suitable for repeated invocation by a training loop's data
//! pipeline: sample records, a pluggable cloud source, a bounded cache of
//! prepared clouds, and the on-the-fly loader with its failure fallback.

pub mod sample;
pub mod cache;
pub mod loader;

pub use sample::*;
pub use cache::*;
pub use loader::*;

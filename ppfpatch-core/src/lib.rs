//! Core data structures and traits for ppfpatch
//!
//! This crate provides the fundamental types shared by the patch extraction
//! pipeline: point and point cloud containers, the error type, the extraction
//! configuration, and the nearest-neighbor seam trait.

pub mod point;
pub mod point_cloud;
pub mod config;
pub mod traits;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use config::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix3, Isometry3};

/// Common result type for ppfpatch operations
pub type Result<T> = std::result::Result<T, Error>;

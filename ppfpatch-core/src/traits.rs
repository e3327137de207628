//! Core traits for ppfpatch

use crate::error::Result;
use crate::point::Point3f;
use crate::point_cloud::PointCloud;
use nalgebra::Isometry3;

/// Trait for nearest neighbor search functionality
pub trait NearestNeighborSearch {
    /// Find the k nearest neighbors to a query point, as `(index, distance)`
    /// pairs in ascending distance order
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Result<Vec<(usize, f32)>>;

    /// Find the indices of all points within a given radius of the query
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Result<Vec<usize>>;
}

/// Trait for objects that can be rigidly transformed
pub trait Transformable {
    /// Apply a rigid transformation to the object
    fn transform(&mut self, isometry: &Isometry3<f32>);
}

impl Transformable for PointCloud {
    fn transform(&mut self, isometry: &Isometry3<f32>) {
        PointCloud::transform(self, isometry);
    }
}

//! Point cloud data structure with lazily populated surface normals

use crate::error::{Error, Result};
use crate::point::{OrientedPoint3f, Point3f, Vector3f};
use nalgebra::Isometry3;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Tolerance used when checking that a normal is unit length.
const NORMAL_LENGTH_TOLERANCE: f32 = 1e-3;

/// A 3D point cloud with an optional parallel array of surface normals.
///
/// The normals array is populated lazily by normal estimation. Once set, it
/// always has the same length as the points array, and every entry is either
/// a unit vector (within floating-point tolerance) or the zero vector when
/// estimation failed for that point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCloud {
    pub points: Vec<Point3f>,
    normals: Option<Vec<Vector3f>>,
}

impl PointCloud {
    /// Create a new empty point cloud
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            normals: None,
        }
    }

    /// Create a new point cloud with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            normals: None,
        }
    }

    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<Point3f>) -> Self {
        Self {
            points,
            normals: None,
        }
    }

    /// Create a point cloud from oriented points, splitting positions and
    /// normals into their parallel arrays.
    pub fn from_oriented_points(points: Vec<OrientedPoint3f>) -> Self {
        let (positions, normals) = points
            .into_iter()
            .map(|p| (p.position, p.normal))
            .unzip();
        Self {
            points: positions,
            normals: Some(normals),
        }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the cloud.
    ///
    /// Any previously computed normals are dropped, since they would no
    /// longer be parallel to the points array.
    pub fn push(&mut self, point: Point3f) {
        self.points.push(point);
        self.normals = None;
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<Point3f> {
        self.points.iter()
    }

    /// Clear all points and normals from the cloud
    pub fn clear(&mut self) {
        self.points.clear();
        self.normals = None;
    }

    /// Whether normals have been populated for this cloud
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// The normals array, if populated
    pub fn normals(&self) -> Option<&[Vector3f]> {
        self.normals.as_deref()
    }

    /// The normal of point `i`, if normals are populated
    pub fn normal(&self, i: usize) -> Option<&Vector3f> {
        self.normals.as_ref().and_then(|n| n.get(i))
    }

    /// Set the normals array.
    ///
    /// The array must be parallel to the points array, and every entry must
    /// be a unit vector or the zero vector (the estimation-failed marker).
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) -> Result<()> {
        if normals.len() != self.points.len() {
            return Err(Error::InvalidData(format!(
                "normals length {} does not match points length {}",
                normals.len(),
                self.points.len()
            )));
        }
        for (i, n) in normals.iter().enumerate() {
            let len = n.norm();
            if len > NORMAL_LENGTH_TOLERANCE && (len - 1.0).abs() > NORMAL_LENGTH_TOLERANCE {
                return Err(Error::InvalidData(format!(
                    "normal {} has length {}, expected unit or zero",
                    i, len
                )));
            }
        }
        self.normals = Some(normals);
        Ok(())
    }

    /// Apply a rigid transformation to all points, rotating normals alongside.
    pub fn transform(&mut self, isometry: &Isometry3<f32>) {
        for point in &mut self.points {
            *point = isometry.transform_point(point);
        }
        if let Some(normals) = &mut self.normals {
            for normal in normals.iter_mut() {
                *normal = isometry.rotation.transform_vector(normal);
            }
        }
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for PointCloud {
    type Output = Point3f;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a Point3f;
    type IntoIter = std::slice::Iter<'a, Point3f>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl FromIterator<Point3f> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point3f>>(iter: I) -> Self {
        Self::from_points(Vec::from_iter(iter))
    }
}

//! Normal estimation via local plane fits

use crate::spatial::SpatialIndex;
use nalgebra::Matrix3;
use ppfpatch_core::{Point3f, PointCloud, Result, Vector3f};
use rayon::prelude::*;

/// Minimum neighbor count for a non-degenerate plane fit
const MIN_PLANE_FIT_NEIGHBORS: usize = 3;

/// Estimate unit surface normals for every point in the cloud.
///
/// For each point, the `k` nearest neighbors are gathered and the normal is
/// taken as the eigenvector of the smallest eigenvalue of the local
/// covariance matrix. Points with fewer than 3 neighbors, or whose
/// neighborhood is degenerate (coincident or collinear points), get the zero
/// vector; callers must treat a zero normal as "estimation failed".
///
/// Normal orientation is NOT made globally consistent: the sign of each
/// normal is whatever the eigensolver produced. Downstream PPF encoding
/// tolerates this.
///
/// The computation is parallelized across points with rayon.
pub fn estimate_normals(cloud: &mut PointCloud, k: usize) -> Result<()> {
    let index = SpatialIndex::built(cloud);
    estimate_normals_with_index(cloud, &index, k)
}

/// Same as [`estimate_normals`], reusing an already-built spatial index.
pub fn estimate_normals_with_index(
    cloud: &mut PointCloud,
    index: &SpatialIndex,
    k: usize,
) -> Result<()> {
    let points = &cloud.points;
    let normals = points
        .par_iter()
        .map(|point| {
            let hits = index.nearest(point, k)?;
            Ok(plane_fit_normal(points, &hits))
        })
        .collect::<Result<Vec<Vector3f>>>()?;
    cloud.set_normals(normals)
}

/// Fit a tangent plane to the given neighborhood and return its unit normal,
/// or the zero vector when the neighborhood is degenerate.
fn plane_fit_normal(points: &[Point3f], hits: &[(usize, f32)]) -> Vector3f {
    if hits.len() < MIN_PLANE_FIT_NEIGHBORS {
        return Vector3f::zeros();
    }

    let mut centroid = Vector3f::zeros();
    for &(i, _) in hits {
        centroid += points[i].coords;
    }
    centroid /= hits.len() as f32;

    let mut covariance = Matrix3::zeros();
    for &(i, _) in hits {
        let deviation = points[i].coords - centroid;
        covariance += deviation * deviation.transpose();
    }

    let eigen = covariance.symmetric_eigen();

    // All eigenvalues near zero means the neighborhood collapsed to a point
    let largest = eigen.eigenvalues.iter().cloned().fold(0.0f32, f32::max);
    if largest <= 1e-12 {
        return Vector3f::zeros();
    }

    let mut smallest = 0;
    for i in 1..3 {
        if eigen.eigenvalues[i] < eigen.eigenvalues[smallest] {
            smallest = i;
        }
    }

    let normal: Vector3f = eigen.eigenvectors.column(smallest).into_owned();
    let length = normal.norm();
    if length <= 1e-6 {
        Vector3f::zeros()
    } else {
        normal / length
    }
}

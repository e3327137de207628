//! Point-pair feature encoding
//!
//! A point pair feature describes the geometric relation of two oriented
//! points with four numbers that are invariant under any rigid transform
//! applied to both: the angle between the reference normal and the
//! connecting segment, the same angle for the neighbor normal, the angle
//! between the two normals, and the segment length.

use ndarray::Array2;
use ppfpatch_core::{Point3f, Vector3f};

/// Angle between two vectors, computed as `atan2(|a x b|, a . b)`.
///
/// Numerically stable near 0 and pi, unlike the arccos of the normalized
/// dot product. Returns 0 when either vector is zero.
#[inline]
fn vector_angle(a: &Vector3f, b: &Vector3f) -> f32 {
    a.cross(b).norm().atan2(a.dot(b))
}

/// Encode one (reference, neighbor) oriented point pair.
///
/// Returns `[angle(n_ref, d), angle(n_nbr, d), angle(n_ref, n_nbr), |d|]`
/// where `d` runs from the reference point to the neighbor. When the two
/// points coincide the angles are undefined; the pair encodes as all zeros
/// rather than NaN.
pub fn ppf_pair(
    ref_point: &Point3f,
    ref_normal: &Vector3f,
    nbr_point: &Point3f,
    nbr_normal: &Vector3f,
) -> [f32; 4] {
    let d = nbr_point - ref_point;
    let dist = d.norm();
    if dist <= f32::EPSILON {
        return [0.0; 4];
    }
    [
        vector_angle(ref_normal, &d),
        vector_angle(nbr_normal, &d),
        vector_angle(ref_normal, nbr_normal),
        dist,
    ]
}

/// Encode every neighbor of one reference point into a `[n, 4]` patch.
///
/// Row `i` is the feature of `(reference, neighbors[i])`, in input order.
pub fn ppf_rows(
    ref_point: &Point3f,
    ref_normal: &Vector3f,
    neighbors: &[(Point3f, Vector3f)],
) -> Array2<f32> {
    let mut rows = Array2::zeros((neighbors.len(), 4));
    for (i, (point, normal)) in neighbors.iter().enumerate() {
        let feature = ppf_pair(ref_point, ref_normal, point, normal);
        for (j, value) in feature.iter().enumerate() {
            rows[[i, j]] = *value;
        }
    }
    rows
}

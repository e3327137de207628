//! Spatial indexing for nearest-neighbor and radius queries

use kiddo::float::distance::SquaredEuclidean;
use kiddo::float::kdtree::KdTree;
use ppfpatch_core::{Error, NearestNeighborSearch, Point3f, PointCloud, Result};

type Tree = KdTree<f32, u32, 3, 256, u32>;

/// KD-tree index over the points of a [`PointCloud`].
///
/// The index is built once and is immutable afterwards, so it can be shared
/// read-only across threads. Queries on an index that has not been built
/// fail with [`Error::IndexNotBuilt`].
pub struct SpatialIndex {
    tree: Option<Tree>,
    num_points: usize,
}

impl SpatialIndex {
    /// Create an empty, unbuilt index
    pub fn new() -> Self {
        Self {
            tree: None,
            num_points: 0,
        }
    }

    /// Build the index over the cloud's points. O(N log N).
    pub fn build(&mut self, cloud: &PointCloud) {
        let mut tree = Tree::with_capacity(cloud.len());
        for (i, point) in cloud.iter().enumerate() {
            tree.add(&[point.x, point.y, point.z], i as u32);
        }
        self.tree = Some(tree);
        self.num_points = cloud.len();
    }

    /// Build an index over a cloud in one step
    pub fn built(cloud: &PointCloud) -> Self {
        let mut index = Self::new();
        index.build(cloud);
        index
    }

    fn tree(&self) -> Result<&Tree> {
        self.tree.as_ref().ok_or(Error::IndexNotBuilt)
    }

    /// Find the `k` nearest points to `query`.
    ///
    /// Returns `(index, distance)` pairs in ascending distance order, with
    /// ties broken by the smaller original point index. Distances are
    /// Euclidean. If `k` exceeds the cloud size, all points are returned.
    pub fn nearest(&self, query: &Point3f, k: usize) -> Result<Vec<(usize, f32)>> {
        let tree = self.tree()?;
        if k == 0 {
            return Ok(Vec::new());
        }
        let mut hits: Vec<(usize, f32)> = tree
            .nearest_n::<SquaredEuclidean>(&[query.x, query.y, query.z], k)
            .into_iter()
            .map(|nn| (nn.item as usize, nn.distance.sqrt()))
            .collect();
        // kiddo sorts by distance; enforce the index tie-break on top
        hits.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        Ok(hits)
    }

    /// Find all points within `radius` (Euclidean) of `query`.
    ///
    /// Returns indices sorted ascending, which gives a stable order across
    /// repeated calls. The query point itself is included when it is a
    /// member of the indexed set.
    pub fn radius(&self, query: &Point3f, radius: f32) -> Result<Vec<usize>> {
        let tree = self.tree()?;
        if radius <= 0.0 || !radius.is_finite() {
            return Ok(Vec::new());
        }
        let radius_sq = radius * radius;
        // kiddo's within_unsorted compares strictly; widen the query slightly
        // and post-filter so points exactly on the boundary are kept
        let widened = radius_sq + f32::EPSILON * radius_sq.max(1.0);
        let mut indices: Vec<usize> = tree
            .within_unsorted::<SquaredEuclidean>(&[query.x, query.y, query.z], widened)
            .into_iter()
            .filter(|nn| nn.distance <= radius_sq)
            .map(|nn| nn.item as usize)
            .collect();
        indices.sort_unstable();
        Ok(indices)
    }

    /// Number of indexed points, or `None` before build
    pub fn len(&self) -> Option<usize> {
        self.tree.as_ref().map(|_| self.num_points)
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl NearestNeighborSearch for SpatialIndex {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Result<Vec<(usize, f32)>> {
        self.nearest(query, k)
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Result<Vec<usize>> {
        self.radius(query, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_grid_cloud() -> PointCloud {
        // 3x3x3 grid of unit-spaced points
        let mut points = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                for z in 0..3 {
                    points.push(Point3f::new(x as f32, y as f32, z as f32));
                }
            }
        }
        PointCloud::from_points(points)
    }

    #[test]
    fn test_query_before_build_fails() {
        let index = SpatialIndex::new();
        let result = index.nearest(&Point3f::origin(), 1);
        assert!(matches!(result, Err(Error::IndexNotBuilt)));
        let result = index.radius(&Point3f::origin(), 1.0);
        assert!(matches!(result, Err(Error::IndexNotBuilt)));
    }

    #[test]
    fn test_nearest_returns_sorted_distances() {
        let cloud = unit_grid_cloud();
        let index = SpatialIndex::built(&cloud);
        let hits = index.nearest(&Point3f::new(0.1, 0.1, 0.1), 5).unwrap();
        assert_eq!(hits.len(), 5);
        for pair in hits.windows(2) {
            assert!(pair[0].1 <= pair[1].1, "distances not ascending");
        }
        // The grid corner at the origin is the closest point
        assert_eq!(hits[0].0, 0);
        assert_relative_eq!(hits[0].1, (3.0f32 * 0.01).sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_nearest_ties_broken_by_index() {
        let cloud = PointCloud::from_points(vec![
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(-1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(0.0, -1.0, 0.0),
        ]);
        let index = SpatialIndex::built(&cloud);
        let hits = index.nearest(&Point3f::origin(), 4).unwrap();
        let indices: Vec<usize> = hits.iter().map(|h| h.0).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_nearest_k_larger_than_cloud() {
        let cloud = unit_grid_cloud();
        let index = SpatialIndex::built(&cloud);
        let hits = index.nearest(&Point3f::origin(), 100).unwrap();
        assert_eq!(hits.len(), 27);
    }

    #[test]
    fn test_radius_on_unit_grid() {
        let cloud = unit_grid_cloud();
        let index = SpatialIndex::built(&cloud);
        // From the grid center, radius 1.0 covers the center itself plus its
        // six face neighbors; the edge diagonals are at sqrt(2)
        let center = Point3f::new(1.0, 1.0, 1.0);
        let within = index.radius(&center, 1.0).unwrap();
        assert_eq!(within.len(), 7);
        for &i in &within {
            let dist = (cloud[i] - center).norm();
            assert!(dist <= 1.0 + 1e-6, "point {} outside radius: {}", i, dist);
        }
    }

    #[test]
    fn test_radius_includes_query_point() {
        let cloud = unit_grid_cloud();
        let index = SpatialIndex::built(&cloud);
        let within = index.radius(&Point3f::origin(), 0.5).unwrap();
        assert_eq!(within, vec![0]);
    }

    #[test]
    fn test_radius_boundary_inclusive() {
        let cloud = PointCloud::from_points(vec![
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(5.0, 0.0, 0.0),
        ]);
        let index = SpatialIndex::built(&cloud);
        let within = index.radius(&Point3f::origin(), 1.0).unwrap();
        assert!(within.contains(&0), "boundary point should be included");
        assert!(!within.contains(&1));
    }

    #[test]
    fn test_radius_order_is_stable() {
        let cloud = unit_grid_cloud();
        let index = SpatialIndex::built(&cloud);
        let center = Point3f::new(1.0, 1.0, 1.0);
        let first = index.radius(&center, 1.5).unwrap();
        let second = index.radius(&center, 1.5).unwrap();
        assert_eq!(first, second);
    }
}

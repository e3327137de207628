//! Patch assembly: fixed-size PPF neighborhoods per reference point

use crate::ppf;
use crate::sampler;
use crate::spatial::SpatialIndex;
use ndarray::{Array2, Array3, Axis};
use ppfpatch_core::{Error, PatchConfig, Point3f, PointCloud, Result, Vector3f};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Normals shorter than this count as estimation failures
const DEGENERATE_NORMAL_LENGTH: f32 = 1e-6;

/// Builds batches of PPF-encoded local patches.
///
/// This is the public entry point of the extraction pipeline: given a point
/// cloud with populated normals, a spatial index over it, and a list of
/// reference indices, [`PatchBuilder::build`] produces a dense
/// `[num_references, num_points_per_patch, 4]` f32 tensor whose row `i`
/// encodes the neighborhood of `reference_indices[i]`.
pub struct PatchBuilder {
    config: PatchConfig,
}

impl PatchBuilder {
    pub fn new(config: PatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PatchConfig {
        &self.config
    }

    /// Build one patch per reference index.
    ///
    /// Fails fast on the first reference that cannot be processed (out of
    /// bounds, degenerate normal, empty neighborhood); no partial batches
    /// are produced. The randomness is taken from the configured seed, or
    /// drawn fresh when no seed is set.
    pub fn build(
        &self,
        cloud: &PointCloud,
        index: &SpatialIndex,
        reference_indices: &[usize],
    ) -> Result<Array3<f32>> {
        let base_seed = self.config.random_seed.unwrap_or_else(rand::random);
        self.build_seeded(cloud, index, reference_indices, base_seed)
    }

    /// Same as [`build`](Self::build) with an explicit base seed, for callers
    /// that manage their own random state.
    ///
    /// Output is bit-identical for identical inputs and seed, regardless of
    /// how rayon schedules the per-reference work: each reference rank
    /// derives its own generator from the base seed.
    pub fn build_seeded(
        &self,
        cloud: &PointCloud,
        index: &SpatialIndex,
        reference_indices: &[usize],
        base_seed: u64,
    ) -> Result<Array3<f32>> {
        if !cloud.has_normals() {
            return Err(Error::InvalidData(
                "point cloud has no normals; estimate normals first".to_string(),
            ));
        }
        if let Some(&bad) = reference_indices.iter().find(|&&r| r >= cloud.len()) {
            return Err(Error::InvalidData(format!(
                "reference index {} out of bounds for cloud of {} points",
                bad,
                cloud.len()
            )));
        }

        let rows = reference_indices
            .par_iter()
            .enumerate()
            .map(|(rank, &ref_index)| {
                let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(rank as u64));
                self.build_row(cloud, index, ref_index, &mut rng)
            })
            .collect::<Result<Vec<Array2<f32>>>>()?;

        let mut batch = Array3::zeros((
            reference_indices.len(),
            self.config.num_points_per_patch,
            4,
        ));
        for (i, row) in rows.into_iter().enumerate() {
            batch.index_axis_mut(Axis(0), i).assign(&row);
        }
        Ok(batch)
    }

    /// Build patches for free-floating keypoint coordinates.
    ///
    /// Each keypoint is mapped to the index of its nearest cloud point, then
    /// patches are built as in [`build`](Self::build). Row order matches the
    /// keypoint order.
    pub fn build_for_keypoints(
        &self,
        cloud: &PointCloud,
        index: &SpatialIndex,
        keypoints: &[Point3f],
    ) -> Result<Array3<f32>> {
        let mut reference_indices = Vec::with_capacity(keypoints.len());
        for keypoint in keypoints {
            let hit = index.nearest(keypoint, 1)?;
            let (nearest, _) = *hit.first().ok_or_else(|| {
                Error::InvalidData("cannot map keypoints onto an empty cloud".to_string())
            })?;
            reference_indices.push(nearest);
        }
        self.build(cloud, index, &reference_indices)
    }

    /// Encode one reference point's neighborhood into a `[patch_size, 4]` row.
    fn build_row(
        &self,
        cloud: &PointCloud,
        index: &SpatialIndex,
        ref_index: usize,
        rng: &mut StdRng,
    ) -> Result<Array2<f32>> {
        let ref_point = cloud[ref_index];
        let ref_normal = cloud
            .normal(ref_index)
            .copied()
            .unwrap_or_else(Vector3f::zeros);
        if ref_normal.norm() <= DEGENERATE_NORMAL_LENGTH {
            return Err(Error::DegenerateNormal { index: ref_index });
        }

        let neighbor_indices = sampler::sample_neighbors(
            index,
            ref_index,
            &ref_point,
            self.config.vicinity_radius,
            self.config.num_points_per_patch,
            rng,
        )?;

        let neighbors: Vec<(Point3f, Vector3f)> = neighbor_indices
            .iter()
            .map(|&i| {
                let normal = cloud.normal(i).copied().unwrap_or_else(Vector3f::zeros);
                (cloud[i], normal)
            })
            .collect();

        Ok(ppf::ppf_rows(&ref_point, &ref_normal, &neighbors))
    }
}

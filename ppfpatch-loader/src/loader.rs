//! On-the-fly patch extraction keyed by sample id

use crate::cache::{CloudCache, PreparedCloud};
use crate::sample::{CloudSource, SampleRecord};
use ndarray::Array3;
use ppfpatch_algorithms::normals::estimate_normals_with_index;
use ppfpatch_algorithms::patch::PatchBuilder;
use ppfpatch_algorithms::spatial::SpatialIndex;
use ppfpatch_core::{Error, PatchConfig, PointCloud, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Default number of prepared clouds kept around between `get` calls
const DEFAULT_CACHE_CAPACITY: usize = 8;

/// Splitmix-style multiplier used to separate per-sample random streams
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Normals shorter than this are treated as estimation failures when
/// selecting reference points
const DEGENERATE_NORMAL_LENGTH: f32 = 1e-6;

/// Random-access patch extraction over an indexed dataset.
///
/// Each sample id maps to one [`SampleRecord`] and produces one
/// `[num_patches, num_points_per_patch, 4]` batch, computed at access time.
/// Failed samples are substituted with sample 0's result when the fallback
/// is enabled, which keeps a training pipeline running over occasional
/// corrupt inputs at the cost of duplicated samples; callers needing strict
/// semantics disable the fallback or use [`get_strict`](Self::get_strict).
pub struct OnTheFlyLoader<S: CloudSource> {
    source: S,
    records: Vec<SampleRecord>,
    config: PatchConfig,
    builder: PatchBuilder,
    cache: CloudCache,
    failure_count: u64,
}

impl<S: CloudSource> OnTheFlyLoader<S> {
    pub fn new(source: S, records: Vec<SampleRecord>, config: PatchConfig) -> Result<Self> {
        let builder = PatchBuilder::new(config.clone())?;
        Ok(Self {
            source,
            records,
            config,
            builder,
            cache: CloudCache::new(DEFAULT_CACHE_CAPACITY),
            failure_count: 0,
        })
    }

    /// Replace the default cloud cache, e.g. to change its capacity or to
    /// disable caching with a zero-capacity cache
    pub fn with_cache(mut self, cache: CloudCache) -> Self {
        self.cache = cache;
        self
    }

    /// Number of samples in the dataset index
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// How many `get` calls have taken the substitution fallback so far
    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    /// Build the patch batch for one sample id.
    ///
    /// Returns the batch together with the id it was actually built from:
    /// the requested id normally, or 0 when the fallback substituted the
    /// known-good first sample.
    pub fn get(&mut self, sample_id: usize) -> Result<(Array3<f32>, usize)> {
        match self.get_strict(sample_id) {
            Ok(batch) => Ok((batch, sample_id)),
            Err(err) if self.config.on_the_fly_fallback_enabled && sample_id != 0 => {
                let key = self
                    .records
                    .get(sample_id)
                    .map(|r| r.sample_key())
                    .unwrap_or_else(|| format!("#{}", sample_id));
                log::warn!("sample {} failed ({}); substituting sample 0", key, err);
                self.failure_count += 1;
                let batch = self.get_strict(0)?;
                Ok((batch, 0))
            }
            Err(err) => Err(err),
        }
    }

    /// Build the patch batch for one sample id without the substitution
    /// fallback; any failure propagates to the caller.
    pub fn get_strict(&mut self, sample_id: usize) -> Result<Array3<f32>> {
        let record = self.records.get(sample_id).cloned().ok_or_else(|| {
            Error::SampleResolution(format!(
                "sample id {} out of range for {} records",
                sample_id,
                self.records.len()
            ))
        })?;
        let prepared = self.prepared_cloud(&record)?;
        let references = self.select_references(sample_id, &prepared.cloud)?;
        self.builder.build_seeded(
            &prepared.cloud,
            &prepared.index,
            &references,
            self.patch_seed(sample_id),
        )
    }

    /// Load a cloud through the cache, building its index and normals on a
    /// cache miss
    fn prepared_cloud(&mut self, record: &SampleRecord) -> Result<Arc<PreparedCloud>> {
        let key = record.sample_key();
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let mut cloud = self.source.load(record).map_err(|err| match err {
            // An unreadable cloud means the sample cannot be resolved
            Error::Io(io) => Error::SampleResolution(format!("{}: {}", key, io)),
            other => other,
        })?;
        if cloud.is_empty() {
            return Err(Error::SampleResolution(format!("{}: empty point cloud", key)));
        }

        let index = SpatialIndex::built(&cloud);
        if !cloud.has_normals() {
            estimate_normals_with_index(&mut cloud, &index, self.config.normal_estimation_neighbors)?;
        }

        let prepared = Arc::new(PreparedCloud { cloud, index });
        self.cache.insert(key, Arc::clone(&prepared));
        Ok(prepared)
    }

    /// Draw up to `num_patches` reference indices without replacement from
    /// the points whose normal estimation succeeded
    fn select_references(&self, sample_id: usize, cloud: &PointCloud) -> Result<Vec<usize>> {
        let valid: Vec<usize> = (0..cloud.len())
            .filter(|&i| {
                cloud
                    .normal(i)
                    .map_or(false, |n| n.norm() > DEGENERATE_NORMAL_LENGTH)
            })
            .collect();
        if valid.is_empty() {
            return Err(Error::InvalidData(
                "no points with valid normals to use as references".to_string(),
            ));
        }

        let count = self.config.num_patches.min(valid.len());
        let mut rng = StdRng::seed_from_u64(self.reference_seed(sample_id));
        let picked = rand::seq::index::sample(&mut rng, valid.len(), count);
        Ok(picked.into_iter().map(|i| valid[i]).collect())
    }

    fn reference_seed(&self, sample_id: usize) -> u64 {
        match self.config.random_seed {
            Some(seed) => seed ^ (sample_id as u64).wrapping_mul(SEED_MIX),
            None => rand::random(),
        }
    }

    fn patch_seed(&self, sample_id: usize) -> u64 {
        match self.config.random_seed {
            Some(seed) => seed.wrapping_add(1) ^ (sample_id as u64).wrapping_mul(SEED_MIX),
            None => rand::random(),
        }
    }
}

//! Patch extraction configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the patch extraction pipeline.
///
/// The defaults match the reference domain: patches of 1024 points sampled
/// within a 0.3 unit radius, 32 patches per point cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchConfig {
    /// Neighbor search radius around each reference point
    pub vicinity_radius: f32,
    /// Fixed number of neighbors per patch
    pub num_points_per_patch: usize,
    /// Number of reference points (patches) drawn per point cloud
    pub num_patches: usize,
    /// Neighbor count used for the local plane fit during normal estimation
    pub normal_estimation_neighbors: usize,
    /// Base seed for all sampling; `None` draws fresh randomness per call
    pub random_seed: Option<u64>,
    /// Substitute sample 0 when an on-the-fly load fails, instead of raising
    pub on_the_fly_fallback_enabled: bool,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            vicinity_radius: 0.3,
            num_points_per_patch: 1024,
            num_patches: 32,
            normal_estimation_neighbors: 30,
            random_seed: None,
            on_the_fly_fallback_enabled: true,
        }
    }
}

impl PatchConfig {
    pub fn with_vicinity_radius(mut self, radius: f32) -> Self {
        self.vicinity_radius = radius;
        self
    }

    pub fn with_num_points_per_patch(mut self, count: usize) -> Self {
        self.num_points_per_patch = count;
        self
    }

    pub fn with_num_patches(mut self, count: usize) -> Self {
        self.num_patches = count;
        self
    }

    pub fn with_normal_estimation_neighbors(mut self, count: usize) -> Self {
        self.normal_estimation_neighbors = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.on_the_fly_fallback_enabled = enabled;
        self
    }

    /// Check that the configuration describes a usable pipeline
    pub fn validate(&self) -> Result<()> {
        if !self.vicinity_radius.is_finite() || self.vicinity_radius <= 0.0 {
            return Err(Error::InvalidData(
                "vicinity_radius must be positive and finite".to_string(),
            ));
        }
        if self.num_points_per_patch == 0 {
            return Err(Error::InvalidData(
                "num_points_per_patch must be positive".to_string(),
            ));
        }
        if self.num_patches == 0 {
            return Err(Error::InvalidData(
                "num_patches must be positive".to_string(),
            ));
        }
        if self.normal_estimation_neighbors < 3 {
            return Err(Error::InvalidData(
                "normal_estimation_neighbors must be at least 3 for a plane fit".to_string(),
            ));
        }
        Ok(())
    }
}

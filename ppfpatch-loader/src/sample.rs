//! Sample records and the cloud source seam

use ppfpatch_core::{PointCloud, Result};
use serde::{Deserialize, Serialize};

/// Identifies one (scene, sequence, frame) unit of a multi-scene dataset.
///
/// Each record maps to exactly one on-disk point cloud. Records are created
/// when the dataset index is built and are immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRecord {
    pub scene: String,
    pub sequence: String,
    pub frame: String,
}

impl SampleRecord {
    pub fn new(
        scene: impl Into<String>,
        sequence: impl Into<String>,
        frame: impl Into<String>,
    ) -> Self {
        Self {
            scene: scene.into(),
            sequence: sequence.into(),
            frame: frame.into(),
        }
    }

    /// The `scene/sequence/frame` key used for logging and cache lookups
    pub fn sample_key(&self) -> String {
        format!("{}/{}/{}", self.scene, self.sequence, self.frame)
    }
}

/// Source of point clouds, implemented by the I/O layer.
///
/// The loader only needs this one operation; how clouds are stored and
/// parsed is out of scope for this crate. Tests use in-memory sources.
pub trait CloudSource {
    /// Load the point cloud for one sample record
    fn load(&self, record: &SampleRecord) -> Result<PointCloud>;
}

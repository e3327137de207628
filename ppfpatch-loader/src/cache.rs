//! Bounded cache of prepared point clouds

use ppfpatch_algorithms::spatial::SpatialIndex;
use ppfpatch_core::PointCloud;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// A point cloud that is ready for patch extraction: normals populated and
/// spatial index built. Both are immutable once prepared, so entries can be
/// shared freely.
pub struct PreparedCloud {
    pub cloud: PointCloud,
    pub index: SpatialIndex,
}

/// Bounded LRU cache of prepared clouds, keyed by sample key.
///
/// Preparing a cloud (index build plus normal estimation) dominates the cost
/// of a `get` call, so repeated access to the same scene should reuse the
/// prepared state instead of rebuilding it per sample. The cache is an
/// explicit object injected into the loader rather than ambient process
/// state. A capacity of zero disables caching entirely.
pub struct CloudCache {
    capacity: usize,
    entries: HashMap<String, Arc<PreparedCloud>>,
    // Least recently used key at the front. Capacities are small, so the
    // linear recency scan is fine.
    recency: VecDeque<String>,
}

impl CloudCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            recency: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a prepared cloud, marking it most recently used
    pub fn get(&mut self, key: &str) -> Option<Arc<PreparedCloud>> {
        let hit = self.entries.get(key).cloned()?;
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            self.recency.remove(pos);
        }
        self.recency.push_back(key.to_string());
        Some(hit)
    }

    /// Insert a prepared cloud, evicting the least recently used entry when
    /// the cache is full
    pub fn insert(&mut self, key: String, value: Arc<PreparedCloud>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.contains_key(&key) {
            if let Some(pos) = self.recency.iter().position(|k| *k == key) {
                self.recency.remove(pos);
            }
        } else if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.recency.pop_front() {
                self.entries.remove(&evicted);
            }
        }
        self.entries.insert(key.clone(), value);
        self.recency.push_back(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppfpatch_core::Point3f;

    fn prepared(x: f32) -> Arc<PreparedCloud> {
        let cloud = PointCloud::from_points(vec![Point3f::new(x, 0.0, 0.0)]);
        let index = SpatialIndex::built(&cloud);
        Arc::new(PreparedCloud { cloud, index })
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = CloudCache::new(2);
        cache.insert("a".to_string(), prepared(1.0));
        cache.insert("b".to_string(), prepared(2.0));
        cache.insert("c".to_string(), prepared(3.0));

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_get_refreshes_recency() {
        let mut cache = CloudCache::new(2);
        cache.insert("a".to_string(), prepared(1.0));
        cache.insert("b".to_string(), prepared(2.0));
        // Touch "a" so "b" becomes the eviction candidate
        assert!(cache.get("a").is_some());
        cache.insert("c".to_string(), prepared(3.0));

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn test_reinsert_updates_value_without_growth() {
        let mut cache = CloudCache::new(2);
        cache.insert("a".to_string(), prepared(1.0));
        cache.insert("a".to_string(), prepared(9.0));
        assert_eq!(cache.len(), 1);
        let hit = cache.get("a").unwrap();
        assert_eq!(hit.cloud[0].x, 9.0);
    }

    #[test]
    fn test_zero_capacity_disables_caching() {
        let mut cache = CloudCache::new(0);
        cache.insert("a".to_string(), prepared(1.0));
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }
}

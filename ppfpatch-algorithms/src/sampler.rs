//! Fixed-cardinality neighbor sampling
//!
//! Batched tensor processing needs every patch to have the same number of
//! points regardless of local density, so the candidate set from a radius
//! query is resampled to a fixed count: thinned without replacement when the
//! neighborhood is dense, padded with replacement when it is sparse.

use crate::spatial::SpatialIndex;
use ppfpatch_core::{Error, Point3f, Result};
use rand::Rng;

/// Sample exactly `target_count` neighbor indices around one reference point.
///
/// Candidates are all indexed points within `vicinity_radius` of
/// `ref_point`, excluding the reference itself. Dense neighborhoods
/// (more candidates than `target_count`) are sampled uniformly without
/// replacement; an exact match returns a permutation of the candidate set;
/// sparse neighborhoods are sampled uniformly with replacement, so repeated
/// indices pad the patch to size. An empty candidate set fails with
/// [`Error::EmptyNeighborhood`].
pub fn sample_neighbors<R: Rng>(
    index: &SpatialIndex,
    ref_index: usize,
    ref_point: &Point3f,
    vicinity_radius: f32,
    target_count: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let mut candidates = index.radius(ref_point, vicinity_radius)?;
    candidates.retain(|&i| i != ref_index);

    if candidates.is_empty() {
        return Err(Error::EmptyNeighborhood { index: ref_index });
    }

    if candidates.len() >= target_count {
        let picked = rand::seq::index::sample(rng, candidates.len(), target_count);
        Ok(picked.into_iter().map(|i| candidates[i]).collect())
    } else {
        Ok((0..target_count)
            .map(|_| candidates[rng.gen_range(0..candidates.len())])
            .collect())
    }
}

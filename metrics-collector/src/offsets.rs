use std::borrow::Cow;
use std::sync::Arc;

use metrics_model::bucket_offsets;
use tracing::trace;

use crate::scale::Scale;

/// Cassandra's estimated histograms use 90 to 165 buckets, so this covers them without regrowth.
pub const DEFAULT_CACHED_BUCKETS: usize = 200;

/// Scaled bucket bounds, precomputed once for a fixed number of buckets.
///
/// The cache never changes after construction, so it can be shared between concurrent collection
/// passes without locking.  A sample with more buckets than the cache holds gets freshly computed
/// bounds that live only for that call.
#[derive(Clone, Debug)]
pub struct BucketOffsets {
    cached: Arc<[f64]>,
    scale: Scale,
}

impl BucketOffsets {
    /// Precomputes scaled bounds for `size` buckets.
    pub fn new(size: usize, scale: Scale) -> BucketOffsets {
        BucketOffsets { cached: scaled_offsets(size, &scale).into(), scale }
    }

    /// Gets bounds covering at least `buckets` buckets.
    pub fn bounds(&self, buckets: usize) -> Cow<'_, [f64]> {
        if buckets <= self.cached.len() {
            Cow::Borrowed(&self.cached[..])
        } else {
            trace!(buckets, cached = self.cached.len(), "computing uncached bucket offsets");
            Cow::Owned(scaled_offsets(buckets, &self.scale))
        }
    }

    /// Precomputes scaled bounds for the default number of buckets.
    pub fn default_with(scale: Scale) -> BucketOffsets {
        BucketOffsets::new(DEFAULT_CACHED_BUCKETS, scale)
    }

    /// Number of buckets covered by the cache.
    pub fn cached_len(&self) -> usize {
        self.cached.len()
    }

    /// Scale applied to every bound.
    pub fn scale(&self) -> &Scale {
        &self.scale
    }
}

impl Default for BucketOffsets {
    fn default() -> Self {
        BucketOffsets::default_with(Scale::identity())
    }
}

fn scaled_offsets(size: usize, scale: &Scale) -> Vec<f64> {
    bucket_offsets(size).into_iter().map(|offset| scale.apply(offset as f64)).collect()
}

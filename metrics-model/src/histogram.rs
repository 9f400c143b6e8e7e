//! Approximations over compact, exponentially bucketed histograms.
//!
//! Sources such as Cassandra's estimated histograms expose only an array of per-bucket counts.
//! The bucket bounds are implied: they start at 1 and grow by roughly 20% per bucket.  The last
//! bucket is an overflow bucket and must be empty for any of the estimates here to be meaningful.
use std::ops::RangeInclusive;

use thiserror::Error as ThisError;

use crate::interval::Interval;
use crate::quantile::Quantile;

/// Errors caused by a bucket array that doesn't have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum HistogramError {
    /// The bucket array was empty.
    #[error("bucket array is empty")]
    Empty,

    /// Samples were recorded in the overflow bucket, so estimates would undercount.
    #[error("histogram overflowed: {count} samples in the last bucket")]
    Overflowed {
        /// Number of samples found in the overflow bucket.
        count: u64,
    },

    /// There were fewer bucket bounds than buckets.
    #[error("{buckets} buckets but only {bounds} bucket bounds")]
    MissingBounds {
        /// Number of buckets.
        buckets: usize,
        /// Number of bounds.
        bounds: usize,
    },
}

/// Generates the implied upper bounds for `size` buckets.
///
/// The series starts at 1 and each bound is the previous one times 1.2, rounded, and bumped by one
/// whenever rounding would repeat the previous bound.  The series is prefix-stable: the first `n`
/// offsets are the same no matter how many are generated.
pub fn bucket_offsets(size: usize) -> Vec<u64> {
    let mut offsets = Vec::with_capacity(size);
    let mut last = 1u64;
    if size > 0 {
        offsets.push(last);
    }

    while offsets.len() < size {
        let mut next = (last as f64 * 1.2).round() as u64;
        if next == last {
            next = next.saturating_add(1);
        }
        offsets.push(next);
        last = next;
    }

    offsets
}

/// Cumulative walk over a histogram, clipped to a visible bound range.
#[derive(Debug, Clone, PartialEq)]
pub struct Cumulative {
    /// Approximate sum: every sample is assumed to sit at its bucket's upper bound.
    pub sum: f64,
    /// Exact number of samples.
    pub count: u64,
    /// Cumulative buckets whose bound fell within the visible range.
    pub buckets: Vec<Interval>,
}

/// A read-only view over bucket counts and their upper bounds.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedHistogram<'a> {
    counts: &'a [u64],
    bounds: &'a [f64],
}

impl<'a> EstimatedHistogram<'a> {
    /// Creates a view over `counts`, using the first `counts.len()` entries of `bounds`.
    ///
    /// Fails if `counts` is empty, if there are fewer bounds than counts, or if the last
    /// (overflow) bucket is not zero.
    pub fn new(
        counts: &'a [u64],
        bounds: &'a [f64],
    ) -> Result<EstimatedHistogram<'a>, HistogramError> {
        let last = match counts.last() {
            Some(last) => *last,
            None => return Err(HistogramError::Empty),
        };

        if bounds.len() < counts.len() {
            return Err(HistogramError::MissingBounds {
                buckets: counts.len(),
                bounds: bounds.len(),
            });
        }

        if last != 0 {
            return Err(HistogramError::Overflowed { count: last });
        }

        Ok(EstimatedHistogram { counts, bounds: &bounds[..counts.len()] })
    }

    /// Gets the per-bucket counts.
    pub fn counts(&self) -> &[u64] {
        self.counts
    }

    /// Gets the bucket upper bounds, one per count.
    pub fn bounds(&self) -> &[f64] {
        self.bounds
    }

    /// Total number of samples across all buckets.
    pub fn total_count(&self) -> u64 {
        self.counts.iter().fold(0u64, |acc, c| acc.saturating_add(*c))
    }

    /// Estimates the value at quantile `q`.
    ///
    /// Returns the bound of the first bucket at which the cumulative count reaches
    /// `ceil(q * total_count)`.  `q` is clamped into `[0, 1]`.  A NaN `q` or an empty histogram
    /// yields NaN.
    pub fn percentile(&self, q: f64) -> f64 {
        let total = self.total_count();
        if total == 0 || q.is_nan() {
            return f64::NAN;
        }

        let target = (q.clamp(0.0, 1.0) * total as f64).ceil() as u64;
        let mut seen = 0u64;
        for (count, bound) in self.counts.iter().zip(self.bounds) {
            seen = seen.saturating_add(*count);
            if seen >= target {
                return *bound;
            }
        }

        // The cumulative count always reaches `total`, which is at least `target`.
        f64::NAN
    }

    /// Walks the buckets, accumulating sum and count, and keeps cumulative buckets whose bound lies
    /// within `visible`.
    pub fn cumulative(&self, visible: &RangeInclusive<f64>) -> Cumulative {
        let mut sum = 0.0;
        let mut count = 0u64;
        let mut buckets = Vec::new();

        for (value, bound) in self.counts.iter().zip(self.bounds) {
            if *value != 0 {
                sum += bound * *value as f64;
                count = count.saturating_add(*value);
            }
            if visible.contains(bound) {
                buckets.push(Interval::new(Quantile::bound(*bound), count as f64));
            }
        }

        Cumulative { sum, count, buckets }
    }
}

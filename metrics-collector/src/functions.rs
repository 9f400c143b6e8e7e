//! The catalog of collector functions.
//!
//! Each function pairs one sample capability with one family shape.  They all walk the group's
//! label sets in order, pull a scalar or a bucket array out of each object, scale it, and wrap it
//! in the canonical model.  Scaling is applied to values for counters and gauges, and to bucket
//! bounds (or quantile estimates) for summaries and histograms; counts are never scaled.
use std::ops::RangeInclusive;
use std::sync::Arc;

use metrics_model::{
    EstimatedHistogram, Family, Histogram, Interval, Labels, MetricFamily, NumericMetric,
    Quantile, Summary, STANDARD_QUANTILES,
};

use crate::common::CollectError;
use crate::group::LabeledGroup;
use crate::offsets::BucketOffsets;
use crate::sample::{HasBuckets, HasCount, HasIntervals, HasValue};
use crate::scale::Scale;

/// Smallest bucket bound exposed by cumulative histograms: 100µs, once scaled to seconds.
pub const DEFAULT_BUCKET_MIN: f64 = 0.0001;

/// Largest bucket bound exposed by cumulative histograms: 60s, once scaled to seconds.
pub const DEFAULT_BUCKET_MAX: f64 = 60.0;

/// Result of converting one labeled group.
pub type CollectResult = Result<Vec<MetricFamily>, CollectError>;

/// Converts a labeled group into metric families.
///
/// Implementations are pure: they only read the group's objects and may run concurrently for
/// different passes over the same objects.
pub trait CollectorFunction<T>: Send + Sync {
    /// Converts `group` into zero or more families.
    fn collect(&self, group: &LabeledGroup<T>) -> CollectResult;
}

impl<T, F> CollectorFunction<T> for F
where
    F: Fn(&LabeledGroup<T>) -> CollectResult + Send + Sync,
{
    fn collect(&self, group: &LabeledGroup<T>) -> CollectResult {
        self(group)
    }
}

fn numeric_metrics<T, F>(group: &LabeledGroup<T>, scale: &Scale, extract: F) -> Vec<NumericMetric>
where
    F: Fn(&T) -> f64,
{
    group
        .iter()
        .map(|(labels, object)| NumericMetric::new(labels.clone(), scale.apply(extract(object))))
        .collect()
}

fn counter_family<T>(group: &LabeledGroup<T>, metrics: Vec<NumericMetric>) -> Vec<MetricFamily> {
    vec![MetricFamily::Counter(Family::new(group.name(), group.help(), metrics))]
}

fn gauge_family<T>(group: &LabeledGroup<T>, metrics: Vec<NumericMetric>) -> Vec<MetricFamily> {
    vec![MetricFamily::Gauge(Family::new(group.name(), group.help(), metrics))]
}

/// Collects counting objects as a counter family.
pub fn counter_as_counter<T: HasCount>(scale: Scale) -> impl CollectorFunction<T> {
    move |group: &LabeledGroup<T>| -> CollectResult {
        Ok(counter_family(group, numeric_metrics(group, &scale, |c| c.count() as f64)))
    }
}

/// Collects counting objects as a gauge family.
pub fn counter_as_gauge<T: HasCount>(scale: Scale) -> impl CollectorFunction<T> {
    move |group: &LabeledGroup<T>| -> CollectResult {
        Ok(gauge_family(group, numeric_metrics(group, &scale, |c| c.count() as f64)))
    }
}

/// Collects meters as a counter family of their cumulative event counts.
///
/// Rates are derived by the scraper, so the meter's own rates are not exported.
pub fn meter_as_counter<T: HasCount>(scale: Scale) -> impl CollectorFunction<T> {
    move |group: &LabeledGroup<T>| -> CollectResult {
        Ok(counter_family(group, numeric_metrics(group, &scale, |m| m.count() as f64)))
    }
}

/// Collects numeric gauges as a gauge family.
pub fn numeric_gauge_as_gauge<T: HasValue>(scale: Scale) -> impl CollectorFunction<T> {
    move |group: &LabeledGroup<T>| -> CollectResult {
        Ok(gauge_family(group, numeric_metrics(group, &scale, |g| g.value().as_f64())))
    }
}

/// Collects numeric gauges as a counter family.
pub fn numeric_gauge_as_counter<T: HasValue>(scale: Scale) -> impl CollectorFunction<T> {
    move |group: &LabeledGroup<T>| -> CollectResult {
        Ok(counter_family(group, numeric_metrics(group, &scale, |g| g.value().as_f64())))
    }
}

/// Collects objects exposing their own quantile estimates as a summary family.
///
/// Estimates are scaled, the count is passed through, and the sum is NaN since it can't be
/// recovered from the estimates.
pub fn sampling_as_summary<T>(scale: Scale) -> impl CollectorFunction<T>
where
    T: HasIntervals + HasCount,
{
    move |group: &LabeledGroup<T>| -> CollectResult {
        let summaries = group
            .iter()
            .map(|(labels, object)| {
                let quantiles = object
                    .intervals()
                    .iter()
                    .map(|interval| interval.transform(|v| scale.apply(v)))
                    .collect();

                Summary::new(labels.clone(), f64::NAN, object.count() as f64, quantiles)
            })
            .collect();

        Ok(vec![MetricFamily::Summary(Family::new(group.name(), group.help(), summaries))])
    }
}

/// Collects gauges holding a bucketed histogram as a summary family.
///
/// Quantiles are estimated from the buckets.  An empty bucket array has no information at all,
/// so sum, count, and every quantile are NaN.  A non-empty array yields an exact count but the
/// sum is still NaN, since bucket data can only bound it.
///
/// A non-empty array whose overflow bucket is not empty fails the group.
#[derive(Clone, Debug)]
pub struct HistogramGaugeAsSummary {
    offsets: BucketOffsets,
    quantiles: Arc<Vec<Quantile>>,
}

impl HistogramGaugeAsSummary {
    /// Creates the collector with explicit quantiles and offsets.
    ///
    /// The offsets' scale is applied to every estimate.
    pub fn new(quantiles: Vec<Quantile>, offsets: BucketOffsets) -> HistogramGaugeAsSummary {
        HistogramGaugeAsSummary { offsets, quantiles: Arc::new(quantiles) }
    }

    fn summarize(&self, labels: &Labels, counts: &[u64]) -> Result<Summary, CollectError> {
        if counts.is_empty() {
            let quantiles = Interval::as_intervals(self.quantiles.iter(), |_| f64::NAN);
            return Ok(Summary::new(labels.clone(), f64::NAN, f64::NAN, quantiles));
        }

        let bounds = self.offsets.bounds(counts.len());
        let histogram = EstimatedHistogram::new(counts, &bounds)
            .map_err(|source| CollectError::Histogram { labels: labels.clone(), source })?;

        let quantiles =
            Interval::as_intervals(self.quantiles.iter(), |q| histogram.percentile(q.value()));

        Ok(Summary::new(labels.clone(), f64::NAN, histogram.total_count() as f64, quantiles))
    }
}

impl<T: HasBuckets> CollectorFunction<T> for HistogramGaugeAsSummary {
    fn collect(&self, group: &LabeledGroup<T>) -> CollectResult {
        let summaries = group
            .iter()
            .map(|(labels, gauge)| self.summarize(labels, &gauge.bucket_counts()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(vec![MetricFamily::Summary(Family::new(group.name(), group.help(), summaries))])
    }
}

/// Collects histogram-valued gauges as a summary family at the standard quantiles.
pub fn histogram_gauge_as_summary(scale: Scale) -> HistogramGaugeAsSummary {
    HistogramGaugeAsSummary::new(STANDARD_QUANTILES.clone(), BucketOffsets::default_with(scale))
}

/// Collects objects exposing raw bucket counts as a cumulative histogram family.
///
/// Every bucket feeds the sum and count, but only buckets whose scaled bound falls inside the
/// visible range are emitted, which keeps 100+ bucket sources down to a manageable size.
///
/// Bucket arrays must be non-empty and have an empty overflow bucket, or the group fails.
#[derive(Clone, Debug)]
pub struct SamplingAsHistogram {
    offsets: BucketOffsets,
    visible: RangeInclusive<f64>,
}

impl SamplingAsHistogram {
    /// Creates the collector with explicit offsets and visible bucket range.
    pub fn new(offsets: BucketOffsets, visible: RangeInclusive<f64>) -> SamplingAsHistogram {
        SamplingAsHistogram { offsets, visible }
    }

    /// Range of scaled bounds that are emitted as buckets.
    pub fn visible_range(&self) -> &RangeInclusive<f64> {
        &self.visible
    }
}

impl<T: HasBuckets> CollectorFunction<T> for SamplingAsHistogram {
    fn collect(&self, group: &LabeledGroup<T>) -> CollectResult {
        let histograms = group
            .iter()
            .map(|(labels, object)| {
                let counts = object.bucket_counts();
                let bounds = self.offsets.bounds(counts.len());
                let histogram = EstimatedHistogram::new(&counts, &bounds)
                    .map_err(|source| CollectError::Histogram { labels: labels.clone(), source })?;

                let cumulative = histogram.cumulative(&self.visible);
                Ok(Histogram::new(
                    labels.clone(),
                    cumulative.sum,
                    cumulative.count,
                    cumulative.buckets,
                ))
            })
            .collect::<Result<Vec<_>, CollectError>>()?;

        Ok(vec![MetricFamily::Histogram(Family::new(group.name(), group.help(), histograms))])
    }
}

/// Collects objects exposing raw bucket counts as a cumulative histogram family, using the default
/// offset cache and visible range.
pub fn sampling_as_histogram(scale: Scale) -> SamplingAsHistogram {
    SamplingAsHistogram::new(
        BucketOffsets::default_with(scale),
        DEFAULT_BUCKET_MIN..=DEFAULT_BUCKET_MAX,
    )
}

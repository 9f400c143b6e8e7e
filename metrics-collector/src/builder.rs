use std::ops::RangeInclusive;

use metrics_model::{parse_quantiles, Quantile, STANDARD_QUANTILES};

use crate::common::Matcher;
use crate::functions::{
    counter_as_counter, meter_as_counter, numeric_gauge_as_gauge, sampling_as_summary,
    CollectorFunction, HistogramGaugeAsSummary, SamplingAsHistogram, DEFAULT_BUCKET_MAX,
    DEFAULT_BUCKET_MIN,
};
use crate::offsets::{BucketOffsets, DEFAULT_CACHED_BUCKETS};
use crate::registry::{
    BucketsObject, CollectorRegistry, CountingObject, Dispatch, SamplingObject, ValueObject,
};
use crate::scale::Scale;

type Overrides<T> = Vec<(Matcher, Box<dyn CollectorFunction<T>>)>;

/// Builder for creating a [`CollectorRegistry`].
///
/// Every kind of sample gets a default collector function, derived from the quantiles, bucket
/// range and scales set here.  Collector functions for specific metrics can be swapped in with the
/// `set_*_collector` methods.
pub struct CollectorRegistryBuilder {
    quantiles: Vec<Quantile>,
    bucket_range: RangeInclusive<f64>,
    cached_buckets: usize,
    sampling_as_histogram: bool,
    counter_scale: Scale,
    meter_scale: Scale,
    gauge_scale: Scale,
    bucket_scale: Scale,
    counters: Overrides<CountingObject>,
    meters: Overrides<CountingObject>,
    numeric_gauges: Overrides<ValueObject>,
    histogram_gauges: Overrides<BucketsObject>,
    samplings: Overrides<SamplingObject>,
}

impl CollectorRegistryBuilder {
    /// Creates a new [`CollectorRegistryBuilder`].
    pub fn new() -> Self {
        Self {
            quantiles: STANDARD_QUANTILES.clone(),
            bucket_range: DEFAULT_BUCKET_MIN..=DEFAULT_BUCKET_MAX,
            cached_buckets: DEFAULT_CACHED_BUCKETS,
            sampling_as_histogram: false,
            counter_scale: Scale::identity(),
            meter_scale: Scale::identity(),
            gauge_scale: Scale::identity(),
            bucket_scale: Scale::identity(),
            counters: Vec::new(),
            meters: Vec::new(),
            numeric_gauges: Vec::new(),
            histogram_gauges: Vec::new(),
            samplings: Vec::new(),
        }
    }

    /// Sets the quantiles estimated when a histogram-valued gauge is collected as a summary.
    ///
    /// Quantiles represent a scale of 0 to 1, so a quantile of 0.99 is the 99th percentile.  Values
    /// outside that range are clamped, and NaN values are skipped.
    ///
    /// Defaults to 0.5, 0.75, 0.95, 0.98, 0.99 and 0.999.
    pub fn set_quantiles(mut self, quantiles: &[f64]) -> Self {
        self.quantiles = parse_quantiles(quantiles);
        self
    }

    /// Sets the range of bucket bounds emitted when sampling objects are collected as histograms.
    ///
    /// Bounds are compared after scaling.  Buckets outside the range still count towards the sum
    /// and count.
    ///
    /// Defaults to `0.0001..=60.0`.
    pub fn set_bucket_range(mut self, min: f64, max: f64) -> Self {
        self.bucket_range = min..=max;
        self
    }

    /// Sets how many bucket bounds are precomputed.
    ///
    /// Samples with more buckets than this still work, but their bounds are computed on every
    /// collection.
    ///
    /// Defaults to 200.
    pub fn set_cached_bucket_count(mut self, count: usize) -> Self {
        self.cached_buckets = count;
        self
    }

    /// Sets whether sampling objects are collected as cumulative histograms instead of summaries.
    ///
    /// Defaults to `false`.
    pub fn set_sampling_as_histogram(mut self, enabled: bool) -> Self {
        self.sampling_as_histogram = enabled;
        self
    }

    /// Sets the scale applied to counter values by the default counter collector.
    pub fn set_counter_scale(mut self, scale: Scale) -> Self {
        self.counter_scale = scale;
        self
    }

    /// Sets the scale applied to meter counts by the default meter collector.
    pub fn set_meter_scale(mut self, scale: Scale) -> Self {
        self.meter_scale = scale;
        self
    }

    /// Sets the scale applied to numeric gauge values by the default gauge collector.
    pub fn set_gauge_scale(mut self, scale: Scale) -> Self {
        self.gauge_scale = scale;
        self
    }

    /// Sets the scale applied to bucket bounds and quantile estimates.
    ///
    /// This is typically used to convert microsecond timer ticks into seconds, with
    /// [`Scale::micros_to_seconds`].
    pub fn set_bucket_scale(mut self, scale: Scale) -> Self {
        self.bucket_scale = scale;
        self
    }

    /// Sets the collector function for counters whose name matches `matcher`.
    ///
    /// The match pattern can be a full match (equality), prefix match, or suffix match.  The
    /// matchers are applied in that order if two or more matchers would apply to a single metric.
    /// This holds for every `set_*_collector` method.
    pub fn set_counter_collector<F>(mut self, matcher: Matcher, f: F) -> Self
    where
        F: CollectorFunction<CountingObject> + 'static,
    {
        self.counters.push((matcher, Box::new(f)));
        self
    }

    /// Sets the collector function for meters whose name matches `matcher`.
    pub fn set_meter_collector<F>(mut self, matcher: Matcher, f: F) -> Self
    where
        F: CollectorFunction<CountingObject> + 'static,
    {
        self.meters.push((matcher, Box::new(f)));
        self
    }

    /// Sets the collector function for numeric gauges whose name matches `matcher`.
    pub fn set_gauge_collector<F>(mut self, matcher: Matcher, f: F) -> Self
    where
        F: CollectorFunction<ValueObject> + 'static,
    {
        self.numeric_gauges.push((matcher, Box::new(f)));
        self
    }

    /// Sets the collector function for histogram-valued gauges whose name matches `matcher`.
    pub fn set_histogram_gauge_collector<F>(mut self, matcher: Matcher, f: F) -> Self
    where
        F: CollectorFunction<BucketsObject> + 'static,
    {
        self.histogram_gauges.push((matcher, Box::new(f)));
        self
    }

    /// Sets the collector function for sampling objects whose name matches `matcher`.
    pub fn set_sampling_collector<F>(mut self, matcher: Matcher, f: F) -> Self
    where
        F: CollectorFunction<SamplingObject> + 'static,
    {
        self.samplings.push((matcher, Box::new(f)));
        self
    }

    /// Builds the [`CollectorRegistry`].
    pub fn build(self) -> CollectorRegistry {
        let offsets = BucketOffsets::new(self.cached_buckets, self.bucket_scale.clone());

        let samplings: Box<dyn CollectorFunction<SamplingObject>> = if self.sampling_as_histogram {
            Box::new(SamplingAsHistogram::new(offsets.clone(), self.bucket_range))
        } else {
            Box::new(sampling_as_summary::<SamplingObject>(self.bucket_scale))
        };

        CollectorRegistry {
            counters: Dispatch::new(
                Box::new(counter_as_counter::<CountingObject>(self.counter_scale)),
                self.counters,
            ),
            meters: Dispatch::new(
                Box::new(meter_as_counter::<CountingObject>(self.meter_scale)),
                self.meters,
            ),
            numeric_gauges: Dispatch::new(
                Box::new(numeric_gauge_as_gauge::<ValueObject>(self.gauge_scale)),
                self.numeric_gauges,
            ),
            histogram_gauges: Dispatch::new(
                Box::new(HistogramGaugeAsSummary::new(self.quantiles, offsets)),
                self.histogram_gauges,
            ),
            samplings: Dispatch::new(samplings, self.samplings),
        }
    }
}

impl Default for CollectorRegistryBuilder {
    fn default() -> Self {
        CollectorRegistryBuilder::new()
    }
}

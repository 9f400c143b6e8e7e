use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::collection::Collection;
use crate::common::{GroupError, Matcher};
use crate::functions::{CollectResult, CollectorFunction};
use crate::group::LabeledGroup;
use crate::sample::{HasBuckets, HasCount, HasValue, SamplingCounting};

/// A shared counting object, such as a counter or a meter.
pub type CountingObject = Arc<dyn HasCount + Send + Sync>;

/// A shared numeric gauge.
pub type ValueObject = Arc<dyn HasValue + Send + Sync>;

/// A shared gauge whose value is a bucketed histogram.
pub type BucketsObject = Arc<dyn HasBuckets + Send + Sync>;

/// A shared sampling object, such as a timer or a histogram.
pub type SamplingObject = Arc<dyn SamplingCounting + Send + Sync>;

/// Kinds of monitored objects the registry knows how to collect.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum SampleKind {
    /// Monotonic counters.
    Counter,
    /// Rate meters.
    Meter,
    /// Gauges holding a number.
    NumericGauge,
    /// Gauges holding bucketed histogram data.
    HistogramGauge,
    /// Objects that both sample values and count events.
    Sampling,
}

impl SampleKind {
    /// Gets the string form of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleKind::Counter => "counter",
            SampleKind::Meter => "meter",
            SampleKind::NumericGauge => "numeric gauge",
            SampleKind::HistogramGauge => "histogram gauge",
            SampleKind::Sampling => "sampling",
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled group, tagged with the kind of objects it holds.
#[derive(Clone)]
pub enum SampleGroup {
    /// Monotonic counters.
    Counter(LabeledGroup<CountingObject>),
    /// Rate meters.
    Meter(LabeledGroup<CountingObject>),
    /// Gauges holding a number.
    NumericGauge(LabeledGroup<ValueObject>),
    /// Gauges holding bucketed histogram data.
    HistogramGauge(LabeledGroup<BucketsObject>),
    /// Objects that both sample values and count events.
    Sampling(LabeledGroup<SamplingObject>),
}

impl SampleGroup {
    /// Kind of objects held by the group.
    pub fn kind(&self) -> SampleKind {
        match self {
            SampleGroup::Counter(_) => SampleKind::Counter,
            SampleGroup::Meter(_) => SampleKind::Meter,
            SampleGroup::NumericGauge(_) => SampleKind::NumericGauge,
            SampleGroup::HistogramGauge(_) => SampleKind::HistogramGauge,
            SampleGroup::Sampling(_) => SampleKind::Sampling,
        }
    }

    /// Metric name of the group.
    pub fn name(&self) -> &str {
        match self {
            SampleGroup::Counter(g) | SampleGroup::Meter(g) => g.name(),
            SampleGroup::NumericGauge(g) => g.name(),
            SampleGroup::HistogramGauge(g) => g.name(),
            SampleGroup::Sampling(g) => g.name(),
        }
    }

    /// Number of objects in the group.
    pub fn len(&self) -> usize {
        match self {
            SampleGroup::Counter(g) | SampleGroup::Meter(g) => g.len(),
            SampleGroup::NumericGauge(g) => g.len(),
            SampleGroup::HistogramGauge(g) => g.len(),
            SampleGroup::Sampling(g) => g.len(),
        }
    }

    /// Whether the group holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SampleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleGroup")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .field("len", &self.len())
            .finish()
    }
}

/// Collector functions for one kind: a default, plus overrides chosen by metric name.
pub(crate) struct Dispatch<T> {
    default: Box<dyn CollectorFunction<T>>,
    overrides: Vec<(Matcher, Box<dyn CollectorFunction<T>>)>,
}

impl<T> Dispatch<T> {
    pub(crate) fn new(
        default: Box<dyn CollectorFunction<T>>,
        mut overrides: Vec<(Matcher, Box<dyn CollectorFunction<T>>)>,
    ) -> Dispatch<T> {
        // Full matches win over prefixes, which win over suffixes.
        overrides.sort_by(|a, b| a.0.cmp(&b.0));
        Dispatch { default, overrides }
    }

    fn select(&self, name: &str) -> &dyn CollectorFunction<T> {
        self.overrides
            .iter()
            .find(|(matcher, _)| matcher.matches(name))
            .map(|(_, f)| f.as_ref())
            .unwrap_or_else(|| self.default.as_ref())
    }

    fn collect(&self, group: &LabeledGroup<T>) -> CollectResult {
        self.select(group.name()).collect(group)
    }
}

/// Maps each kind of monitored object to the collector functions that convert it.
///
/// Built once, at startup, via [`CollectorRegistryBuilder`](crate::CollectorRegistryBuilder), and
/// immutable afterwards, so one registry can serve any number of concurrent collection passes.
pub struct CollectorRegistry {
    pub(crate) counters: Dispatch<CountingObject>,
    pub(crate) meters: Dispatch<CountingObject>,
    pub(crate) numeric_gauges: Dispatch<ValueObject>,
    pub(crate) histogram_gauges: Dispatch<BucketsObject>,
    pub(crate) samplings: Dispatch<SamplingObject>,
}

impl CollectorRegistry {
    /// Converts a single group with the collector function registered for it.
    pub fn collect_group(&self, group: &SampleGroup) -> CollectResult {
        match group {
            SampleGroup::Counter(g) => self.counters.collect(g),
            SampleGroup::Meter(g) => self.meters.collect(g),
            SampleGroup::NumericGauge(g) => self.numeric_gauges.collect(g),
            SampleGroup::HistogramGauge(g) => self.histogram_gauges.collect(g),
            SampleGroup::Sampling(g) => self.samplings.collect(g),
        }
    }

    /// Runs a collection pass over `groups`.
    ///
    /// A group that fails to convert is logged, recorded in [`Collection::errors`], and skipped;
    /// every other group still contributes its families, in input order.
    pub fn collect<'a, I>(&self, groups: I) -> Collection
    where
        I: IntoIterator<Item = &'a SampleGroup>,
    {
        let mut collection = Collection::default();

        for group in groups {
            match self.collect_group(group) {
                Ok(families) => collection.families.extend(families),
                Err(source) => {
                    warn!(
                        metric = group.name(),
                        kind = %group.kind(),
                        error = %source,
                        "failed to collect metric group"
                    );
                    collection.errors.push(GroupError {
                        name: group.name().to_string(),
                        kind: group.kind(),
                        source,
                    });
                }
            }
        }

        debug!(
            families = collection.families.len(),
            errors = collection.errors.len(),
            "collection pass complete"
        );

        collection
    }
}

impl fmt::Debug for CollectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorRegistry")
            .field("counter_overrides", &self.counters.overrides.len())
            .field("meter_overrides", &self.meters.overrides.len())
            .field("numeric_gauge_overrides", &self.numeric_gauges.overrides.len())
            .field("histogram_gauge_overrides", &self.histogram_gauges.overrides.len())
            .field("sampling_overrides", &self.samplings.overrides.len())
            .finish()
    }
}

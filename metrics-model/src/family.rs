//! Canonical, format-agnostic metric families.
use crate::interval::Interval;
use crate::labels::Labels;

/// A single numeric value under a label set, as held by counter and gauge families.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericMetric {
    /// Labels identifying this metric within its family.
    pub labels: Labels,
    /// Current value.
    pub value: f64,
}

impl NumericMetric {
    /// Creates a new [`NumericMetric`].
    pub fn new(labels: Labels, value: f64) -> NumericMetric {
        NumericMetric { labels, value }
    }
}

/// A summary under a label set.
///
/// `sum` and `count` are NaN when the source can't provide them exactly.  A count of zero is a
/// real observation and is never used to mean "unknown".
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Labels identifying this summary within its family.
    pub labels: Labels,
    /// Sum of all observed values, or NaN.
    pub sum: f64,
    /// Number of observed values, or NaN.
    pub count: f64,
    /// Estimated values at each quantile, in quantile order.
    pub quantiles: Vec<Interval>,
}

impl Summary {
    /// Creates a new [`Summary`].
    pub fn new(labels: Labels, sum: f64, count: f64, quantiles: Vec<Interval>) -> Summary {
        Summary { labels, sum, count, quantiles }
    }
}

/// A cumulative histogram under a label set.
///
/// Each bucket's value counts the samples at or below its bound, so bucket values never decrease.
/// Buckets outside the exporter's visible range are left out, but their samples are still part of
/// `sum` and `count`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Labels identifying this histogram within its family.
    pub labels: Labels,
    /// Sum of all observed values.
    pub sum: f64,
    /// Number of observed values.
    pub count: u64,
    /// Cumulative buckets, in ascending bound order.
    pub buckets: Vec<Interval>,
}

impl Histogram {
    /// Creates a new [`Histogram`].
    pub fn new(labels: Labels, sum: f64, count: u64, buckets: Vec<Interval>) -> Histogram {
        Histogram { labels, sum, count, buckets }
    }
}

/// A named, described collection of metrics of one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Family<M> {
    /// Metric name.
    pub name: String,
    /// Help text.
    pub help: String,
    /// Metrics, one per label set.
    pub metrics: Vec<M>,
}

impl<M> Family<M> {
    /// Creates a new [`Family`].
    pub fn new<N, H>(name: N, help: H, metrics: Vec<M>) -> Family<M>
    where
        N: Into<String>,
        H: Into<String>,
    {
        Family { name: name.into(), help: help.into(), metrics }
    }
}

/// A metric family, tagged with its shape.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricFamily {
    /// Monotonically increasing values.
    Counter(Family<NumericMetric>),
    /// Values that may go up or down.
    Gauge(Family<NumericMetric>),
    /// Quantile estimates with sum and count.
    Summary(Family<Summary>),
    /// Cumulative buckets with sum and count.
    Histogram(Family<Histogram>),
}

impl MetricFamily {
    /// Name of the family.
    pub fn name(&self) -> &str {
        match self {
            MetricFamily::Counter(f) | MetricFamily::Gauge(f) => &f.name,
            MetricFamily::Summary(f) => &f.name,
            MetricFamily::Histogram(f) => &f.name,
        }
    }

    /// Help text of the family.
    pub fn help(&self) -> &str {
        match self {
            MetricFamily::Counter(f) | MetricFamily::Gauge(f) => &f.help,
            MetricFamily::Summary(f) => &f.help,
            MetricFamily::Histogram(f) => &f.help,
        }
    }

    /// Type name used by the exposition formats.
    pub fn type_name(&self) -> &'static str {
        match self {
            MetricFamily::Counter(_) => "counter",
            MetricFamily::Gauge(_) => "gauge",
            MetricFamily::Summary(_) => "summary",
            MetricFamily::Histogram(_) => "histogram",
        }
    }

    /// Number of metrics in the family.
    pub fn len(&self) -> usize {
        match self {
            MetricFamily::Counter(f) | MetricFamily::Gauge(f) => f.metrics.len(),
            MetricFamily::Summary(f) => f.metrics.len(),
            MetricFamily::Histogram(f) => f.metrics.len(),
        }
    }

    /// Whether the family holds no metrics.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the label sets of every metric in the family.
    pub fn labels(&self) -> Box<dyn Iterator<Item = &Labels> + '_> {
        match self {
            MetricFamily::Counter(f) | MetricFamily::Gauge(f) => {
                Box::new(f.metrics.iter().map(|m| &m.labels))
            }
            MetricFamily::Summary(f) => Box::new(f.metrics.iter().map(|m| &m.labels)),
            MetricFamily::Histogram(f) => Box::new(f.metrics.iter().map(|m| &m.labels)),
        }
    }
}

use metrics_model::{HistogramError, Labels, LabelsError};
use thiserror::Error as ThisError;

use crate::registry::SampleKind;

/// Matches a metric name in a specific way.
///
/// Used for picking a collector function other than the default for specific metrics.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Matcher {
    /// Matches the entire metric name.
    Full(String),
    /// Matches the beginning of the metric name.
    Prefix(String),
    /// Matches the end of the metric name.
    Suffix(String),
}

impl Matcher {
    /// Checks if the given name matches this matcher.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Matcher::Prefix(prefix) => name.starts_with(prefix),
            Matcher::Suffix(suffix) => name.ends_with(suffix),
            Matcher::Full(full) => name == full,
        }
    }
}

/// Errors raised while converting one labeled group.
#[derive(Debug, ThisError)]
pub enum CollectError {
    /// A sample's bucket array did not have the shape the collector function needs.
    #[error("invalid bucket data for {labels:?}: {source}")]
    Histogram {
        /// Labels of the offending sample.
        labels: Labels,
        /// What was wrong with the buckets.
        #[source]
        source: HistogramError,
    },
}

/// A [`CollectError`] along with the group it came from.
#[derive(Debug, ThisError)]
#[error("failed to collect {kind} group `{name}`: {source}")]
pub struct GroupError {
    /// Name of the failed group.
    pub name: String,
    /// Kind of samples the group held.
    pub kind: SampleKind,
    /// Underlying failure.
    #[source]
    pub source: CollectError,
}

/// Errors raised while rendering metric families.
#[derive(Debug, ThisError)]
pub enum ExpositionError {
    /// A label set could not be encoded.
    #[error(transparent)]
    Labels(#[from] LabelsError),

    /// JSON output could not be written.
    #[error("failed to write json: {0}")]
    Json(#[from] serde_json::Error),
}

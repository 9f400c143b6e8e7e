//! Canonical metric families and the numeric helpers used to build them.
//!
//! This crate holds the format-agnostic model that exposition encoders consume: label sets with
//! cached encodings, the four family shapes (counter, gauge, summary, histogram), and the
//! approximations that turn compact bucketed histograms into quantiles or cumulative buckets.
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod family;
pub use family::{Family, Histogram, MetricFamily, NumericMetric, Summary};

pub mod formatting;

pub mod histogram;
pub use histogram::{bucket_offsets, Cumulative, EstimatedHistogram, HistogramError};

mod interval;
pub use interval::Interval;

mod labels;
pub use labels::{LabelFormat, Labels, LabelsError};

mod quantile;
pub use quantile::{parse_quantiles, render_value, Quantile, STANDARD_QUANTILES};

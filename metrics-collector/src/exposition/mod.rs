//! Exposition encoders for collected metric families.
//!
//! Both encoders read label text straight out of each label set's encoding cache, so a label set
//! shared by many families is only serialized once per format until its cache is released.
//!
//! Family names are sanitized the same way in both formats, so one pass exposes the same names
//! whichever format is requested.
use bytes::Bytes;
use metrics_model::MetricFamily;

use crate::common::ExpositionError;

mod json;
mod text;

pub use self::text::{write_help_line, write_metric_line, write_type_line};

/// Content type of the text exposition format.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Content type of the JSON exposition format.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Wire formats that metric families can be rendered in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ExpositionFormat {
    /// The Prometheus text format, version 0.0.4.
    Text,
    /// A JSON object keyed by family name.
    Json,
}

impl ExpositionFormat {
    /// Content type to advertise for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExpositionFormat::Text => TEXT_CONTENT_TYPE,
            ExpositionFormat::Json => JSON_CONTENT_TYPE,
        }
    }
}

/// Renders `families` in the given format.
///
/// Rendering the same families twice yields identical bytes.
pub fn render(
    families: &[MetricFamily],
    format: ExpositionFormat,
) -> Result<Bytes, ExpositionError> {
    match format {
        ExpositionFormat::Text => text::render(families),
        ExpositionFormat::Json => json::render(families),
    }
}

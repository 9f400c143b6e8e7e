use bytes::Bytes;
use metrics_model::MetricFamily;

use crate::common::{ExpositionError, GroupError};
use crate::exposition::{render, ExpositionFormat};

/// The outcome of one collection pass.
///
/// Holds every family that was produced, in the order of the groups they came from, along with
/// an error for each group that could not be converted.  A failed group simply has no families.
#[derive(Debug, Default)]
pub struct Collection {
    pub(crate) families: Vec<MetricFamily>,
    pub(crate) errors: Vec<GroupError>,
}

impl Collection {
    /// Families produced by the pass.
    pub fn families(&self) -> &[MetricFamily] {
        &self.families
    }

    /// Errors for the groups that failed.
    pub fn errors(&self) -> &[GroupError] {
        &self.errors
    }

    /// Whether every group converted successfully.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consumes the collection, returning families and errors.
    pub fn into_parts(self) -> (Vec<MetricFamily>, Vec<GroupError>) {
        (self.families, self.errors)
    }

    /// Renders the families in the given format.
    pub fn render(&self, format: ExpositionFormat) -> Result<Bytes, ExpositionError> {
        render(&self.families, format)
    }

    /// Drops the cached encodings of every label set in the collection.
    ///
    /// Label sets are often shared between passes, so this is left to the caller, typically right
    /// after the pass has been rendered.
    pub fn release_label_caches(&self) {
        for family in &self.families {
            for labels in family.labels() {
                labels.release();
            }
        }
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use thiserror::Error as ThisError;

use crate::formatting::write_text_labels;

/// Serialized forms a [`Labels`] set can be encoded into.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LabelFormat {
    /// `key="value"` pairs separated by commas, without braces, as used inside the text format.
    PlainText,
    /// A JSON object mapping label names to values.
    Json,
}

impl LabelFormat {
    fn as_str(&self) -> &'static str {
        match self {
            LabelFormat::PlainText => "plain text",
            LabelFormat::Json => "json",
        }
    }
}

/// Errors produced while encoding a label set.
#[derive(Debug, ThisError)]
pub enum LabelsError {
    /// The JSON serializer rejected the label set.
    #[error("failed to encode labels as {}: {source}", format.as_str())]
    Encode {
        /// Format that was being produced.
        format: LabelFormat,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },
}

/// An immutable set of label name/value pairs.
///
/// Pairs are held in key order, so two equal sets always serialize to identical bytes regardless
/// of the order they were built in.  Equality and hashing only consider the pairs.
///
/// `Labels` is cheap to clone: clones share the pairs and the encoding cache.  Each format is
/// encoded lazily on first request and the result is kept until [`release`][Labels::release] is
/// called or the last clone is dropped.  Concurrent first use from several threads may compute an
/// encoding more than once, but only one result is ever retained and handed out.
#[derive(Clone, Default)]
pub struct Labels(Arc<Inner>);

#[derive(Default)]
struct Inner {
    pairs: BTreeMap<String, String>,
    plain_text: RwLock<Option<Bytes>>,
    json: RwLock<Option<Bytes>>,
}

impl Labels {
    /// Creates a [`Labels`] from key/value pairs.
    ///
    /// When a key is repeated, the last value wins.
    pub fn new<I, K, V>(pairs: I) -> Labels
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs = pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Labels(Arc::new(Inner { pairs, ..Default::default() }))
    }

    /// Creates a [`Labels`] holding a single pair.
    pub fn of<K, V>(key: K, value: V) -> Labels
    where
        K: Into<String>,
        V: Into<String>,
    {
        Labels::new([(key, value)])
    }

    /// Creates an empty [`Labels`].
    pub fn empty() -> Labels {
        Labels::default()
    }

    /// Gets the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.pairs.get(key).map(String::as_str)
    }

    /// Number of pairs in the set.
    pub fn len(&self) -> usize {
        self.0.pairs.len()
    }

    /// Whether the set has no pairs.
    pub fn is_empty(&self) -> bool {
        self.0.pairs.is_empty()
    }

    /// Iterates the pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the encoding of this set in the given format.
    ///
    /// The first call per format computes the encoding; later calls hand back the same buffer
    /// until [`release`][Labels::release] drops it.
    pub fn encode(&self, format: LabelFormat) -> Result<Bytes, LabelsError> {
        let cell = self.cell(format);
        if let Some(encoded) = cell.read().as_ref() {
            return Ok(encoded.clone());
        }

        let computed = self.compute(format)?;

        let mut slot = cell.write();
        match slot.as_ref() {
            // Another thread won the race; hand out its buffer so there is only ever one.
            Some(existing) => Ok(existing.clone()),
            None => {
                *slot = Some(computed.clone());
                Ok(computed)
            }
        }
    }

    /// Whether an encoding for `format` is currently cached.
    pub fn is_encoded(&self, format: LabelFormat) -> bool {
        self.cell(format).read().is_some()
    }

    /// Drops every cached encoding held by this set and its clones.
    ///
    /// Buffers already handed out stay valid; the next [`encode`][Labels::encode] recomputes.
    pub fn release(&self) {
        self.0.plain_text.write().take();
        self.0.json.write().take();
    }

    fn cell(&self, format: LabelFormat) -> &RwLock<Option<Bytes>> {
        match format {
            LabelFormat::PlainText => &self.0.plain_text,
            LabelFormat::Json => &self.0.json,
        }
    }

    fn compute(&self, format: LabelFormat) -> Result<Bytes, LabelsError> {
        match format {
            LabelFormat::PlainText => {
                let mut buffer = String::new();
                write_text_labels(&mut buffer, self.iter());
                Ok(Bytes::from(buffer))
            }
            LabelFormat::Json => serde_json::to_vec(&self.0.pairs)
                .map(Bytes::from)
                .map_err(|source| LabelsError::Encode { format, source }),
        }
    }
}

impl PartialEq for Labels {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.pairs == other.0.pairs
    }
}

impl Eq for Labels {}

impl Hash for Labels {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.pairs.hash(state);
    }
}

impl fmt::Debug for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.pairs.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Labels
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Labels::new(iter)
    }
}

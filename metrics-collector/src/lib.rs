//! Converts monitored samples into canonical metric families, and renders them for scraping.
//!
//! A process hands over its monitored objects as [`LabeledGroup`]s, one per metric name, each
//! tagged with the kind of object it holds via [`SampleGroup`].  A [`CollectorRegistry`] maps every
//! kind to a collector function, which reads a sample from each object and builds a counter,
//! gauge, summary or histogram family out of it.  The families of one pass land in a
//! [`Collection`], ready to be rendered in the text or JSON [exposition format][ExpositionFormat].
//!
//! A group that cannot be converted, such as a histogram whose overflow bucket is not empty, is
//! dropped from its pass and reported in [`Collection::errors`]; every other group is unaffected.
//!
//! ```
//! use std::sync::Arc;
//!
//! use metrics_collector::{
//!     CollectorRegistryBuilder, CountingObject, ExpositionFormat, LabeledGroup, SampleGroup,
//! };
//! use metrics_model::Labels;
//!
//! let a: CountingObject = Arc::new(5u64);
//! let b: CountingObject = Arc::new(12u64);
//! let reads = LabeledGroup::new("reads_total", "Number of reads.")
//!     .with(Labels::of("host", "a"), a)
//!     .with(Labels::of("host", "b"), b);
//!
//! let registry = CollectorRegistryBuilder::new().build();
//! let collection = registry.collect(&[SampleGroup::Counter(reads)]);
//! assert!(collection.is_complete());
//!
//! let output = collection.render(ExpositionFormat::Text).unwrap();
//! let expected = concat!(
//!     "# HELP reads_total Number of reads.\n",
//!     "# TYPE reads_total counter\n",
//!     "reads_total{host=\"a\"} 5\n",
//!     "reads_total{host=\"b\"} 12\n",
//! );
//! assert_eq!(&output[..], expected.as_bytes());
//! collection.release_label_caches();
//! ```
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
pub use self::builder::CollectorRegistryBuilder;

mod collection;
pub use self::collection::Collection;

mod common;
pub use self::common::{CollectError, ExpositionError, GroupError, Matcher};

pub mod exposition;
pub use self::exposition::ExpositionFormat;

pub mod functions;
pub use self::functions::{CollectResult, CollectorFunction};

mod group;
pub use self::group::LabeledGroup;

mod offsets;
pub use self::offsets::{BucketOffsets, DEFAULT_CACHED_BUCKETS};

mod registry;
pub use self::registry::{
    BucketsObject, CollectorRegistry, CountingObject, SampleGroup, SampleKind, SamplingObject,
    ValueObject,
};

mod sample;
pub use self::sample::{
    HasBuckets, HasCount, HasIntervals, HasValue, Number, SamplingCounting, SamplingSnapshot,
};

mod scale;
pub use self::scale::Scale;

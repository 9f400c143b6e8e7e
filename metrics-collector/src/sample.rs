//! Capabilities a monitored object can expose.
//!
//! Each collector function asks for the narrowest capability it needs, so a source only has to
//! implement what it actually supports.  Implementations must only read: the same object can be
//! collected by several passes at once.
use std::borrow::Cow;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use metrics_model::Interval;

/// A numeric value of any primitive representation, as held by a gauge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    /// A signed integer.
    Signed(i64),
    /// An unsigned integer.
    Unsigned(u64),
    /// A floating-point value.
    Float(f64),
}

impl Number {
    /// Normalizes the value to a float.
    ///
    /// Integers beyond 2^53 lose precision.
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Signed(v) => *v as f64,
            Number::Unsigned(v) => *v as f64,
            Number::Float(v) => *v,
        }
    }
}

macro_rules! number_from {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl From<$t> for Number {
                fn from(value: $t) -> Number {
                    Number::$variant(value as $target)
                }
            }
        )+
    };
}

number_from!(Signed, i64, i8, i16, i32, i64, isize);
number_from!(Unsigned, u64, u8, u16, u32, u64, usize);
number_from!(Float, f64, f32, f64);

/// An object exposing a monotonic event count.
pub trait HasCount {
    /// Gets the current count.
    fn count(&self) -> u64;
}

/// An object exposing a single numeric value.
pub trait HasValue {
    /// Gets the current value.
    fn value(&self) -> Number;
}

/// An object exposing per-bucket sample counts.
///
/// Bucket bounds are implied by position (see [`metrics_model::bucket_offsets`]), and the last
/// bucket is the overflow bucket.
pub trait HasBuckets {
    /// Gets the per-bucket counts.
    fn bucket_counts(&self) -> Cow<'_, [u64]>;
}

/// An object exposing its own quantile estimates.
pub trait HasIntervals {
    /// Gets the estimated value at each of the object's quantiles.
    fn intervals(&self) -> Cow<'_, [Interval]>;
}

/// An object that both samples values and counts events, such as a timer or a histogram.
pub trait SamplingCounting: HasCount + HasIntervals + HasBuckets {}

impl<T> SamplingCounting for T where T: HasCount + HasIntervals + HasBuckets + ?Sized {}

macro_rules! forward_pointers {
    ($trait:ident, $method:ident -> $ret:ty) => {
        impl<T: $trait + ?Sized> $trait for &T {
            fn $method(&self) -> $ret {
                (**self).$method()
            }
        }

        impl<T: $trait + ?Sized> $trait for Box<T> {
            fn $method(&self) -> $ret {
                (**self).$method()
            }
        }

        impl<T: $trait + ?Sized> $trait for Arc<T> {
            fn $method(&self) -> $ret {
                (**self).$method()
            }
        }
    };
}

forward_pointers!(HasCount, count -> u64);
forward_pointers!(HasValue, value -> Number);
forward_pointers!(HasBuckets, bucket_counts -> Cow<'_, [u64]>);
forward_pointers!(HasIntervals, intervals -> Cow<'_, [Interval]>);

impl HasCount for u64 {
    fn count(&self) -> u64 {
        *self
    }
}

impl HasCount for AtomicU64 {
    fn count(&self) -> u64 {
        self.load(Ordering::Relaxed)
    }
}

impl HasValue for Number {
    fn value(&self) -> Number {
        *self
    }
}

impl HasValue for f64 {
    fn value(&self) -> Number {
        Number::Float(*self)
    }
}

impl HasValue for i64 {
    fn value(&self) -> Number {
        Number::Signed(*self)
    }
}

impl HasValue for AtomicI64 {
    fn value(&self) -> Number {
        Number::Signed(self.load(Ordering::Relaxed))
    }
}

impl HasBuckets for Vec<u64> {
    fn bucket_counts(&self) -> Cow<'_, [u64]> {
        Cow::Borrowed(self)
    }
}

impl HasBuckets for [u64] {
    fn bucket_counts(&self) -> Cow<'_, [u64]> {
        Cow::Borrowed(self)
    }
}

/// A point-in-time copy of a sampling object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SamplingSnapshot {
    /// Number of events seen.
    pub count: u64,
    /// Quantile estimates.
    pub intervals: Vec<Interval>,
    /// Per-bucket sample counts.
    pub buckets: Vec<u64>,
}

impl HasCount for SamplingSnapshot {
    fn count(&self) -> u64 {
        self.count
    }
}

impl HasIntervals for SamplingSnapshot {
    fn intervals(&self) -> Cow<'_, [Interval]> {
        Cow::Borrowed(&self.intervals)
    }
}

impl HasBuckets for SamplingSnapshot {
    fn bucket_counts(&self) -> Cow<'_, [u64]> {
        Cow::Borrowed(&self.buckets)
    }
}

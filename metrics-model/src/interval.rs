use crate::quantile::Quantile;

/// A point on a distribution: a quantile (or bucket bound) and the value found there.
///
/// In a [`Summary`](crate::Summary), `quantile` is a rank and `value` the estimated sample value
/// at that rank.  In a [`Histogram`](crate::Histogram), `quantile` is a bucket's upper bound and
/// `value` the cumulative number of samples at or below it.  Which one applies is decided by the
/// family holding the interval, never by the interval itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    /// Rank or bucket bound.
    pub quantile: Quantile,
    /// Estimated value or cumulative count.
    pub value: f64,
}

impl Interval {
    /// Creates a new [`Interval`].
    pub fn new(quantile: Quantile, value: f64) -> Interval {
        Interval { quantile, value }
    }

    /// Returns a copy of this interval with `f` applied to the value.
    pub fn transform<F>(&self, f: F) -> Interval
    where
        F: FnOnce(f64) -> f64,
    {
        Interval { quantile: self.quantile.clone(), value: f(self.value) }
    }

    /// Builds one interval per quantile, estimating each value with `estimate`.
    pub fn as_intervals<'a, I, F>(quantiles: I, mut estimate: F) -> Vec<Interval>
    where
        I: IntoIterator<Item = &'a Quantile>,
        F: FnMut(&Quantile) -> f64,
    {
        quantiles.into_iter().map(|q| Interval::new(q.clone(), estimate(q))).collect()
    }
}

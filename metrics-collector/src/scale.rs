use std::fmt;
use std::sync::Arc;

/// A unit conversion applied to values or bucket bounds before they are exposed.
///
/// The function must be monotonically non-decreasing, or bucket ordering breaks.  It is never
/// applied to counts.
#[derive(Clone, Default)]
pub struct Scale(Option<Arc<dyn Fn(f64) -> f64 + Send + Sync>>);

impl Scale {
    /// The identity scale.
    pub fn identity() -> Scale {
        Scale(None)
    }

    /// Creates a scale from an arbitrary function.
    pub fn new<F>(f: F) -> Scale
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Scale(Some(Arc::new(f)))
    }

    /// Creates a scale that multiplies by a constant factor.
    pub fn factor(factor: f64) -> Scale {
        Scale::new(move |v| v * factor)
    }

    /// Converts microseconds, the unit of most timer ticks, to seconds.
    pub fn micros_to_seconds() -> Scale {
        Scale::factor(1.0e-6)
    }

    /// Converts nanoseconds to seconds.
    pub fn nanos_to_seconds() -> Scale {
        Scale::factor(1.0e-9)
    }

    /// Applies the scale.
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        match &self.0 {
            Some(f) => f(value),
            None => value,
        }
    }

    /// Whether this is the identity scale.
    pub fn is_identity(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Debug for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            f.write_str("Scale(identity)")
        } else {
            f.write_str("Scale(fn)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Scale;
    use approx::assert_relative_eq;

    #[test]
    fn test_scales() {
        assert!(Scale::identity().is_identity());
        assert_eq!(Scale::identity().apply(17.0), 17.0);
        assert!(Scale::identity().apply(f64::NAN).is_nan());

        assert_relative_eq!(Scale::factor(0.001).apply(42.0), 0.042);
        assert_relative_eq!(Scale::micros_to_seconds().apply(250_000.0), 0.25);
        assert_relative_eq!(Scale::nanos_to_seconds().apply(3.0e9), 3.0);
        assert_relative_eq!(Scale::new(|v| v + 1.0).apply(1.0), 2.0);
    }
}

use once_cell::sync::Lazy;

/// Quantiles reported when a bucketed histogram is turned into a summary.
pub static STANDARD_QUANTILES: Lazy<Vec<Quantile>> =
    Lazy::new(|| parse_quantiles(&[0.5, 0.75, 0.95, 0.98, 0.99, 0.999]));

/// A quantile, or a histogram bucket bound, along with its rendered label value.
///
/// Summaries use this to carry the rank being estimated (`0.99`) and histograms reuse it to carry
/// a bucket's upper bound (`0.0025`).  Either way the label text is rendered once, up front, since
/// it gets written out for every label set on every scrape.
///
/// Infinite values render as `+Inf` and `-Inf`, and NaN as `NaN`, matching the text format.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantile(f64, String);

impl Quantile {
    /// Creates a new [`Quantile`] from a rank, clamped between 0.0 and 1.0.
    pub fn new(quantile: f64) -> Quantile {
        let clamped = quantile.clamp(0.0, 1.0);
        Quantile::bound(clamped)
    }

    /// Creates a [`Quantile`] from an arbitrary value, such as a bucket's upper bound.
    ///
    /// Unlike [`new`][Quantile::new], the value is not clamped.
    pub fn bound(value: f64) -> Quantile {
        Quantile(value, render_value(value))
    }

    /// Gets the rendered label value.
    pub fn label(&self) -> &str {
        self.1.as_str()
    }

    /// Gets the raw value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Parses a slice of floating-point values into a vector of [`Quantile`]s.
///
/// NaN values are skipped, as they name no rank.
pub fn parse_quantiles(quantiles: &[f64]) -> Vec<Quantile> {
    quantiles.iter().filter(|f| !f.is_nan()).map(|f| Quantile::new(*f)).collect()
}

/// Renders a float the way the text exposition format expects it.
pub fn render_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

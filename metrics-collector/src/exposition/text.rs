//! Helpers for rendering metrics in the Prometheus [exposition format].
//!
//! [exposition format]: https://github.com/prometheus/docs/blob/main/content/docs/instrumenting/exposition_formats.md#text-format-details
use bytes::{BufMut, Bytes, BytesMut};
use metrics_model::formatting::{escape_help, sanitize_metric_name};
use metrics_model::{render_value, Interval, LabelFormat, MetricFamily};

use crate::common::ExpositionError;

/// Writes a help (description) line.
pub fn write_help_line(buffer: &mut BytesMut, name: &str, help: &str) {
    buffer.put_slice(b"# HELP ");
    buffer.put_slice(name.as_bytes());
    buffer.put_u8(b' ');
    buffer.put_slice(escape_help(help).as_bytes());
    buffer.put_u8(b'\n');
}

/// Writes a metric type line.
pub fn write_type_line(buffer: &mut BytesMut, name: &str, metric_type: &str) {
    buffer.put_slice(b"# TYPE ");
    buffer.put_slice(name.as_bytes());
    buffer.put_u8(b' ');
    buffer.put_slice(metric_type.as_bytes());
    buffer.put_u8(b'\n');
}

/// Writes a metric line.
///
/// When `suffix` is specified, it is appended to the `name`, which is useful for writing the sum
/// or count of a summary or histogram.  Likewise, `additional_label` would typically be used to
/// specify a shape-specific label, such as `le` for histogram buckets or `quantile` for summaries.
///
/// `labels` must already be in the plain-text label encoding.
pub fn write_metric_line(
    buffer: &mut BytesMut,
    name: &str,
    suffix: Option<&'static str>,
    labels: &[u8],
    additional_label: Option<(&'static str, &str)>,
    value: f64,
) {
    buffer.put_slice(name.as_bytes());
    if let Some(suffix) = suffix {
        buffer.put_u8(b'_');
        buffer.put_slice(suffix.as_bytes());
    }

    if !labels.is_empty() || additional_label.is_some() {
        buffer.put_u8(b'{');
        buffer.put_slice(labels);

        if let Some((name, value)) = additional_label {
            if !labels.is_empty() {
                buffer.put_u8(b',');
            }
            buffer.put_slice(name.as_bytes());
            buffer.put_slice(b"=\"");
            buffer.put_slice(value.as_bytes());
            buffer.put_u8(b'"');
        }

        buffer.put_u8(b'}');
    }

    buffer.put_u8(b' ');
    buffer.put_slice(render_value(value).as_bytes());
    buffer.put_u8(b'\n');
}

fn write_intervals(
    buffer: &mut BytesMut,
    name: &str,
    suffix: Option<&'static str>,
    labels: &[u8],
    label: &'static str,
    intervals: &[Interval],
) {
    for interval in intervals {
        let bound = interval.quantile.label();
        write_metric_line(buffer, name, suffix, labels, Some((label, bound)), interval.value);
    }
}

pub(super) fn render(families: &[MetricFamily]) -> Result<Bytes, ExpositionError> {
    let mut buffer = BytesMut::new();

    for (i, family) in families.iter().enumerate() {
        if i > 0 {
            buffer.put_u8(b'\n');
        }

        let name = sanitize_metric_name(family.name());
        if !family.help().is_empty() {
            write_help_line(&mut buffer, &name, family.help());
        }
        write_type_line(&mut buffer, &name, family.type_name());

        match family {
            MetricFamily::Counter(f) | MetricFamily::Gauge(f) => {
                for metric in &f.metrics {
                    let labels = metric.labels.encode(LabelFormat::PlainText)?;
                    write_metric_line(&mut buffer, &name, None, &labels, None, metric.value);
                }
            }
            MetricFamily::Summary(f) => {
                for summary in &f.metrics {
                    let labels = summary.labels.encode(LabelFormat::PlainText)?;
                    let quantiles = &summary.quantiles;
                    write_intervals(&mut buffer, &name, None, &labels, "quantile", quantiles);
                    write_metric_line(&mut buffer, &name, Some("sum"), &labels, None, summary.sum);
                    let count = summary.count;
                    write_metric_line(&mut buffer, &name, Some("count"), &labels, None, count);
                }
            }
            MetricFamily::Histogram(f) => {
                for histogram in &f.metrics {
                    let labels = histogram.labels.encode(LabelFormat::PlainText)?;
                    let (sum, count) = (histogram.sum, histogram.count as f64);
                    let (bucket, inf) = (Some("bucket"), Some(("le", "+Inf")));
                    write_intervals(&mut buffer, &name, bucket, &labels, "le", &histogram.buckets);
                    write_metric_line(&mut buffer, &name, bucket, &labels, inf, count);
                    write_metric_line(&mut buffer, &name, Some("sum"), &labels, None, sum);
                    write_metric_line(&mut buffer, &name, Some("count"), &labels, None, count);
                }
            }
        }
    }

    Ok(buffer.freeze())
}

#[cfg(test)]
mod tests {
    use super::{render, write_metric_line};
    use bytes::BytesMut;
    use metrics_model::{
        Family, Histogram, Interval, Labels, MetricFamily, NumericMetric, Quantile, Summary,
    };

    fn rendered(families: &[MetricFamily]) -> String {
        String::from_utf8(render(families).unwrap().to_vec()).unwrap()
    }

    #[test]
    fn test_write_metric_line() {
        let mut buffer = BytesMut::new();
        write_metric_line(&mut buffer, "basic_metric", None, b"", None, 42.0);
        write_metric_line(&mut buffer, "basic_metric", Some("sum"), b"foo=\"bar\"", None, f64::NAN);
        write_metric_line(
            &mut buffer,
            "basic_metric",
            Some("bucket"),
            b"foo=\"bar\"",
            Some(("le", "0.5")),
            3.0,
        );
        write_metric_line(&mut buffer, "basic_metric", None, b"", Some(("quantile", "0.99")), 1.5);

        let expected = concat!(
            "basic_metric 42\n",
            "basic_metric_sum{foo=\"bar\"} NaN\n",
            "basic_metric_bucket{foo=\"bar\",le=\"0.5\"} 3\n",
            "basic_metric{quantile=\"0.99\"} 1.5\n",
        );
        assert_eq!(&buffer[..], expected.as_bytes());
    }

    #[test]
    fn test_render_gauge_without_help() {
        let families = vec![MetricFamily::Gauge(Family::new(
            "heap.used bytes",
            "",
            vec![NumericMetric::new(Labels::of("pool", "eden \"young\""), f64::INFINITY)],
        ))];

        let expected = concat!(
            "# TYPE heap_used_bytes gauge\n",
            "heap_used_bytes{pool=\"eden \\\"young\\\"\"} +Inf\n",
        );
        assert_eq!(rendered(&families), expected);
    }

    #[test]
    fn test_render_summary_and_histogram() {
        let families = vec![
            MetricFamily::Summary(Family::new(
                "partition_size",
                "Partition sizes.\nIn bytes.",
                vec![Summary::new(
                    Labels::empty(),
                    f64::NAN,
                    5.0,
                    vec![Interval::new(Quantile::new(0.5), 3.0)],
                )],
            )),
            MetricFamily::Histogram(Family::new(
                "latency_seconds",
                "Latency.",
                vec![Histogram::new(
                    Labels::of("op", "read"),
                    39.0,
                    7,
                    vec![
                        Interval::new(Quantile::bound(2.0), 1.0),
                        Interval::new(Quantile::bound(8.0), 7.0),
                    ],
                )],
            )),
        ];

        let expected = concat!(
            "# HELP partition_size Partition sizes.\\nIn bytes.\n",
            "# TYPE partition_size summary\n",
            "partition_size{quantile=\"0.5\"} 3\n",
            "partition_size_sum NaN\n",
            "partition_size_count 5\n",
            "\n",
            "# HELP latency_seconds Latency.\n",
            "# TYPE latency_seconds histogram\n",
            "latency_seconds_bucket{op=\"read\",le=\"2\"} 1\n",
            "latency_seconds_bucket{op=\"read\",le=\"8\"} 7\n",
            "latency_seconds_bucket{op=\"read\",le=\"+Inf\"} 7\n",
            "latency_seconds_sum{op=\"read\"} 39\n",
            "latency_seconds_count{op=\"read\"} 7\n",
        );
        assert_eq!(rendered(&families), expected);
    }

    #[test]
    fn test_render_nothing() {
        assert_eq!(rendered(&[]), "");
    }
}

use bytes::{BufMut, Bytes, BytesMut};
use metrics_model::formatting::sanitize_metric_name;
use metrics_model::{Interval, LabelFormat, Labels, MetricFamily};

use crate::common::ExpositionError;

type Writer = bytes::buf::Writer<BytesMut>;

fn write_str(writer: &mut Writer, value: &str) -> Result<(), ExpositionError> {
    serde_json::to_writer(&mut *writer, value)?;
    Ok(())
}

// Non-finite values come out as `null`.
fn write_number(writer: &mut Writer, value: f64) -> Result<(), ExpositionError> {
    serde_json::to_writer(&mut *writer, &value)?;
    Ok(())
}

fn write_field(writer: &mut Writer, key: &str, value: f64) -> Result<(), ExpositionError> {
    writer.get_mut().put_u8(b',');
    write_str(writer, key)?;
    writer.get_mut().put_u8(b':');
    write_number(writer, value)
}

fn open_metric(writer: &mut Writer, i: usize, labels: &Labels) -> Result<(), ExpositionError> {
    let encoded = labels.encode(LabelFormat::Json)?;
    if i > 0 {
        writer.get_mut().put_u8(b',');
    }
    writer.get_mut().put_slice(b"{\"labels\":");
    writer.get_mut().put_slice(&encoded);
    Ok(())
}

fn write_intervals(
    writer: &mut Writer,
    key: &str,
    intervals: &[Interval],
) -> Result<(), ExpositionError> {
    writer.get_mut().put_u8(b',');
    write_str(writer, key)?;
    writer.get_mut().put_slice(b":{");
    for (i, interval) in intervals.iter().enumerate() {
        if i > 0 {
            writer.get_mut().put_u8(b',');
        }
        write_str(writer, interval.quantile.label())?;
        writer.get_mut().put_u8(b':');
        write_number(writer, interval.value)?;
    }
    writer.get_mut().put_u8(b'}');
    Ok(())
}

fn write_family(writer: &mut Writer, family: &MetricFamily) -> Result<(), ExpositionError> {
    write_str(writer, &sanitize_metric_name(family.name()))?;
    writer.get_mut().put_slice(b":{\"type\":");
    write_str(writer, family.type_name())?;
    writer.get_mut().put_slice(b",\"help\":");
    write_str(writer, family.help())?;
    writer.get_mut().put_slice(b",\"metrics\":[");

    match family {
        MetricFamily::Counter(f) | MetricFamily::Gauge(f) => {
            for (i, metric) in f.metrics.iter().enumerate() {
                open_metric(writer, i, &metric.labels)?;
                write_field(writer, "value", metric.value)?;
                writer.get_mut().put_u8(b'}');
            }
        }
        MetricFamily::Summary(f) => {
            for (i, summary) in f.metrics.iter().enumerate() {
                open_metric(writer, i, &summary.labels)?;
                write_field(writer, "sum", summary.sum)?;
                write_field(writer, "count", summary.count)?;
                write_intervals(writer, "quantiles", &summary.quantiles)?;
                writer.get_mut().put_u8(b'}');
            }
        }
        MetricFamily::Histogram(f) => {
            for (i, histogram) in f.metrics.iter().enumerate() {
                open_metric(writer, i, &histogram.labels)?;
                write_field(writer, "sum", histogram.sum)?;
                write_field(writer, "count", histogram.count as f64)?;
                write_intervals(writer, "buckets", &histogram.buckets)?;
                writer.get_mut().put_u8(b'}');
            }
        }
    }

    writer.get_mut().put_slice(b"]}");
    Ok(())
}

pub(super) fn render(families: &[MetricFamily]) -> Result<Bytes, ExpositionError> {
    let mut writer = BytesMut::new().writer();
    writer.get_mut().put_u8(b'{');

    for (i, family) in families.iter().enumerate() {
        if i > 0 {
            writer.get_mut().put_u8(b',');
        }
        write_family(&mut writer, family)?;
    }

    writer.get_mut().put_u8(b'}');
    Ok(writer.into_inner().freeze())
}

#[cfg(test)]
mod tests {
    use super::render;
    use metrics_model::{
        Family, Histogram, Interval, Labels, MetricFamily, NumericMetric, Quantile, Summary,
    };
    use serde_json::{json, Value};

    fn rendered(families: &[MetricFamily]) -> Value {
        serde_json::from_slice(&render(families).unwrap()).unwrap()
    }

    #[test]
    fn test_render_counter() {
        let families = vec![MetricFamily::Counter(Family::new(
            "reads_total",
            "Number of \"reads\".",
            vec![
                NumericMetric::new(Labels::of("host", "a"), 5.0),
                NumericMetric::new(Labels::empty(), f64::NAN),
            ],
        ))];

        assert_eq!(
            rendered(&families),
            json!({
                "reads_total": {
                    "type": "counter",
                    "help": "Number of \"reads\".",
                    "metrics": [
                        { "labels": { "host": "a" }, "value": 5.0 },
                        { "labels": {}, "value": null }
                    ]
                }
            })
        );
    }

    #[test]
    fn test_render_summary_and_histogram() {
        let families = vec![
            MetricFamily::Summary(Family::new(
                "partition_size",
                "",
                vec![Summary::new(
                    Labels::of("table", "t"),
                    f64::NAN,
                    5.0,
                    vec![Interval::new(Quantile::new(0.99), 3.0)],
                )],
            )),
            MetricFamily::Histogram(Family::new(
                "latency_seconds",
                "Latency.",
                vec![Histogram::new(
                    Labels::empty(),
                    6.0,
                    3,
                    vec![Interval::new(Quantile::bound(2.0), 3.0)],
                )],
            )),
        ];

        assert_eq!(
            rendered(&families),
            json!({
                "partition_size": {
                    "type": "summary",
                    "help": "",
                    "metrics": [{
                        "labels": { "table": "t" },
                        "sum": null,
                        "count": 5.0,
                        "quantiles": { "0.99": 3.0 }
                    }]
                },
                "latency_seconds": {
                    "type": "histogram",
                    "help": "Latency.",
                    "metrics": [{
                        "labels": {},
                        "sum": 6.0,
                        "count": 3.0,
                        "buckets": { "2": 3.0 }
                    }]
                }
            })
        );
    }

    #[test]
    fn test_render_sanitizes_family_names() {
        let families = vec![MetricFamily::Gauge(Family::new(
            "heap.used bytes",
            "",
            vec![NumericMetric::new(Labels::empty(), 1024.0)],
        ))];

        assert_eq!(
            rendered(&families),
            json!({
                "heap_used_bytes": {
                    "type": "gauge",
                    "help": "",
                    "metrics": [{ "labels": {}, "value": 1024.0 }]
                }
            })
        );
    }

    #[test]
    fn test_render_nothing() {
        assert_eq!(&render(&[]).unwrap()[..], b"{}");
    }
}

use std::borrow::Cow;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};
use std::thread;

use metrics_collector::{
    BucketsObject, CollectError, CollectorRegistry, CollectorRegistryBuilder, CountingObject,
    ExpositionFormat, HasBuckets, LabeledGroup, Number, SampleGroup, SampleKind, SamplingObject,
    SamplingSnapshot, Scale, ValueObject,
};
use metrics_model::{
    HistogramError, Interval, LabelFormat, Labels, MetricFamily, Quantile, STANDARD_QUANTILES,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn reads() -> SampleGroup {
    let a: CountingObject = Arc::new(5u64);
    let b: CountingObject = Arc::new(12u64);
    SampleGroup::Counter(
        LabeledGroup::new("reads_total", "Number of reads.")
            .with(Labels::of("host", "a"), a)
            .with(Labels::of("host", "b"), b),
    )
}

fn partition_sizes(name: &str, counts: Vec<u64>) -> SampleGroup {
    let object: BucketsObject = Arc::new(counts);
    SampleGroup::HistogramGauge(
        LabeledGroup::new(name, "Partition sizes.").with(Labels::of("table", "t"), object),
    )
}

fn text(registry: &CollectorRegistry, groups: &[SampleGroup]) -> String {
    let collection = registry.collect(groups);
    let output = collection.render(ExpositionFormat::Text).unwrap();
    String::from_utf8(output.to_vec()).unwrap()
}

#[test]
fn test_full_pass_isolates_failed_group() {
    init_tracing();

    let requests: CountingObject = Arc::new(AtomicU64::new(3));
    let heap: ValueObject = Arc::new(Number::from(1024i64));
    let latency: SamplingObject = Arc::new(SamplingSnapshot {
        count: 2,
        intervals: vec![Interval::new(Quantile::new(0.5), 250.0)],
        buckets: vec![0, 2, 0],
    });

    let groups = vec![
        reads(),
        SampleGroup::Meter(LabeledGroup::new("requests_total", "").with(Labels::empty(), requests)),
        partition_sizes("broken_partition_size", vec![0, 0, 2]),
        SampleGroup::NumericGauge(LabeledGroup::new("heap_bytes", "").with(Labels::empty(), heap)),
        partition_sizes("partition_size", vec![0, 0, 5, 0]),
        SampleGroup::Sampling(LabeledGroup::new("latency", "").with(Labels::empty(), latency)),
    ];

    let registry = CollectorRegistryBuilder::new().build();
    let collection = registry.collect(&groups);

    let names = collection.families().iter().map(MetricFamily::name).collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["reads_total", "requests_total", "heap_bytes", "partition_size", "latency"]
    );
    let types = collection.families().iter().map(MetricFamily::type_name).collect::<Vec<_>>();
    assert_eq!(types, vec!["counter", "counter", "gauge", "summary", "summary"]);

    assert!(!collection.is_complete());
    assert_eq!(collection.errors().len(), 1);
    let error = &collection.errors()[0];
    assert_eq!(error.name, "broken_partition_size");
    assert_eq!(error.kind, SampleKind::HistogramGauge);
    assert!(matches!(
        &error.source,
        CollectError::Histogram { source: HistogramError::Overflowed { count: 2 }, labels }
            if labels.get("table") == Some("t")
    ));
    assert_eq!(
        error.to_string(),
        "failed to collect histogram gauge group `broken_partition_size`: invalid bucket data for \
         {\"table\": \"t\"}: histogram overflowed: 2 samples in the last bucket"
    );
}

#[test]
fn test_failed_group_does_not_poison_later_passes() {
    struct Reservoir(Mutex<Vec<u64>>);

    impl HasBuckets for Reservoir {
        fn bucket_counts(&self) -> Cow<'_, [u64]> {
            Cow::Owned(self.0.lock().unwrap().clone())
        }
    }

    init_tracing();

    let reservoir = Arc::new(Reservoir(Mutex::new(vec![1, 1])));
    let object: BucketsObject = reservoir.clone();
    let groups = vec![
        reads(),
        SampleGroup::HistogramGauge(
            LabeledGroup::new("partition_size", "").with(Labels::empty(), object),
        ),
    ];

    let registry = CollectorRegistryBuilder::new().build();

    let first = registry.collect(&groups);
    assert_eq!(first.families().len(), 1);
    assert_eq!(first.errors().len(), 1);

    *reservoir.0.lock().unwrap() = vec![1, 1, 0];

    let second = registry.collect(&groups);
    assert!(second.is_complete());
    assert_eq!(second.families().len(), 2);
}

#[test]
fn test_counter_text_output() {
    let registry = CollectorRegistryBuilder::new().build();

    let expected = concat!(
        "# HELP reads_total Number of reads.\n",
        "# TYPE reads_total counter\n",
        "reads_total{host=\"a\"} 5\n",
        "reads_total{host=\"b\"} 12\n",
    );
    assert_eq!(text(&registry, &[reads()]), expected);
}

#[test]
fn test_summary_text_output() {
    let registry = CollectorRegistryBuilder::new().build();

    let mut expected = String::from(concat!(
        "# HELP partition_size Partition sizes.\n",
        "# TYPE partition_size summary\n",
    ));
    for quantile in STANDARD_QUANTILES.iter() {
        expected.push_str(&format!(
            "partition_size{{table=\"t\",quantile=\"{}\"}} 3\n",
            quantile.label()
        ));
    }
    expected.push_str("partition_size_sum{table=\"t\"} NaN\n");
    expected.push_str("partition_size_count{table=\"t\"} 5\n");

    let groups = [partition_sizes("partition_size", vec![0, 0, 5, 0])];
    assert_eq!(text(&registry, &groups), expected);
}

#[test]
fn test_histogram_text_output() {
    let registry = CollectorRegistryBuilder::new()
        .set_sampling_as_histogram(true)
        .set_bucket_range(1.0, 4.0)
        .build();

    let latency: SamplingObject = Arc::new(SamplingSnapshot {
        count: 3,
        intervals: vec![],
        buckets: vec![1, 0, 2, 0, 0],
    });
    let groups =
        [SampleGroup::Sampling(LabeledGroup::new("latency", "").with(Labels::empty(), latency))];

    let expected = concat!(
        "# TYPE latency histogram\n",
        "latency_bucket{le=\"1\"} 1\n",
        "latency_bucket{le=\"2\"} 1\n",
        "latency_bucket{le=\"3\"} 3\n",
        "latency_bucket{le=\"4\"} 3\n",
        "latency_bucket{le=\"+Inf\"} 3\n",
        "latency_sum 7\n",
        "latency_count 3\n",
    );
    assert_eq!(text(&registry, &groups), expected);
}

#[test]
fn test_scaled_timer_json_output() {
    let registry = CollectorRegistryBuilder::new()
        .set_bucket_scale(Scale::new(|micros| micros / 1_000_000.0))
        .build();

    let latency: SamplingObject = Arc::new(SamplingSnapshot {
        count: 4,
        intervals: vec![Interval::new(Quantile::new(0.99), 2_000_000.0)],
        buckets: vec![],
    });
    let groups = [SampleGroup::Sampling(
        LabeledGroup::new("latency_seconds", "Latency.").with(Labels::of("op", "read"), latency),
    )];

    let collection = registry.collect(&groups);
    let output = collection.render(ExpositionFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();

    let metric = &value["latency_seconds"]["metrics"][0];
    assert_eq!(value["latency_seconds"]["type"], "summary");
    assert_eq!(metric["labels"]["op"], "read");
    assert_eq!(metric["count"], 4.0);
    assert!(metric["sum"].is_null());
    assert_eq!(metric["quantiles"]["0.99"], 2.0);
}

#[test]
fn test_rendering_is_deterministic() {
    let registry = CollectorRegistryBuilder::new().build();
    let groups = [reads(), partition_sizes("partition_size", vec![0, 3, 1, 0])];

    for format in [ExpositionFormat::Text, ExpositionFormat::Json] {
        let collection = registry.collect(&groups);
        let first = collection.render(format).unwrap();
        let second = collection.render(format).unwrap();
        assert_eq!(first, second);

        collection.release_label_caches();
        let third = registry.collect(&groups).render(format).unwrap();
        assert_eq!(first, third);
    }
}

#[test]
fn test_release_label_caches() {
    let registry = CollectorRegistryBuilder::new().build();
    let groups = [reads()];
    let labels = Labels::of("host", "a");

    let collection = registry.collect(&groups);
    collection.render(ExpositionFormat::Text).unwrap();
    assert!(labels_in(&collection).all(|l| l.is_encoded(LabelFormat::PlainText)));
    assert!(labels_in(&collection).any(|l| *l == labels));

    collection.release_label_caches();
    assert!(labels_in(&collection).all(|l| !l.is_encoded(LabelFormat::PlainText)));
}

fn labels_in(
    collection: &metrics_collector::Collection,
) -> impl Iterator<Item = &Labels> + '_ {
    collection.families().iter().flat_map(|f| f.labels())
}

#[test]
fn test_concurrent_passes_share_label_encodings() {
    let registry = Arc::new(CollectorRegistryBuilder::new().build());
    let groups = Arc::new(vec![reads(), partition_sizes("partition_size", vec![0, 0, 5, 0])]);

    let outputs = thread::scope(|scope| {
        let handles = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let groups = Arc::clone(&groups);
                scope.spawn(move || {
                    let collection = registry.collect(groups.iter());
                    collection.render(ExpositionFormat::Text).unwrap()
                })
            })
            .collect::<Vec<_>>();

        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    });

    assert!(outputs.windows(2).all(|w| w[0] == w[1]));

    // Families hold clones of the groups' label sets, so they all share one cached buffer.
    let group_labels = match &groups[0] {
        SampleGroup::Counter(group) => group.iter().next().map(|(labels, _)| labels.clone()),
        other => panic!("expected a counter group, got {:?}", other),
    };
    let group_labels = group_labels.unwrap();
    let cached = group_labels.encode(LabelFormat::PlainText).unwrap();
    assert_eq!(&cached[..], b"host=\"a\"");

    let collection = registry.collect(groups.iter());
    let labels = collection.families()[0].labels().next().unwrap();
    assert_eq!(labels.encode(LabelFormat::PlainText).unwrap().as_ptr(), cached.as_ptr());
}

use criterion::{criterion_group, criterion_main, Criterion};
use metrics_model::{LabelFormat, Labels};

fn labels_benchmark(c: &mut Criterion) {
    let labels = Labels::new([
        ("cluster", "production"),
        ("datacenter", "us-east-1"),
        ("keyspace", "system"),
        ("table", "peers_v2"),
    ]);

    let mut group = c.benchmark_group("labels");
    group.bench_function("encode plain text (cached)", |b| {
        b.iter(|| labels.encode(LabelFormat::PlainText).unwrap())
    });
    group.bench_function("encode plain text (cold)", |b| {
        b.iter(|| {
            labels.release();
            labels.encode(LabelFormat::PlainText).unwrap()
        })
    });
    group.bench_function("encode json (cold)", |b| {
        b.iter(|| {
            labels.release();
            labels.encode(LabelFormat::Json).unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, labels_benchmark);
criterion_main!(benches);

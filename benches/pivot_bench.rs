//! Benchmarks for the record pivot
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use slsframe::frame::{build_frame, RawRecord, RecordClassifier};
use slsframe::payload::{FrameFormat, QueryPayload};

const REGIONS: [&str; 4] = ["us", "eu", "ap", "sa"];
const HOSTS: [&str; 8] = ["web-1", "web-2", "web-3", "web-4", "db-1", "db-2", "cache-1", "cache-2"];

fn create_test_records(count: usize) -> Vec<RawRecord> {
    (0..count)
        .map(|i| {
            let secs = i % 3600;
            [
                (
                    "time".to_string(),
                    format!("2023-01-01 {:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60),
                ),
                ("region".to_string(), REGIONS[i % REGIONS.len()].to_string()),
                ("host".to_string(), HOSTS[i % HOSTS.len()].to_string()),
                ("cpu".to_string(), format!("{:.2}", (i % 100) as f64 / 10.0)),
                ("latency".to_string(), (i % 250).to_string()),
                ("__topic__".to_string(), "bench".to_string()),
            ]
            .into_iter()
            .collect()
        })
        .collect()
}

fn payload(format: FrameFormat) -> QueryPayload {
    QueryPayload::new("*").format(format).timezone(chrono_tz::UTC)
}

fn bench_time_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_series");
    let payload = payload(FrameFormat::TimeSeries);

    for size in [100, 1000, 10000] {
        let records = create_test_records(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("build_frame_{}", size), |b| {
            b.iter(|| build_frame("A", black_box(&payload), black_box(&records)))
        });
    }

    group.finish();
}

fn bench_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("table");
    let payload = payload(FrameFormat::Table);

    for size in [100, 1000, 10000] {
        let records = create_test_records(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("build_frame_{}", size), |b| {
            b.iter(|| build_frame("A", black_box(&payload), black_box(&records)))
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let classifier = RecordClassifier::new("time", "%Y-%m-%d %H:%M:%S", chrono_tz::UTC);
    let records = create_test_records(10000);

    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("attach_times_10000", |b| {
        b.iter(|| classifier.attach_times(black_box(&records)).records.len())
    });

    let timed = classifier.attach_times(&records);
    group.bench_function("classify_10000", |b| {
        b.iter(|| classifier.classify(black_box(&timed.records)))
    });

    group.finish();
}

criterion_group!(benches, bench_time_series, bench_table, bench_classify);
criterion_main!(benches);

//! Performance benchmarks for the pure reduction kernels
//!
//! The network dominates any real run; these benchmarks only watch the
//! in-process arithmetic (distance ranking, tier classification, jitter
//! reduction, throughput aggregation) for regressions.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use network_speed_tester::geo;
use network_speed_tester::latency::LatencyJitterEstimator;
use network_speed_tester::models::MeasurementSample;
use network_speed_tester::selector::ServerSelector;
use network_speed_tester::throughput::mbits;
use network_speed_tester::types::{Coordinate, LineType};
use network_speed_tester::ServerInfo;
use std::time::Duration;

fn sample_directory(count: usize) -> Vec<ServerInfo> {
    (0..count)
        .map(|i| {
            ServerInfo::new(
                format!("server-{}", i),
                "Sponsor".to_string(),
                format!("server-{}.example.net:8080", i),
                format!("http://server-{}.example.net/speedtest/upload.php", i),
                Coordinate::new(
                    -80.0 + (i as f64 * 0.37) % 160.0,
                    -170.0 + (i as f64 * 1.13) % 340.0,
                ),
            )
        })
        .collect()
}

fn sample_latencies(count: usize) -> Vec<MeasurementSample> {
    (0..count)
        .map(|i| MeasurementSample::latency(Duration::from_millis(20 + (i as u64 * 7) % 40)))
        .collect()
}

fn bench_geo_distance(c: &mut Criterion) {
    let paris = Coordinate::new(48.8566, 2.3522);
    let tokyo = Coordinate::new(35.6762, 139.6503);
    c.bench_function("geo_distance", |b| {
        b.iter(|| geo::distance(black_box(paris), black_box(tokyo)))
    });
}

fn bench_distance_ranking(c: &mut Criterion) {
    let directory = sample_directory(500);
    let selector = ServerSelector::new(Coordinate::new(45.0, 9.0));
    c.bench_function("rank_500_servers", |b| {
        b.iter(|| selector.rank_by_distance(black_box(&directory)))
    });
}

fn bench_tier_classification(c: &mut Criterion) {
    c.bench_function("line_type_classification", |b| {
        b.iter(|| {
            for speed in [0.5, 4.0, 12.0, 30.0, 99.0, 150.0, 940.0] {
                black_box(LineType::from_preflight(black_box(speed)));
            }
        })
    });
}

fn bench_jitter_reduction(c: &mut Criterion) {
    let samples = sample_latencies(100);
    c.bench_function("jitter_100_samples", |b| {
        b.iter(|| LatencyJitterEstimator::reduce(black_box(&samples)))
    });
}

fn bench_throughput_aggregation(c: &mut Criterion) {
    c.bench_function("mbits_reduction", |b| {
        b.iter(|| mbits(black_box(123_456_789), black_box(Duration::from_millis(10_250))))
    });
}

criterion_group!(
    benches,
    bench_geo_distance,
    bench_distance_ranking,
    bench_tier_classification,
    bench_jitter_reduction,
    bench_throughput_aggregation
);
criterion_main!(benches);

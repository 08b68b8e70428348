//! Timer Operations Benchmarks
//!
//! Benchmarks for the canonical countdown, frame distance, drift tracking
//! over recorded readings, and template matching.
//!
//! Run with: `cargo bench --bench timer_ops`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use framesync::{
    canonical_sequence, distance, DriftTracker, IterFeed, NccMatcher, SyncConfig, TemplateMatcher,
    Timestamp,
};
use image::{GrayImage, Luma};

fn bench_canonical_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical_sequence");

    for start in [60u32, 480, 5999] {
        group.bench_with_input(BenchmarkId::from_parameter(start), &start, |bench, &s| {
            bench.iter(|| {
                let count = canonical_sequence(black_box(s)).map(Iterator::count);
                black_box(count)
            });
        });
    }

    group.finish();
}

fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance");

    group.bench_function("string", |bench| {
        bench.iter(|| distance(black_box("075999"), black_box("031247")));
    });

    let from: Timestamp = "075999".parse().unwrap_or_else(|e| panic!("{e}"));
    let to: Timestamp = "031247".parse().unwrap_or_else(|e| panic!("{e}"));
    group.bench_function("typed", |bench| {
        bench.iter(|| black_box(from).distance_to(black_box(&to)));
    });

    group.finish();
}

fn bench_tracker_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracker_replay");
    group.sample_size(20);

    let readings: Vec<Option<Timestamp>> = canonical_sequence(480)
        .map(|seq| seq.skip(1).map(Some).collect())
        .unwrap_or_default();

    group.bench_function("clean_480s", |bench| {
        bench.iter(|| {
            let feed = IterFeed::new(readings.clone());
            let tracker = DriftTracker::new(feed, SyncConfig::default());
            black_box(tracker.map(|t| t.filter_map(Result::ok).count()))
        });
    });

    group.finish();
}

fn bench_ncc_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("ncc_region");

    let scene = GrayImage::from_fn(643, 528, |x, y| Luma([((x * 31 + y * 17) % 256) as u8]));
    let search = framesync::Rect::new(243, 56, 30, 32);

    for (w, h) in [(26u32, 26u32), (22, 21)] {
        let template = GrayImage::from_fn(w, h, |x, y| Luma([((x * y) % 256) as u8]));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{w}x{h}")),
            &template,
            |bench, t| {
                bench.iter(|| {
                    NccMatcher::new().best_confidence(
                        black_box(t),
                        black_box(&scene),
                        1.0,
                        Some(search),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_canonical_sequence,
    bench_distance,
    bench_tracker_replay,
    bench_ncc_region
);
criterion_main!(benches);

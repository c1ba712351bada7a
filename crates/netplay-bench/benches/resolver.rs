//! Criterion micro-benchmarks for action resolution, step packaging, and
//! lag analysis.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use netplay_bench::{envelope_stream, PLANES, PLANE_SIDE};
use netplay_core::{EpisodeId, StepId, StepOutcome};
use netplay_engine::{ActionResolver, Episode, FramePackager};
use netplay_record::LagProfile;
use netplay_test_utils::PassthroughCodec;

/// Benchmark: resolve 1000 steps where every third action is missing.
fn bench_resolve_mixed(c: &mut Criterion) {
    let resolver = ActionResolver::new(1, 0u8);
    let stream = envelope_stream(1000, 1, 0.03);

    c.bench_function("resolve_mixed_1000", |b| {
        b.iter(|| {
            let mut episode = Episode::new(EpisodeId(1), 0u8);
            let mut fresh = 0usize;
            for (i, envelope) in stream.iter().enumerate() {
                let candidate = (i % 3 != 0).then(|| envelope.clone());
                let r = resolver.resolve(candidate, StepId(i as u64), &mut episode);
                fresh += usize::from(!r.outcome.is_skip);
            }
            black_box(fresh);
        });
    });
}

/// Benchmark: resolve 1000 envelopes that all belong to an earlier
/// episode.
fn bench_resolve_stale(c: &mut Criterion) {
    let resolver = ActionResolver::new(1, 0u8);
    let stream = envelope_stream(1000, 0, 0.03);

    c.bench_function("resolve_stale_1000", |b| {
        b.iter(|| {
            let mut episode = Episode::new(EpisodeId(1), 0u8);
            for (i, envelope) in stream.iter().enumerate() {
                black_box(resolver.resolve(Some(envelope.clone()), StepId(i as u64), &mut episode));
            }
        });
    });
}

/// Benchmark: package a stacked 84×84 observation into a frame.
fn bench_package_frame(c: &mut Criterion) {
    let packager = FramePackager::new(PassthroughCodec);
    let observation = vec![17u8; PLANES * PLANE_SIDE * PLANE_SIDE];

    c.bench_function("package_frame_28k", |b| {
        b.iter(|| {
            let frame = packager
                .package(StepId(5), EpisodeId(0), black_box(&observation))
                .unwrap();
            black_box(frame.byte_size);
        });
    });
}

/// Benchmark: build a lag profile over 10K outcomes.
fn bench_lag_profile(c: &mut Criterion) {
    let outcomes: Vec<StepOutcome> = (0..10_000)
        .map(|i| {
            if i % 5 == 0 {
                StepOutcome::skipped()
            } else {
                StepOutcome::fresh(i % 3, 0.02 + (i % 7) as f64 * 0.005, 28_224)
            }
        })
        .collect();

    c.bench_function("lag_profile_10k", |b| {
        b.iter(|| black_box(LagProfile::from_outcomes(black_box(&outcomes))));
    });
}

criterion_group!(
    benches,
    bench_resolve_mixed,
    bench_resolve_stale,
    bench_package_frame,
    bench_lag_profile,
);
criterion_main!(benches);

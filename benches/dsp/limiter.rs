//! Benchmarks for the output peak limiter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysynth::dsp::limiter::{PeakLimiter, DEFAULT_RELEASE_SECONDS, DEFAULT_THRESHOLD_DB};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_limiter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/limiter");

    for &size in BLOCK_SIZES {
        // Peaks well over the ceiling so the gain path is exercised.
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.07).sin() * 2.5).collect();

        let mut limiter = PeakLimiter::new(DEFAULT_THRESHOLD_DB, DEFAULT_RELEASE_SECONDS, SAMPLE_RATE);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("hot_signal", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                limiter.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

//! Benchmarks for delay line operations.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysynth::dsp::delay::DelayLine;
use polysynth::graph::{
    delay::DelayNode,
    node::{GraphNode, RenderCtx},
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");
    let ctx = RenderCtx::at(SAMPLE_RATE, 0.0);

    let delay_times: &[usize] = &[
        480,    // 10ms at 48kHz
        12_000, // 250ms
        48_000, // 1s
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &delay_samples in delay_times {
            let delay_ms = delay_samples as f32 / 48.0;

            let mut delay = DelayLine::new();
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("feedback_{}ms", delay_ms as u32), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        for sample in buffer.iter_mut() {
                            *sample = delay.next_feedback_sample(*sample, black_box(delay_samples), 0.3);
                        }
                    })
                },
            );
        }

        let mut node = DelayNode::with_defaults(SAMPLE_RATE);
        node.set_wet(0.5, 0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("node_wet", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                node.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}

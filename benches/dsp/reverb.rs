//! Benchmarks for reverb processing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysynth::dsp::reverb::SchroederReverb;
use polysynth::graph::{
    node::{GraphNode, RenderCtx},
    reverb::ReverbNode,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");
    let ctx = RenderCtx::at(SAMPLE_RATE, 0.0);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0)
                } else {
                    (i as f32 * 0.05).sin() * 0.1
                }
            })
            .collect();

        let mut reverb = SchroederReverb::new(SAMPLE_RATE);
        reverb.set_decay(2.0);
        group.bench_with_input(BenchmarkId::new("schroeder", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &input {
                    sum += reverb.process(black_box(sample));
                }
                sum
            })
        });

        // Pre-delay plus dry/wet blend, fully wet.
        let mut node = ReverbNode::with_defaults(SAMPLE_RATE);
        node.set_wet(1.0, 0);
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

//! Benchmarks for the state-variable filter and the 24 dB filter node.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysynth::dsp::filter::SVFilter;
use polysynth::graph::{
    filter::{FilterNode, FilterParam},
    node::{GraphNode, Modulatable, RenderCtx},
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn ramp(size: usize) -> Vec<f32> {
    (0..size).map(|i| (i as f32 / size as f32) * 2.0 - 1.0).collect()
}

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::at(SAMPLE_RATE, 0.0);

    for &size in BLOCK_SIZES {
        let input = ramp(size);

        let mut svf = SVFilter::lowpass(1000.0);
        svf.set_q(2.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("svf_lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                svf.render(black_box(&mut buffer), SAMPLE_RATE);
            })
        });

        // Two stages with control-rate coefficient updates.
        let mut node = FilterNode::lowpass(2000.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("node_24db", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                node.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // Cutoff changing every block, as under LFO modulation.
        let mut node = FilterNode::lowpass(2000.0);
        let mut buffer = input.clone();
        let mut phase = 0.0f32;
        group.bench_with_input(BenchmarkId::new("node_modulated", size), &size, |b, _| {
            b.iter(|| {
                phase = (phase + 0.05) % 1.0;
                node.apply_modulation(FilterParam::Frequency, phase);
                buffer.copy_from_slice(&input);
                node.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}

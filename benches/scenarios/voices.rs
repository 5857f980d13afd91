//! Benchmarks for the voice pool.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysynth::graph::node::RenderCtx;
use polysynth::synth::{
    notes::Note,
    pool::VoicePool,
    settings::{ModulationKind, ModulationSettings, SynthSettings},
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

const POOL_SIZE: usize = 16;

fn patch(modulation: Option<ModulationSettings>) -> SynthSettings {
    let mut settings = SynthSettings::default();
    settings.oscillator.modulation = modulation;
    settings
}

/// Pool with every voice holding a note.
fn full_pool(settings: &SynthSettings) -> VoicePool {
    let mut pool = VoicePool::new(POOL_SIZE, settings, SAMPLE_RATE);
    for midi in 48..48 + POOL_SIZE as u8 {
        if let Some(note) = Note::from_midi(midi) {
            pool.note_on(note, 0.8, settings);
        }
    }
    pool
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let ctx = RenderCtx::at(SAMPLE_RATE, 0.0);

    let patches = [
        ("subtractive", patch(None)),
        (
            "fm",
            patch(Some(ModulationSettings {
                kind: ModulationKind::Fm,
                amount: 3.0,
            })),
        ),
        (
            "am",
            patch(Some(ModulationSettings {
                kind: ModulationKind::Am,
                amount: 1.0,
            })),
        ),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, settings) in &patches {
            let mut pool = full_pool(settings);
            group.bench_with_input(BenchmarkId::new(format!("{name}_x{POOL_SIZE}"), size), &size, |b, _| {
                b.iter(|| {
                    pool.render(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }

        // Idle pool: the per-voice sounding check should make this nearly free.
        let mut idle = VoicePool::new(POOL_SIZE, &patches[0].1, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                idle.render(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}

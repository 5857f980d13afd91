//! Benchmarks for the complete audio-thread processor.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysynth::{
    engine::EngineProcessor,
    synth::{
        message::EngineCommand,
        notes::Note,
        settings::{LfoTarget, SynthSettings},
    },
    EngineConfig,
};
use rtrb::RingBuffer;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn loaded(settings: &SynthSettings, voices: usize) -> EngineProcessor {
    let config = EngineConfig::default().with_max_voices(voices);
    let (_producer, consumer) = RingBuffer::<EngineCommand>::new(1);
    let mut processor = EngineProcessor::new(&config, settings, SAMPLE_RATE, consumer);
    for midi in (40..).step_by(3).take(voices) {
        if let Some(note) = Note::from_midi(midi) {
            processor.handle(EngineCommand::NoteOn { note, velocity: 0.8 });
        }
    }
    processor
}

fn everything_on() -> SynthSettings {
    let mut settings = SynthSettings::default();
    for effect in [
        &mut settings.effects.reverb,
        &mut settings.effects.delay,
        &mut settings.effects.distortion,
    ] {
        effect.enabled = true;
        effect.wet = 0.4;
    }
    settings.lfo.depth = 0.5;
    settings
}

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    let dry = SynthSettings::default();
    let wet = everything_on();
    let mut pitch = everything_on();
    pitch.lfo.target = LfoTarget::Pitch;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let cases = [("dry_x8", &dry, 8), ("effects_x8", &wet, 8), ("pitch_lfo_x16", &pitch, 16)];
        for (name, settings, voices) in cases {
            let mut processor = loaded(settings, voices);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    processor.process(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}

use crate::{
    automation::{ramp_samples, SmoothedParam},
    dsp::{
        envelope::Envelope,
        modulate::{cents_to_ratio, semitones_to_ratio},
        oscillator::{OscillatorBlock, OscillatorWaveform},
    },
    graph::node::{GraphNode, RenderCtx},
    synth::settings::{EnvelopeSettings, ModulationKind, OscillatorSettings},
};

/*
Voice Generators
================

One generator is the sound source of one voice. Three algorithms share
the same amplitude envelope, detune and pitch-modulation input:

SUBTRACTIVE

    carrier(waveform) ──────────────────────────→ × env × velocity

FM (frequency modulation)

    modulator(sine, f · harmonicity) × mod_env
         │
         ▼  deviation = mod · index · f
    carrier(waveform, f + deviation) ─────────────→ × env × velocity

  The modulation amount sets both harmonicity and index, so turning it up
  moves the sidebands further out AND makes them louder.

AM (amplitude modulation)

    modulator(square, f · harmonicity) × mod_env
         │
         ▼  gain = (mod + 1) / 2
    carrier(waveform) × gain ──────────────────────→ × env × velocity

A retrigger on a generator that is still audible (envelope level above
GLIDE_LEVEL) glides the base frequency to the new note over
PORTAMENTO_SECONDS instead of jumping; from silence it starts on pitch.

The algorithm is a tagged variant, never probed at runtime: changing the
kind means building a new generator, changing the amount within a kind is
a plain field write. Nothing in here allocates, so either can happen on
the audio thread.
*/

const PORTAMENTO_SECONDS: f32 = 0.05;
const GLIDE_LEVEL: f32 = 0.05;

/// Generator algorithm family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    Subtractive,
    Fm,
    Am,
}

impl GeneratorKind {
    pub fn from_settings(settings: &OscillatorSettings) -> Self {
        match settings.modulation.map(|m| m.kind) {
            Some(ModulationKind::Fm) => GeneratorKind::Fm,
            Some(ModulationKind::Am) => GeneratorKind::Am,
            Some(ModulationKind::None) | None => GeneratorKind::Subtractive,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Algorithm {
    Subtractive,
    Fm {
        modulator: OscillatorBlock,
        mod_env: Envelope,
        harmonicity: f32,
        index: f32,
    },
    Am {
        modulator: OscillatorBlock,
        mod_env: Envelope,
        harmonicity: f32,
    },
}

impl Algorithm {
    fn new(kind: GeneratorKind, amount: f32) -> Self {
        match kind {
            GeneratorKind::Subtractive => Algorithm::Subtractive,
            GeneratorKind::Fm => Algorithm::Fm {
                modulator: OscillatorBlock::sine(),
                mod_env: Envelope::adsr(0.01, 0.01, 1.0, 0.5),
                harmonicity: amount,
                index: amount,
            },
            GeneratorKind::Am => Algorithm::Am {
                modulator: OscillatorBlock::square(),
                mod_env: Envelope::adsr(0.5, 0.0, 1.0, 0.5),
                harmonicity: amount,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Generator {
    algorithm: Algorithm,
    carrier: OscillatorBlock,
    envelope: Envelope,
    detune: SmoothedParam,
    frequency: SmoothedParam,
    velocity: f32,
    pitch_ratio: f32,
}

impl Generator {
    pub fn new(oscillator: &OscillatorSettings, envelope: &EnvelopeSettings) -> Self {
        let kind = GeneratorKind::from_settings(oscillator);
        let amount = oscillator.modulation.map_or(1.0, |m| m.amount);

        let mut generator = Self {
            algorithm: Algorithm::new(kind, amount),
            carrier: OscillatorBlock::new(oscillator.waveform),
            envelope: Envelope::default(),
            detune: SmoothedParam::new(oscillator.detune),
            frequency: SmoothedParam::new(440.0),
            velocity: 1.0,
            pitch_ratio: 1.0,
        };
        generator.set_envelope(envelope);
        generator
    }

    pub fn kind(&self) -> GeneratorKind {
        match self.algorithm {
            Algorithm::Subtractive => GeneratorKind::Subtractive,
            Algorithm::Fm { .. } => GeneratorKind::Fm,
            Algorithm::Am { .. } => GeneratorKind::Am,
        }
    }

    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.carrier.set_waveform(waveform);
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.carrier.waveform()
    }

    pub fn set_detune(&mut self, cents: f32, ramp_samples: u32) {
        self.detune.ramp_to(cents, ramp_samples);
    }

    pub fn detune(&self) -> &SmoothedParam {
        &self.detune
    }

    /// Immediate; a no-op for subtractive generators.
    pub fn set_modulation_amount(&mut self, amount: f32) {
        match &mut self.algorithm {
            Algorithm::Subtractive => {}
            Algorithm::Fm { harmonicity, index, .. } => {
                *harmonicity = amount;
                *index = amount;
            }
            Algorithm::Am { harmonicity, .. } => *harmonicity = amount,
        }
    }

    pub fn set_envelope(&mut self, settings: &EnvelopeSettings) {
        self.envelope
            .set_adsr(settings.attack, settings.decay, settings.sustain, settings.release);
    }

    /// Pitch modulation in semitones, held until changed.
    pub fn set_pitch_modulation(&mut self, semitones: f32) {
        self.pitch_ratio = semitones_to_ratio(semitones);
    }

    pub fn pitch_ratio(&self) -> f32 {
        self.pitch_ratio
    }

    /// Frequency the carrier is currently running at.
    pub fn current_frequency(&self) -> f32 {
        self.frequency.value() * cents_to_ratio(self.detune.value()) * self.pitch_ratio
    }

    /// True while the base frequency is gliding to a new note.
    pub fn is_gliding(&self) -> bool {
        self.frequency.is_ramping()
    }

    #[inline]
    fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let frequency =
            self.frequency.next_sample() * cents_to_ratio(self.detune.next_sample()) * self.pitch_ratio;

        let raw = match &mut self.algorithm {
            Algorithm::Subtractive => self.carrier.next_sample(frequency, sample_rate),
            Algorithm::Fm {
                modulator,
                mod_env,
                harmonicity,
                index,
            } => {
                let m = modulator.next_sample(frequency * *harmonicity, sample_rate)
                    * mod_env.next_sample(sample_rate);
                self.carrier
                    .next_sample(frequency + m * *index * frequency, sample_rate)
            }
            Algorithm::Am {
                modulator,
                mod_env,
                harmonicity,
            } => {
                let m = modulator.next_sample(frequency * *harmonicity, sample_rate)
                    * mod_env.next_sample(sample_rate);
                self.carrier.next_sample(frequency, sample_rate) * (m + 1.0) * 0.5
            }
        };

        raw * self.envelope.next_sample(sample_rate) * self.velocity
    }
}

impl GraphNode for Generator {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        if !self.envelope.is_active() {
            self.detune.advance(out.len());
            self.frequency.advance(out.len());
            out.fill(0.0);
            return;
        }

        for sample in out.iter_mut() {
            *sample = self.next_sample(ctx.sample_rate);
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        if self.envelope.is_active() && self.envelope.level() > GLIDE_LEVEL {
            self.frequency
                .ramp_to(ctx.frequency, ramp_samples(PORTAMENTO_SECONDS * 1_000.0, ctx.sample_rate));
        } else {
            self.frequency.set_immediate(ctx.frequency);
        }
        self.velocity = ctx.velocity;
        self.envelope.note_on(ctx);
        match &mut self.algorithm {
            Algorithm::Subtractive => {}
            Algorithm::Fm { mod_env, .. } | Algorithm::Am { mod_env, .. } => mod_env.note_on(ctx),
        }
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.envelope.note_off(ctx);
        match &mut self.algorithm {
            Algorithm::Subtractive => {}
            Algorithm::Fm { mod_env, .. } | Algorithm::Am { mod_env, .. } => mod_env.note_off(ctx),
        }
    }

    fn get_envelope_level(&self) -> Option<f32> {
        Some(self.envelope.level())
    }

    fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    fn reset(&mut self) {
        self.envelope.reset();
        self.carrier.reset();
        match &mut self.algorithm {
            Algorithm::Subtractive => {}
            Algorithm::Fm { modulator, mod_env, .. } | Algorithm::Am { modulator, mod_env, .. } => {
                modulator.reset();
                mod_env.reset();
            }
        }
    }
}

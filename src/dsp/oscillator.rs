use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

/*
Phase Accumulator Oscillator
============================

Every waveform here is a function of a single normalized phase in [0, 1).
Each sample the phase advances by `frequency / sample_rate` and wraps.

    phase:     0.0 ─────────────────────→ 1.0 (wraps to 0.0)

    sine:      sin(2π · phase)
    triangle:  rises -1 → +1 over the first half, falls back over the second
    sawtooth:  2 · phase - 1          (ramp up, snap down)
    square:    +1 for phase < 0.5, -1 otherwise

The phase is emitted BEFORE it advances, so sample n of a fresh oscillator
is exactly waveform(n · f / sr). Negative frequencies (possible under deep
FM) simply run the phase backwards; `rem_euclid` keeps it in range.

These are naive (non-band-limited) waveforms. Aliasing is audible on high
notes with saw and square, which the post-filter in the effects chain
mostly tames.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OscillatorWaveform {
    Sine,
    Triangle,
    #[default]
    Sawtooth,
    Square,
}

impl OscillatorWaveform {
    /// Evaluate the waveform at a normalized phase in [0, 1).
    #[inline]
    pub fn evaluate(self, phase: f32) -> f32 {
        match self {
            OscillatorWaveform::Sine => (TAU * phase).sin(),
            OscillatorWaveform::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                }
            }
            OscillatorWaveform::Sawtooth => 2.0 * phase - 1.0,
            OscillatorWaveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self { waveform, phase: 0.0 }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorWaveform::Triangle)
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorWaveform::Sawtooth)
    }

    pub fn square() -> Self {
        Self::new(OscillatorWaveform::Square)
    }

    /// Produce one sample at `frequency` Hz and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let out = self.waveform.evaluate(self.phase);
        self.phase = (self.phase + frequency / sample_rate).rem_euclid(1.0);
        out
    }

    /// Fill the buffer at the context frequency.
    pub fn render(&mut self, destination: &mut [f32], ctx: &RenderCtx) {
        for sample in destination.iter_mut() {
            *sample = self.next_sample(ctx.frequency, ctx.sample_rate);
        }
    }

    /// Switch waveform without resetting phase (no discontinuity in timing).
    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

use crate::{
    automation::SmoothedParam,
    dsp::{
        lfo::LfoRange,
        oscillator::{OscillatorBlock, OscillatorWaveform},
    },
    graph::node::{GraphNode, RenderCtx},
};

/*
Low Frequency Oscillator
========================

A sub-audio oscillator (typically 0.1 - 20 Hz) used as a control signal,
never heard directly.

    waveform   sine (smooth wobble), triangle (linear sweep),
               sawtooth (ramp), square (two-step trill)
    frequency  smoothed like any other continuous control
    range      output interval, chosen by whoever routes the LFO:
               [-1, 1] for vibrato, [0, 1] for filter and volume

The phase keeps running whether or not anything is connected, so a
target that gets connected mid-cycle picks the LFO up where it is
instead of restarting it.
*/

pub struct LfoNode {
    oscillator: OscillatorBlock,
    frequency: SmoothedParam,
    range: LfoRange,
}

impl LfoNode {
    pub fn new(waveform: OscillatorWaveform, frequency: f32) -> Self {
        Self {
            oscillator: OscillatorBlock::new(waveform),
            frequency: SmoothedParam::new(frequency),
            range: LfoRange::UNIPOLAR,
        }
    }

    pub fn sine(frequency: f32) -> Self {
        Self::new(OscillatorWaveform::Sine, frequency)
    }

    pub fn set_frequency(&mut self, hz: f32, ramp_samples: u32) {
        self.frequency.ramp_to(hz.max(0.0), ramp_samples);
    }

    pub fn frequency(&self) -> f32 {
        self.frequency.value()
    }

    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.oscillator.set_waveform(waveform);
    }

    pub fn set_range(&mut self, range: LfoRange) {
        self.range = range;
    }

    pub fn range(&self) -> LfoRange {
        self.range
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            let raw = self.oscillator.next_sample(self.frequency.next_sample(), ctx.sample_rate);
            *sample = self.range.map(raw);
        }
    }

    fn reset(&mut self) {
        self.oscillator.reset();
    }
}

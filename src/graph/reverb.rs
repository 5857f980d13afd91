use crate::{
    automation::SmoothedParam,
    dsp::{delay::DelayLine, mix::blend_dry_wet, reverb::SchroederReverb},
    graph::node::{GraphNode, RenderCtx},
};

/*
Reverb Node
===========

    in ─┬──────────────────────────────────┐
        └─ pre-delay 10 ms ─ Schroeder ─┐   │
                                        wet mix ─→ out

The pre-delay holds the tail back a few milliseconds so the attack of a
note stays clear before the room answers. `wet` is smoothed per sample.
*/

pub const DEFAULT_DECAY_SECONDS: f32 = 2.0;
pub const DEFAULT_PRE_DELAY_SECONDS: f32 = 0.01;

pub struct ReverbNode {
    reverb: SchroederReverb,
    pre_delay: DelayLine,
    pre_delay_samples: usize,
    wet: SmoothedParam,
}

impl ReverbNode {
    pub fn new(sample_rate: f32, decay_seconds: f32, pre_delay_seconds: f32) -> Self {
        let mut reverb = SchroederReverb::new(sample_rate);
        reverb.set_decay(decay_seconds);

        Self {
            reverb,
            pre_delay: DelayLine::new(),
            pre_delay_samples: (pre_delay_seconds * sample_rate).round() as usize,
            wet: SmoothedParam::new(0.0),
        }
    }

    pub fn with_defaults(sample_rate: f32) -> Self {
        Self::new(sample_rate, DEFAULT_DECAY_SECONDS, DEFAULT_PRE_DELAY_SECONDS)
    }

    pub fn set_wet(&mut self, wet: f32, ramp_samples: u32) {
        self.wet.ramp_to(wet.clamp(0.0, 1.0), ramp_samples);
    }

    pub fn wet(&self) -> &SmoothedParam {
        &self.wet
    }
}

impl GraphNode for ReverbNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            let dry = *sample;
            let delayed = self.pre_delay.next_sample(dry, self.pre_delay_samples);
            let tail = self.reverb.process(delayed);
            *sample = blend_dry_wet(dry, tail, self.wet.next_sample());
        }
    }

    fn reset(&mut self) {
        self.reverb.reset();
        self.pre_delay.reset();
    }
}

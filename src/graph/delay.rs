use crate::{
    automation::SmoothedParam,
    dsp::{delay::DelayLine, mix::blend_dry_wet},
    graph::node::{GraphNode, RenderCtx},
};

/*
Feedback Delay
==============

Echoes of the input every `delay_time`, each one `feedback` times the
previous:

    in ─┬──────────────────────────┐
        └─→ (+) ─→ [delay line] ─┬─→ wet mix ─→ out
             ↑                   │
             └──── × feedback ───┘

At the default 250 ms / 0.3 an echo falls below -60 dB after about six
repeats (0.3^6 ≈ 0.0007), so the effect reads as a short slapback trail
rather than a wash.
*/

pub const DEFAULT_DELAY_SECONDS: f32 = 0.25;
pub const DEFAULT_FEEDBACK: f32 = 0.3;

pub struct DelayNode {
    line: DelayLine,
    delay_samples: usize,
    feedback: f32,
    wet: SmoothedParam,
}

impl DelayNode {
    pub fn new(sample_rate: f32, delay_seconds: f32, feedback: f32) -> Self {
        Self {
            line: DelayLine::new(),
            delay_samples: (delay_seconds * sample_rate).round() as usize,
            feedback: feedback.clamp(0.0, 0.95),
            wet: SmoothedParam::new(0.0),
        }
    }

    pub fn with_defaults(sample_rate: f32) -> Self {
        Self::new(sample_rate, DEFAULT_DELAY_SECONDS, DEFAULT_FEEDBACK)
    }

    pub fn set_wet(&mut self, wet: f32, ramp_samples: u32) {
        self.wet.ramp_to(wet.clamp(0.0, 1.0), ramp_samples);
    }

    pub fn wet(&self) -> &SmoothedParam {
        &self.wet
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }
}

impl GraphNode for DelayNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            let dry = *sample;
            let echo = self.line.next_feedback_sample(dry, self.delay_samples, self.feedback);
            *sample = blend_dry_wet(dry, echo, self.wet.next_sample());
        }
    }

    fn reset(&mut self) {
        self.line.reset();
    }
}

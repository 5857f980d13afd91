use crate::{
    automation::SmoothedParam,
    dsp::{
        distortion::{steepness, waveshape},
        mix::blend_dry_wet,
    },
    graph::node::{GraphNode, RenderCtx},
};

/// Default waveshaper amount for the chain's distortion stage.
pub const DEFAULT_AMOUNT: f32 = 0.8;

/// Waveshaper with a smoothed dry/wet blend. First stage after the voices.
pub struct DistortionNode {
    k: f32,
    wet: SmoothedParam,
}

impl DistortionNode {
    pub fn new(amount: f32) -> Self {
        Self {
            k: steepness(amount),
            wet: SmoothedParam::new(0.0),
        }
    }

    pub fn set_amount(&mut self, amount: f32) {
        self.k = steepness(amount);
    }

    pub fn set_wet(&mut self, wet: f32, ramp_samples: u32) {
        self.wet.ramp_to(wet.clamp(0.0, 1.0), ramp_samples);
    }

    pub fn wet(&self) -> &SmoothedParam {
        &self.wet
    }
}

impl Default for DistortionNode {
    fn default() -> Self {
        Self::new(DEFAULT_AMOUNT)
    }
}

impl GraphNode for DistortionNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            let wet = self.wet.next_sample();
            if wet > 0.0 {
                *sample = blend_dry_wet(*sample, waveshape(*sample, self.k), wet);
            }
        }
    }
}

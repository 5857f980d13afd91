use crate::{
    automation::SmoothedParam,
    dsp::{
        filter::{FilterType, SVFilter, MAX_CUTOFF_HZ, MIN_CUTOFF_HZ},
        modulate::filter_ratio,
    },
    graph::{
        node::{GraphNode, Modulatable, RenderCtx},
        CONTROL_CHUNK,
    },
};

/*
Chain Filter (24 dB/oct)
========================

Two identical state-variable sections in series. Each SVF section is
12 dB/oct, so the cascade rolls off at 24 dB/oct: a steep, "synthy"
slope that makes cutoff sweeps obvious.

    in ─→ [SVF] ─→ [SVF] ─→ out
            └─ same cutoff, Q, type ─┘

Cutoff and Q are smoothed parameters. Coefficients are recomputed every
CONTROL_CHUNK samples from the ramp's current value, so a 50 ms sweep is
rendered as a staircase of ~75 tiny steps instead of a jump.

Modulation
----------

The router feeds a value m (depth-scaled LFO, held per control chunk). The cutoff
actually used is

    cutoff = base · 2^(2m)

so with a unipolar LFO at depth 1 the filter opens up to two octaves
above the base cutoff and never closes below it.
*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterParam {
    Frequency,
    Q,
}

pub struct FilterNode {
    stages: [SVFilter; 2],
    frequency: SmoothedParam,
    q: SmoothedParam,
    modulation: f32,
}

impl FilterNode {
    pub fn new(filter_type: FilterType, frequency: f32, q: f32) -> Self {
        let mut section = SVFilter::new(filter_type);
        section.set_cutoff(frequency);
        section.set_q(q);

        Self {
            stages: [section; 2],
            frequency: SmoothedParam::new(frequency),
            q: SmoothedParam::new(q),
            modulation: 0.0,
        }
    }

    pub fn lowpass(frequency: f32) -> Self {
        Self::new(FilterType::LowPass, frequency, std::f32::consts::FRAC_1_SQRT_2)
    }

    pub fn set_frequency(&mut self, hz: f32, ramp_samples: u32) {
        self.frequency.ramp_to(hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ), ramp_samples);
    }

    pub fn set_q(&mut self, q: f32, ramp_samples: u32) {
        self.q.ramp_to(q, ramp_samples);
    }

    /// Discrete: applied immediately.
    pub fn set_type(&mut self, filter_type: FilterType) {
        for stage in &mut self.stages {
            stage.set_type(filter_type);
        }
    }

    pub fn filter_type(&self) -> FilterType {
        self.stages[0].filter_type()
    }

    /// Cutoff currently in use, modulation included.
    pub fn effective_cutoff(&self) -> f32 {
        (self.frequency.value() * filter_ratio(self.modulation)).clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)
    }

    pub fn modulation(&self) -> f32 {
        self.modulation
    }
}

impl Modulatable for FilterNode {
    type Param = FilterParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            FilterParam::Frequency => self.frequency.value(),
            FilterParam::Q => self.q.value(),
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, modulation: f32) {
        // Q is not a modulation destination.
        if param == FilterParam::Frequency {
            self.modulation = modulation;
        }
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for chunk in out.chunks_mut(CONTROL_CHUNK) {
            self.frequency.advance(chunk.len());
            let q = self.q.advance(chunk.len());
            let cutoff = self.effective_cutoff();

            for stage in &mut self.stages {
                stage.set_cutoff(cutoff);
                stage.set_q(q);
                stage.render(chunk, ctx.sample_rate);
            }
        }
    }

    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

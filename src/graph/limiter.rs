use crate::{
    dsp::limiter::{PeakLimiter, DEFAULT_RELEASE_SECONDS, DEFAULT_THRESHOLD_DB},
    graph::node::{GraphNode, RenderCtx},
};

/// Terminal node of the chain.
pub struct LimiterNode {
    limiter: PeakLimiter,
}

impl LimiterNode {
    pub fn new(threshold_db: f32, sample_rate: f32) -> Self {
        Self {
            limiter: PeakLimiter::new(threshold_db, DEFAULT_RELEASE_SECONDS, sample_rate),
        }
    }

    pub fn with_defaults(sample_rate: f32) -> Self {
        Self::new(DEFAULT_THRESHOLD_DB, sample_rate)
    }

    pub fn ceiling(&self) -> f32 {
        self.limiter.threshold()
    }
}

impl GraphNode for LimiterNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        self.limiter.render(out);
    }

    fn reset(&mut self) {
        self.limiter.reset();
    }
}

use crate::{
    automation::SmoothedParam,
    dsp::{
        amplify::{apply_gain, db_to_gain},
        modulate::tremolo_db,
    },
    graph::{
        node::{GraphNode, Modulatable, RenderCtx},
        CONTROL_CHUNK,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusParam {
    Volume,
}

/// Main output bus: master volume in dB, tremolo from the router.
///
/// The volume ramp is evaluated in dB and converted to linear gain once
/// per control chunk, so fades sound even rather than rushing at the end.
pub struct BusNode {
    volume_db: SmoothedParam,
    modulation: f32,
}

impl BusNode {
    pub fn new(volume_db: f32) -> Self {
        Self {
            volume_db: SmoothedParam::new(volume_db),
            modulation: 0.0,
        }
    }

    pub fn set_volume(&mut self, db: f32, ramp_samples: u32) {
        self.volume_db.ramp_to(db, ramp_samples);
    }

    /// Gain currently applied, tremolo included.
    pub fn effective_gain(&self) -> f32 {
        db_to_gain(self.volume_db.value() + tremolo_db(self.modulation))
    }
}

impl Modulatable for BusNode {
    type Param = BusParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            BusParam::Volume => self.volume_db.value(),
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, modulation: f32) {
        match param {
            BusParam::Volume => self.modulation = modulation,
        }
    }
}

impl GraphNode for BusNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        for chunk in out.chunks_mut(CONTROL_CHUNK) {
            self.volume_db.advance(chunk.len());
            apply_gain(chunk, self.effective_gain());
        }
    }
}

use crate::{
    dsp::lfo::LfoRange,
    graph::{
        chain::{NodeId, NodeParam, SignalChain},
        node::RenderCtx,
    },
    synth::{
        pool::VoicePool,
        settings::{LfoSettings, LfoTarget, LfoUpdate},
    },
};

/*
Modulation Router
=================

    lfo ──→ depth (gain) ──→ route table ──┬─→ filter.frequency
                                           ├─→ voice[0..N].pitch
                                           └─→ bus.volume

The router owns the ROUTING, not the nodes: the LFO and depth scaler live
in the chain's arena. What it keeps is a route table of concrete
`ParamHandle`s, resolved from the `LfoTarget` each time routing changes.

Rerouting (target or depth changed)
-----------------------------------

  1. Disconnect: every handle in the table gets modulation 0, then the
     table is cleared. Whatever the old target was, it is back at its base
     value. No pitch drift survives a switch away from pitch.
  2. Set the LFO's output range for the new target, and the scaler's gain
     to the new depth.
  3. If depth > 0, resolve the target into handles and fill the table.
     Depth 0 leaves the table empty: nothing is connected.

The LFO itself keeps running through all of this, so the new target picks
up modulation at the current phase; the largest possible step is one
depth-scaled LFO swing.

The table is allocated once with room for every voice plus one, so
rerouting on the audio thread never allocates.
*/

/// Concrete destination of the modulation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamHandle {
    Node { node: NodeId, param: NodeParam },
    VoicePitch(usize),
}

/// Output range the LFO must run in for a target.
pub fn output_range(target: LfoTarget) -> LfoRange {
    match target {
        LfoTarget::Pitch => LfoRange::BIPOLAR,
        LfoTarget::Filter | LfoTarget::Volume => LfoRange::UNIPOLAR,
    }
}

pub struct ModulationRouter {
    target: LfoTarget,
    depth: f32,
    routes: Vec<ParamHandle>,
    last_value: f32,
}

impl ModulationRouter {
    /// Build the router and connect it for the initial LFO settings.
    pub fn new(settings: &LfoSettings, chain: &mut SignalChain, pool: &mut VoicePool) -> Self {
        let mut router = Self {
            target: settings.target,
            depth: settings.depth,
            routes: Vec::with_capacity(pool.size() + 1),
            last_value: 0.0,
        };
        router.reroute(settings, chain, pool);
        router
    }

    pub fn target(&self) -> LfoTarget {
        self.target
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn routes(&self) -> &[ParamHandle] {
        &self.routes
    }

    pub fn is_connected(&self) -> bool {
        !self.routes.is_empty()
    }

    /// Modulation value sent on the last processed chunk.
    pub fn last_value(&self) -> f32 {
        self.last_value
    }

    /// Apply an effective LFO diff. `settings` already has it merged.
    pub fn apply(
        &mut self,
        diff: &LfoUpdate,
        settings: &LfoSettings,
        chain: &mut SignalChain,
        pool: &mut VoicePool,
        ramp_samples: u32,
    ) {
        if let Some(frequency) = diff.frequency {
            chain.set_lfo_frequency(frequency, ramp_samples);
        }
        if let Some(waveform) = diff.waveform {
            chain.set_lfo_waveform(waveform);
        }
        if diff.changes_routing() {
            self.reroute(settings, chain, pool);
        }
    }

    /// Disconnect everything, then connect to the current target if depth > 0.
    pub fn reroute(&mut self, settings: &LfoSettings, chain: &mut SignalChain, pool: &mut VoicePool) {
        self.disconnect(chain, pool);

        self.target = settings.target;
        self.depth = settings.depth.clamp(0.0, 1.0);
        chain.set_lfo_range(output_range(self.target));
        chain.set_depth(self.depth);

        if self.depth <= 0.0 {
            return;
        }

        match self.target {
            LfoTarget::Filter => self.routes.push(ParamHandle::Node {
                node: NodeId::Filter,
                param: NodeParam::Frequency,
            }),
            LfoTarget::Volume => self.routes.push(ParamHandle::Node {
                node: NodeId::MainBus,
                param: NodeParam::Volume,
            }),
            LfoTarget::Pitch => self.routes.extend((0..pool.size()).map(ParamHandle::VoicePitch)),
        }
    }

    fn disconnect(&mut self, chain: &mut SignalChain, pool: &mut VoicePool) {
        for handle in self.routes.drain(..) {
            send(handle, 0.0, chain, pool);
        }
        self.last_value = 0.0;
    }

    /// Render one control chunk of modulation and deliver it to every route.
    pub fn process(&mut self, frames: usize, chain: &mut SignalChain, pool: &mut VoicePool, ctx: &RenderCtx) {
        // The LFO runs even when disconnected so its phase stays continuous.
        let value = chain.render_modulation(frames, ctx);
        if self.routes.is_empty() {
            return;
        }

        self.last_value = value;
        for &handle in &self.routes {
            send(handle, value, chain, pool);
        }
    }
}

fn send(handle: ParamHandle, value: f32, chain: &mut SignalChain, pool: &mut VoicePool) {
    match handle {
        ParamHandle::Node { node, param } => {
            chain.set_modulation(node, param, value);
        }
        ParamHandle::VoicePitch(index) => {
            pool.set_pitch_modulation(index, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::settings::SynthSettings;

    const SR: f32 = 48_000.0;

    struct Rig {
        settings: SynthSettings,
        chain: SignalChain,
        pool: VoicePool,
        router: ModulationRouter,
    }

    fn rig() -> Rig {
        let settings = SynthSettings::default();
        let mut chain = SignalChain::new(&settings, SR);
        let mut pool = VoicePool::new(4, &settings, SR);
        let router = ModulationRouter::new(&settings.lfo, &mut chain, &mut pool);
        Rig { settings, chain, pool, router }
    }

    impl Rig {
        fn update(&mut self, update: LfoUpdate) {
            let diff = update.merge_into(&mut self.settings.lfo);
            self.router
                .apply(&diff, &self.settings.lfo, &mut self.chain, &mut self.pool, 2_400);
        }

        fn run(&mut self, blocks: usize) {
            for _ in 0..blocks {
                self.router
                    .process(256, &mut self.chain, &mut self.pool, &RenderCtx::at(SR, 0.0));
            }
        }
    }

    #[test]
    fn ranges_per_target() {
        assert_eq!(output_range(LfoTarget::Pitch), LfoRange::BIPOLAR);
        assert_eq!(output_range(LfoTarget::Filter), LfoRange::UNIPOLAR);
        assert_eq!(output_range(LfoTarget::Volume), LfoRange::UNIPOLAR);
    }

    #[test]
    fn default_depth_zero_is_disconnected() {
        let rig = rig();
        assert!(!rig.router.is_connected());
    }

    #[test]
    fn pitch_fans_out_to_every_voice() {
        let mut rig = rig();
        rig.update(LfoUpdate {
            target: Some(LfoTarget::Pitch),
            depth: Some(0.5),
            ..Default::default()
        });

        assert_eq!(rig.router.routes().len(), 4);
        assert!(rig.router.routes().iter().all(|r| matches!(r, ParamHandle::VoicePitch(_))));
        assert_eq!(rig.chain.lfo().map(|l| l.range()), Some(LfoRange::BIPOLAR));
    }

    #[test]
    fn switching_pitch_to_filter_leaves_no_pitch_drift() {
        let mut rig = rig();
        rig.update(LfoUpdate {
            target: Some(LfoTarget::Pitch),
            depth: Some(0.5),
            ..Default::default()
        });
        rig.run(20);
        assert!(rig.pool.voices().iter().any(|v| v.generator().pitch_ratio() != 1.0));

        rig.update(LfoUpdate {
            target: Some(LfoTarget::Filter),
            ..Default::default()
        });
        assert_eq!(
            rig.router.routes(),
            &[ParamHandle::Node { node: NodeId::Filter, param: NodeParam::Frequency }]
        );

        rig.run(20);
        assert!(rig.pool.voices().iter().all(|v| v.generator().pitch_ratio() == 1.0));
        let filter = rig.chain.filter().map(|f| f.modulation()).unwrap_or_default();
        assert!(filter > 0.0 && filter <= 0.5);
        assert_eq!(rig.chain.lfo().map(|l| l.range()), Some(LfoRange::UNIPOLAR));
    }

    #[test]
    fn depth_zero_disconnects_and_clears_target() {
        let mut rig = rig();
        rig.update(LfoUpdate {
            target: Some(LfoTarget::Volume),
            depth: Some(1.0),
            ..Default::default()
        });
        rig.run(4);
        assert!(rig.router.is_connected());

        rig.update(LfoUpdate {
            depth: Some(0.0),
            ..Default::default()
        });
        assert!(!rig.router.is_connected());
        let gain = rig.chain.bus().map(|b| b.effective_gain()).unwrap_or_default();
        assert!((gain - crate::dsp::amplify::db_to_gain(-6.0)).abs() < 1e-5);

        rig.update(LfoUpdate {
            depth: Some(0.3),
            ..Default::default()
        });
        assert_eq!(
            rig.router.routes(),
            &[ParamHandle::Node { node: NodeId::MainBus, param: NodeParam::Volume }]
        );
    }

    #[test]
    fn frequency_change_does_not_reroute() {
        let mut rig = rig();
        rig.update(LfoUpdate {
            depth: Some(0.4),
            ..Default::default()
        });
        let before = rig.router.routes().to_vec();
        rig.update(LfoUpdate {
            frequency: Some(9.0),
            ..Default::default()
        });
        assert_eq!(rig.router.routes(), before.as_slice());
    }
}

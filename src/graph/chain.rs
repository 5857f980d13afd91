//! The signal chain: an arena of owned nodes with a fixed topology.

/*
Signal Chain
============

    voices ─→ distortion ─→ delay ─→ reverb ─→ filter ─→ main bus ─→ limiter ─→ out

    lfo ─→ lfo depth ─→ (router-chosen target)

Every node lives in one slot of a fixed arena, addressed by `NodeId`. The
audio edges are a property of the id (`NodeId::downstream`) and never
change; rendering walks them from the head of the path. The only moving
connection is the depth scaler's output, which belongs to the modulation
router and is resolved to concrete `ParamHandle`s there.

Lifetime
--------

Nodes are created once in CREATION_ORDER and released in the reverse
order. A released slot is `None`, so releasing twice is a no-op, and a
chain with missing nodes renders silence instead of touching freed state.
*/

use crate::{
    dsp::{
        filter::FilterType,
        lfo::LfoRange,
        modulate::block_average,
        oscillator::OscillatorWaveform,
    },
    graph::{
        bus::{BusNode, BusParam},
        delay::DelayNode,
        distortion::DistortionNode,
        filter::{FilterNode, FilterParam},
        gain::GainNode,
        lfo::LfoNode,
        limiter::LimiterNode,
        node::{GraphNode, Modulatable, RenderCtx},
        reverb::ReverbNode,
    },
    synth::settings::{EffectsSettings, SynthSettings},
    MAX_BLOCK_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    MainBus,
    Limiter,
    Filter,
    Reverb,
    Delay,
    Distortion,
    Lfo,
    LfoDepth,
}

impl NodeId {
    pub const COUNT: usize = 8;

    pub const CREATION_ORDER: [NodeId; NodeId::COUNT] = [
        NodeId::MainBus,
        NodeId::Limiter,
        NodeId::Filter,
        NodeId::Reverb,
        NodeId::Delay,
        NodeId::Distortion,
        NodeId::Lfo,
        NodeId::LfoDepth,
    ];

    /// Where voices enter the chain.
    pub const AUDIO_HEAD: NodeId = NodeId::Distortion;

    /// Fixed audio edge out of this node. The limiter feeds the device and
    /// the depth scaler is routed dynamically, so both return `None`.
    pub fn downstream(self) -> Option<NodeId> {
        match self {
            NodeId::Distortion => Some(NodeId::Delay),
            NodeId::Delay => Some(NodeId::Reverb),
            NodeId::Reverb => Some(NodeId::Filter),
            NodeId::Filter => Some(NodeId::MainBus),
            NodeId::MainBus => Some(NodeId::Limiter),
            NodeId::Lfo => Some(NodeId::LfoDepth),
            NodeId::Limiter | NodeId::LfoDepth => None,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Modulatable parameter of a chain node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeParam {
    Frequency,
    Volume,
}

pub enum ChainNode {
    Filter(FilterNode),
    Reverb(ReverbNode),
    Delay(DelayNode),
    Distortion(DistortionNode),
    MainBus(BusNode),
    Limiter(LimiterNode),
    Lfo(LfoNode),
    Gain(GainNode),
}

impl ChainNode {
    fn as_graph_node(&mut self) -> &mut dyn GraphNode {
        match self {
            ChainNode::Filter(node) => node,
            ChainNode::Reverb(node) => node,
            ChainNode::Delay(node) => node,
            ChainNode::Distortion(node) => node,
            ChainNode::MainBus(node) => node,
            ChainNode::Limiter(node) => node,
            ChainNode::Lfo(node) => node,
            ChainNode::Gain(node) => node,
        }
    }
}

pub struct SignalChain {
    nodes: [Option<ChainNode>; NodeId::COUNT],
    sample_rate: f32,
    lfo_scratch: Vec<f32>,
}

impl SignalChain {
    /// Build every node from the current patch.
    pub fn new(settings: &SynthSettings, sample_rate: f32) -> Self {
        let mut nodes: [Option<ChainNode>; NodeId::COUNT] = Default::default();

        for id in NodeId::CREATION_ORDER {
            let node = match id {
                NodeId::MainBus => ChainNode::MainBus(BusNode::new(settings.volume)),
                NodeId::Limiter => ChainNode::Limiter(LimiterNode::with_defaults(sample_rate)),
                NodeId::Filter => ChainNode::Filter(FilterNode::new(
                    settings.filter.filter_type,
                    settings.filter.frequency,
                    settings.filter.q,
                )),
                NodeId::Reverb => ChainNode::Reverb(ReverbNode::with_defaults(sample_rate)),
                NodeId::Delay => ChainNode::Delay(DelayNode::with_defaults(sample_rate)),
                NodeId::Distortion => ChainNode::Distortion(DistortionNode::default()),
                NodeId::Lfo => {
                    let mut lfo = LfoNode::new(settings.lfo.waveform, settings.lfo.frequency);
                    lfo.set_range(LfoRange::UNIPOLAR);
                    ChainNode::Lfo(lfo)
                }
                NodeId::LfoDepth => ChainNode::Gain(GainNode::new(settings.lfo.depth)),
            };
            nodes[id.slot()] = Some(node);
        }

        let mut chain = Self {
            nodes,
            sample_rate,
            lfo_scratch: vec![0.0; MAX_BLOCK_SIZE],
        };
        chain.apply_effects(&settings.effects, 0);
        chain
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn node(&self, id: NodeId) -> Option<&ChainNode> {
        self.nodes[id.slot()].as_ref()
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut ChainNode> {
        self.nodes[id.slot()].as_mut()
    }

    /// Nodes on the audio path, in processing order.
    pub fn audio_path(&self) -> impl Iterator<Item = NodeId> {
        std::iter::successors(Some(NodeId::AUDIO_HEAD), |id| id.downstream())
    }

    pub fn is_disposed(&self) -> bool {
        self.nodes.iter().all(Option::is_none)
    }

    /// Run `buffer` (the summed voices) through the chain in place.
    pub fn process(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let mut next = Some(NodeId::AUDIO_HEAD);
        while let Some(id) = next {
            match self.nodes[id.slot()].as_mut() {
                Some(node) => node.as_graph_node().render_block(buffer, ctx),
                None => {
                    buffer.fill(0.0);
                    return;
                }
            }
            next = id.downstream();
        }
    }

    pub fn filter(&self) -> Option<&FilterNode> {
        match self.node(NodeId::Filter) {
            Some(ChainNode::Filter(node)) => Some(node),
            _ => None,
        }
    }

    pub fn filter_mut(&mut self) -> Option<&mut FilterNode> {
        match self.node_mut(NodeId::Filter) {
            Some(ChainNode::Filter(node)) => Some(node),
            _ => None,
        }
    }

    pub fn bus(&self) -> Option<&BusNode> {
        match self.node(NodeId::MainBus) {
            Some(ChainNode::MainBus(node)) => Some(node),
            _ => None,
        }
    }

    pub fn lfo(&self) -> Option<&LfoNode> {
        match self.node(NodeId::Lfo) {
            Some(ChainNode::Lfo(node)) => Some(node),
            _ => None,
        }
    }

    pub fn lfo_mut(&mut self) -> Option<&mut LfoNode> {
        match self.node_mut(NodeId::Lfo) {
            Some(ChainNode::Lfo(node)) => Some(node),
            _ => None,
        }
    }

    pub fn depth(&self) -> Option<&GainNode> {
        match self.node(NodeId::LfoDepth) {
            Some(ChainNode::Gain(node)) => Some(node),
            _ => None,
        }
    }

    pub fn depth_mut(&mut self) -> Option<&mut GainNode> {
        match self.node_mut(NodeId::LfoDepth) {
            Some(ChainNode::Gain(node)) => Some(node),
            _ => None,
        }
    }

    pub fn set_filter_frequency(&mut self, hz: f32, ramp_samples: u32) {
        if let Some(filter) = self.filter_mut() {
            filter.set_frequency(hz, ramp_samples);
        }
    }

    pub fn set_filter_q(&mut self, q: f32, ramp_samples: u32) {
        if let Some(filter) = self.filter_mut() {
            filter.set_q(q, ramp_samples);
        }
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        if let Some(filter) = self.filter_mut() {
            filter.set_type(filter_type);
        }
    }

    /// Ramp every effect's wet level to its scaled value.
    pub fn apply_effects(&mut self, effects: &EffectsSettings, ramp_samples: u32) {
        for id in [NodeId::Reverb, NodeId::Delay, NodeId::Distortion] {
            self.set_wet(id, effects, ramp_samples);
        }
    }

    fn set_wet(&mut self, id: NodeId, effects: &EffectsSettings, ramp_samples: u32) {
        match self.node_mut(id) {
            Some(ChainNode::Reverb(node)) => node.set_wet(effects.reverb.scaled_wet(), ramp_samples),
            Some(ChainNode::Delay(node)) => node.set_wet(effects.delay.scaled_wet(), ramp_samples),
            Some(ChainNode::Distortion(node)) => {
                node.set_wet(effects.distortion.scaled_wet(), ramp_samples)
            }
            _ => {}
        }
    }

    /// Target wet level of an effect node, `None` for other nodes.
    pub fn wet_target(&self, id: NodeId) -> Option<f32> {
        match self.node(id)? {
            ChainNode::Reverb(node) => Some(node.wet().target()),
            ChainNode::Delay(node) => Some(node.wet().target()),
            ChainNode::Distortion(node) => Some(node.wet().target()),
            _ => None,
        }
    }

    pub fn set_volume(&mut self, db: f32, ramp_samples: u32) {
        if let Some(ChainNode::MainBus(bus)) = self.node_mut(NodeId::MainBus) {
            bus.set_volume(db, ramp_samples);
        }
    }

    pub fn set_lfo_frequency(&mut self, hz: f32, ramp_samples: u32) {
        if let Some(lfo) = self.lfo_mut() {
            lfo.set_frequency(hz, ramp_samples);
        }
    }

    pub fn set_lfo_waveform(&mut self, waveform: OscillatorWaveform) {
        if let Some(lfo) = self.lfo_mut() {
            lfo.set_waveform(waveform);
        }
    }

    pub fn set_lfo_range(&mut self, range: LfoRange) {
        if let Some(lfo) = self.lfo_mut() {
            lfo.set_range(range);
        }
    }

    pub fn set_depth(&mut self, depth: f32) {
        if let Some(gain) = self.depth_mut() {
            gain.set_gain(depth);
        }
    }

    /// Render `frames` of LFO through the depth scaler and return the
    /// average: the modulation value for this control chunk.
    pub fn render_modulation(&mut self, frames: usize, ctx: &RenderCtx) -> f32 {
        let frames = frames.min(self.lfo_scratch.len());
        let scratch = &mut self.lfo_scratch[..frames];

        let mut next = Some(NodeId::Lfo);
        while let Some(id) = next {
            match self.nodes[id.slot()].as_mut() {
                Some(node) => node.as_graph_node().render_block(scratch, ctx),
                None => return 0.0,
            }
            next = id.downstream();
        }
        block_average(scratch)
    }

    /// Drive a node parameter with the current modulation value. Returns
    /// false when the node/param pair is not a modulation destination.
    pub fn set_modulation(&mut self, id: NodeId, param: NodeParam, modulation: f32) -> bool {
        match (self.node_mut(id), param) {
            (Some(ChainNode::Filter(filter)), NodeParam::Frequency) => {
                filter.apply_modulation(FilterParam::Frequency, modulation);
                true
            }
            (Some(ChainNode::MainBus(bus)), NodeParam::Volume) => {
                bus.apply_modulation(BusParam::Volume, modulation);
                true
            }
            _ => false,
        }
    }

    /// Clear delay lines and filter memory without touching parameters.
    pub fn reset(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            node.as_graph_node().reset();
        }
    }

    /// Release every node in reverse creation order. Returns how many
    /// were released by this call; a second call returns 0.
    pub fn dispose(&mut self) -> usize {
        NodeId::CREATION_ORDER
            .iter()
            .rev()
            .filter(|id| self.nodes[id.slot()].take().is_some())
            .count()
    }
}

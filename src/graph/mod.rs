//! Signal-chain nodes and the arena that wires them together.
//!
//! Nodes wrap the low-level DSP primitives with what the engine needs on
//! top: smoothed parameters, modulation inputs, and block rendering. The
//! `chain` module owns every node and the fixed topology between them.

/// Main output bus (master volume, tremolo destination).
pub mod bus;
/// Node arena, topology and lifetime.
pub mod chain;
/// Feedback delay effect.
pub mod delay;
/// Waveshaping distortion effect.
pub mod distortion;
/// 24 dB/oct cascaded state-variable filter.
pub mod filter;
/// Constant gain stage (LFO depth).
pub mod gain;
/// Low frequency oscillator with a selectable output range.
pub mod lfo;
/// Output peak limiter.
pub mod limiter;
/// Core traits shared by all graph nodes.
pub mod node;
/// Pre-delayed Schroeder reverb effect.
pub mod reverb;

/// Samples between control-rate coefficient updates inside a block.
pub const CONTROL_CHUNK: usize = 32;

pub use chain::{NodeId, NodeParam, SignalChain};
pub use node::{GraphNode, Modulatable, RenderCtx};

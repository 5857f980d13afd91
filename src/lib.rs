pub mod automation; // Click-free parameter ramps
pub mod dsp;
pub mod engine; // Public facade, audio backends, processor
pub mod graph; // Effects chain nodes and routing arena
pub mod synth; // Voices, generators, settings, modulation routing

pub use engine::{Engine, EngineConfig, EngineError, EngineState};
pub use synth::settings::SynthSettings;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const MAX_DELAY_SAMPLES: usize = 96_000;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

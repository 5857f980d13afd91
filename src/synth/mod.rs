//! Everything that makes notes: the patch, the voices and the LFO routing.

/// Voice sound sources (subtractive, FM, AM).
pub mod generator;
/// Control-to-audio thread commands.
pub mod message;
/// LFO route table.
pub mod modulation;
/// Note names and the MIDI frequency table.
pub mod notes;
/// Fixed-size voice pool with oldest-first stealing.
pub mod pool;
/// Patch settings and partial updates.
pub mod settings;
/// A single pool slot.
pub mod voice;

pub use generator::{Generator, GeneratorKind};
pub use message::EngineCommand;
pub use modulation::{ModulationRouter, ParamHandle};
pub use notes::{Note, NoteTable};
pub use pool::VoicePool;
pub use settings::SynthSettings;

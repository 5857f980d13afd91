//! Scenario benchmarks.
//!
//! Full voice pools and the complete audio-thread processor under the
//! kinds of load a player produces: big chords, every effect on, LFO
//! routed to every voice.

mod engine;
mod voices;

pub use engine::bench_engine;
pub use voices::bench_voices;

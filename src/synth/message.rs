use crate::synth::{
    notes::Note,
    settings::{EffectsUpdate, EnvelopeUpdate, FilterUpdate, LfoUpdate, OscillatorUpdate},
};

/// Commands sent from the control thread to the audio thread.
///
/// Everything is `Copy` so the ring buffer moves plain bytes and the audio
/// thread never frees anything it receives. Updates carry only the fields
/// that changed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EngineCommand {
    NoteOn { note: Note, velocity: f32 },
    NoteOff { note: Note },
    Panic,
    Oscillator(OscillatorUpdate),
    Envelope(EnvelopeUpdate),
    Filter(FilterUpdate),
    Effects(EffectsUpdate),
    Lfo(LfoUpdate),
    /// Master volume in dB.
    Volume(f32),
}

pub trait CommandReceiver {
    fn pop(&mut self) -> Option<EngineCommand>;
}

impl CommandReceiver for rtrb::Consumer<EngineCommand> {
    fn pop(&mut self) -> Option<EngineCommand> {
        rtrb::Consumer::pop(self).ok()
    }
}

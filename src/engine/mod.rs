//! The public engine facade.
//!
//! `Engine` lives on the control thread. It owns the patch, validates and
//! merges every request, and forwards only what changed to the audio
//! thread through a single-producer ring buffer. The audio side
//! (`EngineProcessor`) is owned by whichever `AudioBackend` is running it.
//!
//! ```text
//!   UI / input ──→ Engine ──(rtrb)──→ EngineProcessor ──→ backend ──→ device
//!                  │ settings          │ settings mirror
//!                  │ lifecycle         │ voices, chain, router
//! ```
//!
//! Lifecycle: `Uninitialized → Initializing → Ready → Disposed`, falling
//! back to `Uninitialized` when the device cannot be started. Patch updates
//! issued before `Ready` are merged and take effect when the processor is
//! built; note events outside `Ready` are dropped with `NotReady`.

pub mod backend;
pub mod config;
pub mod error;
pub mod processor;

use rtrb::{Producer, RingBuffer};
use tracing::{debug, error, info, warn};

pub use self::{
    backend::{AudioBackend, CpalBackend, OfflineBackend, OfflineRenderer},
    config::EngineConfig,
    error::{EngineError, EngineState},
    processor::EngineProcessor,
};
use crate::synth::{
    generator::GeneratorKind,
    message::EngineCommand,
    notes::{Note, NoteTable},
    settings::{EffectsUpdate, EnvelopeUpdate, FilterUpdate, LfoUpdate, OscillatorUpdate, SynthSettings},
};

pub struct Engine {
    config: EngineConfig,
    state: EngineState,
    settings: SynthSettings,
    notes: NoteTable,
    producer: Option<Producer<EngineCommand>>,
    backend: Option<Box<dyn AudioBackend>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_settings(config, SynthSettings::default())
    }

    pub fn with_settings(config: EngineConfig, settings: SynthSettings) -> Self {
        Self {
            config,
            state: EngineState::Uninitialized,
            settings,
            notes: NoteTable::standard(),
            producer: None,
            backend: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    pub fn settings(&self) -> &SynthSettings {
        &self.settings
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn notes(&self) -> &NoteTable {
        &self.notes
    }

    pub fn sample_rate(&self) -> Option<f32> {
        self.backend.as_ref().map(|b| b.sample_rate())
    }

    /// Open the default output device and start rendering.
    pub fn initialize_audio(&mut self) -> Result<(), EngineError> {
        if !self.begin_initialization()? {
            return Ok(());
        }
        match CpalBackend::open() {
            Ok(backend) => self.finish_initialization(Box::new(backend)),
            Err(err) => Err(self.fail_initialization(err)),
        }
    }

    /// Start rendering on a caller-supplied backend.
    pub fn initialize_with(&mut self, backend: impl AudioBackend + 'static) -> Result<(), EngineError> {
        if !self.begin_initialization()? {
            return Ok(());
        }
        self.finish_initialization(Box::new(backend))
    }

    /// Ok(false) when there is nothing to do.
    fn begin_initialization(&mut self) -> Result<bool, EngineError> {
        match self.state {
            EngineState::Uninitialized => {
                self.state = EngineState::Initializing;
                debug!("initializing audio engine");
                Ok(true)
            }
            EngineState::Initializing | EngineState::Ready => {
                debug!(state = %self.state, "initialize ignored");
                Ok(false)
            }
            EngineState::Disposed => Err(EngineError::NotReady { state: self.state }),
        }
    }

    fn finish_initialization(&mut self, mut backend: Box<dyn AudioBackend>) -> Result<(), EngineError> {
        let sample_rate = backend.sample_rate();
        let (producer, consumer) = RingBuffer::<EngineCommand>::new(self.config.command_capacity.max(1));
        let processor = EngineProcessor::new(&self.config, &self.settings, sample_rate, consumer);

        if let Err(err) = backend.start(processor) {
            return Err(self.fail_initialization(err));
        }

        self.producer = Some(producer);
        self.backend = Some(backend);
        self.state = EngineState::Ready;
        info!(
            sample_rate,
            voices = self.config.voices(),
            smoothing_ms = self.config.smoothing_ms,
            "audio engine ready"
        );
        Ok(())
    }

    fn fail_initialization(&mut self, err: EngineError) -> EngineError {
        error!(%err, "audio engine initialization failed");
        self.state = EngineState::Uninitialized;
        err
    }

    fn require_ready(&self, operation: &'static str) -> Result<(), EngineError> {
        if self.state == EngineState::Ready {
            return Ok(());
        }
        warn!(operation, state = %self.state, "dropped: engine not ready");
        Err(EngineError::NotReady { state: self.state })
    }

    fn send(&mut self, command: EngineCommand) -> Result<(), EngineError> {
        let Some(producer) = self.producer.as_mut() else {
            return Err(EngineError::NotReady { state: self.state });
        };
        producer.push(command).map_err(|_| {
            warn!(?command, "dropped: command queue full");
            EngineError::QueueFull
        })
    }

    fn resolve(&self, name: &str) -> Result<Note, EngineError> {
        self.notes.lookup(name).inspect_err(|_| debug!(note = name, "ignored unknown note"))
    }

    /// Trigger `note` (e.g. "C4", "A#4", "Bb3"). Velocity is 0..1.
    pub fn note_on(&mut self, note: &str, velocity: f32) -> Result<(), EngineError> {
        self.require_ready("note_on")?;
        let note = self.resolve(note)?;
        self.send(EngineCommand::NoteOn {
            note,
            velocity: velocity.clamp(0.0, 1.0),
        })
    }

    pub fn note_off(&mut self, note: &str) -> Result<(), EngineError> {
        self.require_ready("note_off")?;
        let note = self.resolve(note)?;
        self.send(EngineCommand::NoteOff { note })
    }

    /// Silence every voice now (with its release tail).
    pub fn panic(&mut self) -> Result<(), EngineError> {
        self.require_ready("panic")?;
        debug!("panic");
        self.send(EngineCommand::Panic)
    }

    /// Forward the effective diff once ready, then keep `next` as the retained
    /// settings. A command the queue refuses leaves the settings untouched.
    fn forward(
        &mut self,
        operation: &'static str,
        next: SynthSettings,
        command: EngineCommand,
        is_empty: bool,
    ) -> Result<(), EngineError> {
        match self.state {
            EngineState::Ready if is_empty => {}
            EngineState::Ready => self.send(command)?,
            EngineState::Disposed => return Err(EngineError::NotReady { state: self.state }),
            EngineState::Uninitialized | EngineState::Initializing => {
                debug!(operation, state = %self.state, "settings merged, applied on initialization");
            }
        }
        self.settings = next;
        Ok(())
    }

    fn reject_if_disposed(&self, operation: &'static str) -> Result<(), EngineError> {
        if self.state == EngineState::Disposed {
            warn!(operation, "dropped: engine disposed");
            return Err(EngineError::NotReady { state: self.state });
        }
        Ok(())
    }

    pub fn update_oscillator(&mut self, update: OscillatorUpdate) -> Result<(), EngineError> {
        self.reject_if_disposed("update_oscillator")?;
        let mut next = self.settings;
        let diff = update.merge_into(&mut next.oscillator);
        let before = GeneratorKind::from_settings(&self.settings.oscillator);
        let after = GeneratorKind::from_settings(&next.oscillator);
        self.forward("update_oscillator", next, EngineCommand::Oscillator(diff), diff.is_empty())?;
        if before != after && self.is_ready() {
            info!(from = ?before, to = ?after, "oscillator mode switch, rebuilding voices");
        }
        Ok(())
    }

    pub fn update_envelope(&mut self, update: EnvelopeUpdate) -> Result<(), EngineError> {
        self.reject_if_disposed("update_envelope")?;
        let mut next = self.settings;
        let diff = update.merge_into(&mut next.envelope);
        self.forward("update_envelope", next, EngineCommand::Envelope(diff), diff.is_empty())
    }

    pub fn update_filter(&mut self, update: FilterUpdate) -> Result<(), EngineError> {
        self.reject_if_disposed("update_filter")?;
        let mut next = self.settings;
        let diff = update.merge_into(&mut next.filter);
        self.forward("update_filter", next, EngineCommand::Filter(diff), diff.is_empty())
    }

    pub fn update_effects(&mut self, update: EffectsUpdate) -> Result<(), EngineError> {
        self.reject_if_disposed("update_effects")?;
        let mut next = self.settings;
        let diff = update.merge_into(&mut next.effects);
        self.forward("update_effects", next, EngineCommand::Effects(diff), diff.is_empty())
    }

    pub fn update_lfo(&mut self, update: LfoUpdate) -> Result<(), EngineError> {
        self.reject_if_disposed("update_lfo")?;
        let mut next = self.settings;
        let diff = update.merge_into(&mut next.lfo);
        self.forward("update_lfo", next, EngineCommand::Lfo(diff), diff.is_empty())?;
        if diff.changes_routing() {
            debug!(lfo_target = ?next.lfo.target, depth = next.lfo.depth, "lfo reroute");
        }
        Ok(())
    }

    /// Master volume in dB.
    pub fn update_volume(&mut self, db: f32) -> Result<(), EngineError> {
        self.reject_if_disposed("update_volume")?;
        let unchanged = self.settings.volume == db;
        let next = SynthSettings {
            volume: db,
            ..self.settings
        };
        self.forward("update_volume", next, EngineCommand::Volume(db), unchanged)
    }

    /// Release voices and chain nodes and close the device. Idempotent.
    pub fn dispose(&mut self) {
        if self.state == EngineState::Disposed {
            return;
        }

        if self.state == EngineState::Ready {
            if let Err(err) = self.send(EngineCommand::Panic) {
                debug!(%err, "panic before dispose not delivered");
            }
        }

        if let Some(mut backend) = self.backend.take() {
            backend.stop();
            debug!("backend stopped, voices and chain released");
        }
        self.producer = None;
        self.state = EngineState::Disposed;
        info!("audio engine disposed");
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_before_ready_are_rejected() {
        let mut engine = Engine::default();
        assert_eq!(
            engine.note_on("C4", 1.0),
            Err(EngineError::NotReady { state: EngineState::Uninitialized })
        );
        assert!(engine.panic().is_err());
    }

    #[test]
    fn updates_before_ready_are_merged() {
        let mut engine = Engine::default();
        engine
            .update_filter(FilterUpdate {
                frequency: Some(900.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(engine.settings().filter.frequency, 900.0);
    }

    #[test]
    fn dispose_without_init_is_clean() {
        let mut engine = Engine::default();
        engine.dispose();
        engine.dispose();
        assert_eq!(engine.state(), EngineState::Disposed);
        assert!(engine.update_volume(-3.0).is_err());
        assert_eq!(
            engine.initialize_with(OfflineBackend::new(48_000.0).0),
            Err(EngineError::NotReady { state: EngineState::Disposed })
        );
    }
}

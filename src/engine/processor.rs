//! The audio-thread half of the engine.

/*
Engine Processor
================

Everything that runs inside the audio callback. Per `process` call:

    1. drain the command queue (note events, patch diffs)
    2. for each control chunk of CONTROL_CHUNK frames:
         router.process   LFO → depth → chunk average → targets
         pool.render      sum of every sounding voice
         chain.process    distortion → delay → reverb → filter → bus → limiter

Modulation is delivered once per control chunk, so its resolution does not
depend on the buffer size the device asks for.

No locks, no allocation, no logging. The processor keeps its own mirror of
the patch so a diff carrying one field can be applied against the rest.

Teardown order is voices first, then chain nodes (reverse creation order).
It runs on drop, so whoever owns the processor last releases it correctly.
*/

use crate::{
    engine::config::EngineConfig,
    graph::{chain::SignalChain, node::RenderCtx, CONTROL_CHUNK},
    synth::{
        message::{CommandReceiver, EngineCommand},
        modulation::ModulationRouter,
        notes::Note,
        pool::VoicePool,
        settings::SynthSettings,
    },
};

pub struct EngineProcessor {
    commands: Box<dyn CommandReceiver + Send>,
    settings: SynthSettings,
    pool: VoicePool,
    chain: SignalChain,
    router: ModulationRouter,
    sample_rate: f32,
    ramp_samples: u32,
    time: f64,
    disposed: bool,
}

impl EngineProcessor {
    pub fn new(
        config: &EngineConfig,
        settings: &SynthSettings,
        sample_rate: f32,
        commands: impl CommandReceiver + Send + 'static,
    ) -> Self {
        let mut chain = SignalChain::new(settings, sample_rate);
        let mut pool = VoicePool::new(config.voices(), settings, sample_rate);
        let router = ModulationRouter::new(&settings.lfo, &mut chain, &mut pool);

        Self {
            commands: Box::new(commands),
            settings: *settings,
            pool,
            chain,
            router,
            sample_rate,
            ramp_samples: config.ramp_samples(sample_rate),
            time: 0.0,
            disposed: false,
        }
    }

    /// Render mono audio into `out`, applying pending commands first.
    pub fn process(&mut self, out: &mut [f32]) {
        if self.disposed {
            out.fill(0.0);
            return;
        }

        while let Some(command) = self.commands.pop() {
            self.handle(command);
        }

        for chunk in out.chunks_mut(CONTROL_CHUNK) {
            self.render_chunk(chunk);
        }
    }

    fn render_chunk(&mut self, chunk: &mut [f32]) {
        let ctx = RenderCtx::at(self.sample_rate, self.time);

        self.router
            .process(chunk.len(), &mut self.chain, &mut self.pool, &ctx);
        self.pool.render(chunk, &ctx);
        self.chain.process(chunk, &ctx);

        self.time += chunk.len() as f64 / self.sample_rate as f64;
    }

    /// Apply one command immediately.
    pub fn handle(&mut self, command: EngineCommand) {
        let ramp = self.ramp_samples;
        match command {
            EngineCommand::NoteOn { note, velocity } => {
                self.pool.note_on(note, velocity, &self.settings);
            }
            EngineCommand::NoteOff { note } => {
                self.pool.note_off(note);
            }
            EngineCommand::Panic => {
                self.pool.panic();
            }
            EngineCommand::Oscillator(update) => {
                let diff = update.merge_into(&mut self.settings.oscillator);
                if !diff.is_empty() {
                    self.pool
                        .apply_oscillator(&diff, &self.settings.oscillator, &self.settings.envelope, ramp);
                }
            }
            EngineCommand::Envelope(update) => {
                if !update.merge_into(&mut self.settings.envelope).is_empty() {
                    self.pool.apply_envelope(&self.settings.envelope);
                }
            }
            EngineCommand::Filter(update) => {
                let diff = update.merge_into(&mut self.settings.filter);
                if let Some(frequency) = diff.frequency {
                    self.chain.set_filter_frequency(frequency, ramp);
                }
                if let Some(q) = diff.q {
                    self.chain.set_filter_q(q, ramp);
                }
                if let Some(filter_type) = diff.filter_type {
                    self.chain.set_filter_type(filter_type);
                }
            }
            EngineCommand::Effects(update) => {
                if !update.merge_into(&mut self.settings.effects).is_empty() {
                    self.chain.apply_effects(&self.settings.effects, ramp);
                }
            }
            EngineCommand::Lfo(update) => {
                let diff = update.merge_into(&mut self.settings.lfo);
                self.router
                    .apply(&diff, &self.settings.lfo, &mut self.chain, &mut self.pool, ramp);
            }
            EngineCommand::Volume(db) => {
                self.settings.volume = db;
                self.chain.set_volume(db, ramp);
            }
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn settings(&self) -> &SynthSettings {
        &self.settings
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    pub fn chain(&self) -> &SignalChain {
        &self.chain
    }

    pub fn router(&self) -> &ModulationRouter {
        &self.router
    }

    pub fn active_notes(&self) -> impl Iterator<Item = Note> + '_ {
        self.pool.active_notes()
    }

    pub fn elapsed(&self) -> f64 {
        self.time
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release voices, then chain nodes. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.pool.dispose();
        self.chain.dispose();
        self.disposed = true;
    }
}

impl Drop for EngineProcessor {
    fn drop(&mut self) {
        self.dispose();
    }
}

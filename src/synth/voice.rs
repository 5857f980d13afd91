use crate::{
    graph::node::{GraphNode, RenderCtx},
    synth::{generator::Generator, notes::Note},
};

/// One slot of the voice pool.
///
/// `active` and `note` describe the voice's logical assignment: a voice is
/// active from note-on until its note-off (or panic), even though its
/// generator keeps sounding through the release tail afterwards. `stamp`
/// orders triggers; the smallest stamp is the oldest voice.
#[derive(Debug, Clone, Copy)]
pub struct Voice {
    generator: Generator,
    note: Option<Note>,
    velocity: f32,
    stamp: u64,
    active: bool,
}

impl Voice {
    pub fn new(generator: Generator) -> Self {
        Self {
            generator,
            note: None,
            velocity: 0.0,
            stamp: 0,
            active: false,
        }
    }

    pub fn start(&mut self, note: Note, velocity: f32, stamp: u64, sample_rate: f32) {
        self.note = Some(note);
        self.velocity = velocity;
        self.stamp = stamp;
        self.active = true;

        let ctx = RenderCtx::from_freq(sample_rate, note.frequency(), velocity);
        self.generator.note_on(&ctx);
    }

    /// Release the generator and clear the assignment.
    pub fn release(&mut self, sample_rate: f32) {
        let frequency = self.note.map_or(0.0, Note::frequency);
        let ctx = RenderCtx::from_freq(sample_rate, frequency, self.velocity);
        self.generator.note_off(&ctx);

        self.active = false;
        self.note = None;
    }

    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.generator.render_block(out, ctx);
    }

    pub fn note(&self) -> Option<Note> {
        self.note
    }

    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Still producing sound (includes the release tail).
    pub fn is_sounding(&self) -> bool {
        self.generator.is_active()
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut Generator {
        &mut self.generator
    }

    /// Swap in a freshly built generator. The old one is dropped as is.
    pub fn replace_generator(&mut self, generator: Generator) {
        self.generator = generator;
    }
}

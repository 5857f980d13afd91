use crate::{
    dsp::mix::sum_in_place,
    graph::node::RenderCtx,
    synth::{
        generator::{Generator, GeneratorKind},
        notes::Note,
        settings::{EnvelopeSettings, OscillatorSettings, OscillatorUpdate, SynthSettings},
        voice::Voice,
    },
    MAX_BLOCK_SIZE,
};

/*
Voice Pool
==========

A fixed number of voices, built once, reused forever.

    allocate:   first voice that is not active
                otherwise the active voice with the smallest stamp (steal)

    note_on:    allocate → release it if it was active (steal) → assign
                note + fresh stamp → copy patch into the generator → attack

    note_off:   release EVERY active voice holding the note

    panic:      release every active voice, whatever it holds

Stamps come from a counter that only goes up, so "oldest" is exact even
when two notes land in the same audio block.

A released voice is inactive immediately but keeps rendering its release
tail until the envelope reaches zero; the pool sums every voice that is
still sounding.
*/

/// Result of a note-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteOnOutcome {
    pub voice: usize,
    /// Note that was playing on the stolen voice.
    pub stolen: Option<Note>,
}

pub struct VoicePool {
    voices: Vec<Voice>,
    next_stamp: u64,
    sample_rate: f32,
    scratch: Vec<f32>,
}

impl VoicePool {
    pub fn new(size: usize, settings: &SynthSettings, sample_rate: f32) -> Self {
        let generator = Generator::new(&settings.oscillator, &settings.envelope);
        Self {
            voices: vec![Voice::new(generator); size],
            next_stamp: 0,
            sample_rate,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn size(&self) -> usize {
        self.voices.len()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    /// First inactive voice, else the oldest active one. `None` only for an
    /// empty pool.
    pub fn allocate(&self) -> Option<usize> {
        self.voices.iter().position(|v| !v.is_active()).or_else(|| {
            self.voices
                .iter()
                .enumerate()
                .min_by_key(|(_, v)| v.stamp())
                .map(|(index, _)| index)
        })
    }

    pub fn note_on(&mut self, note: Note, velocity: f32, settings: &SynthSettings) -> Option<NoteOnOutcome> {
        let index = self.allocate()?;
        let sample_rate = self.sample_rate;
        let stamp = self.next_stamp;
        self.next_stamp += 1;

        let voice = &mut self.voices[index];
        let stolen = if voice.is_active() {
            let previous = voice.note();
            voice.release(sample_rate);
            previous
        } else {
            None
        };

        let generator = voice.generator_mut();
        generator.set_waveform(settings.oscillator.waveform);
        generator.set_envelope(&settings.envelope);
        if let Some(modulation) = settings.oscillator.modulation {
            generator.set_modulation_amount(modulation.amount);
        }

        voice.start(note, velocity.clamp(0.0, 1.0), stamp, sample_rate);
        Some(NoteOnOutcome { voice: index, stolen })
    }

    /// Release every active voice holding `note`. Returns how many.
    pub fn note_off(&mut self, note: Note) -> usize {
        let sample_rate = self.sample_rate;
        let mut released = 0;
        for voice in self.voices.iter_mut().filter(|v| v.is_active() && v.note() == Some(note)) {
            voice.release(sample_rate);
            released += 1;
        }
        released
    }

    /// Release every active voice. Returns how many.
    pub fn panic(&mut self) -> usize {
        let sample_rate = self.sample_rate;
        let mut released = 0;
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.release(sample_rate);
            released += 1;
        }
        released
    }

    pub fn kind(&self) -> Option<GeneratorKind> {
        self.voices.first().map(|v| v.generator().kind())
    }

    /// Apply an oscillator diff. A change of generator kind panics the pool
    /// and rebuilds every generator in place; returns true in that case.
    pub fn apply_oscillator(
        &mut self,
        diff: &OscillatorUpdate,
        oscillator: &OscillatorSettings,
        envelope: &EnvelopeSettings,
        ramp_samples: u32,
    ) -> bool {
        let kind = GeneratorKind::from_settings(oscillator);
        if self.kind().is_some_and(|current| current != kind) {
            self.panic();
            for voice in &mut self.voices {
                let pitch = voice.generator().pitch_ratio();
                let mut generator = Generator::new(oscillator, envelope);
                generator.set_pitch_modulation(12.0 * pitch.log2());
                voice.replace_generator(generator);
            }
            return true;
        }

        for voice in &mut self.voices {
            let generator = voice.generator_mut();
            if let Some(waveform) = diff.waveform {
                generator.set_waveform(waveform);
            }
            if let Some(detune) = diff.detune {
                generator.set_detune(detune, ramp_samples);
            }
            if let Some(Some(modulation)) = diff.modulation {
                generator.set_modulation_amount(modulation.amount);
            }
        }
        false
    }

    pub fn apply_envelope(&mut self, envelope: &EnvelopeSettings) {
        for voice in &mut self.voices {
            voice.generator_mut().set_envelope(envelope);
        }
    }

    /// Pitch modulation for one voice slot, in semitones.
    pub fn set_pitch_modulation(&mut self, index: usize, semitones: f32) -> bool {
        match self.voices.get_mut(index) {
            Some(voice) => {
                voice.generator_mut().set_pitch_modulation(semitones);
                true
            }
            None => false,
        }
    }

    /// Sum every sounding voice into `out` (overwritten).
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        out.fill(0.0);
        for chunk in out.chunks_mut(self.scratch.len()) {
            let scratch = &mut self.scratch[..chunk.len()];
            for voice in &mut self.voices {
                // A tail can end mid-block, so check before rendering.
                let sounding = voice.is_sounding();
                voice.render(scratch, ctx);
                if sounding {
                    sum_in_place(chunk, scratch);
                }
            }
        }
    }

    pub fn active_notes(&self) -> impl Iterator<Item = Note> + '_ {
        self.voices.iter().filter(|v| v.is_active()).filter_map(Voice::note)
    }

    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn sounding_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_sounding()).count()
    }

    /// Drop every voice. Returns how many were released by this call.
    pub fn dispose(&mut self) -> usize {
        self.panic();
        let count = self.voices.len();
        self.voices.clear();
        self.voices.shrink_to_fit();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::settings::{ModulationKind, ModulationSettings};

    const SR: f32 = 48_000.0;

    fn note(name: &str) -> Note {
        name.parse().unwrap()
    }

    fn pool(size: usize) -> (VoicePool, SynthSettings) {
        let settings = SynthSettings::default();
        (VoicePool::new(size, &settings, SR), settings)
    }

    #[test]
    fn oldest_voice_is_stolen() {
        let (mut pool, settings) = pool(2);
        pool.note_on(note("C4"), 1.0, &settings);
        pool.note_on(note("D4"), 1.0, &settings);
        let outcome = pool.note_on(note("E4"), 1.0, &settings).unwrap();

        assert_eq!(outcome.voice, 0);
        assert_eq!(outcome.stolen, Some(note("C4")));
        assert_eq!(pool.note_off(note("C4")), 0);

        let mut active: Vec<String> = pool.active_notes().map(|n| n.to_string()).collect();
        active.sort();
        assert_eq!(active, vec!["D4", "E4"]);
    }

    #[test]
    fn stolen_voice_glides_from_the_old_pitch() {
        let (mut pool, settings) = pool(1);
        pool.note_on(note("A4"), 1.0, &settings);
        let mut buffer = vec![0.0; 4_800];
        pool.render(&mut buffer, &RenderCtx::at(SR, 0.0));

        let outcome = pool.note_on(note("A5"), 1.0, &settings).unwrap();
        assert_eq!(outcome.stolen, Some(note("A4")));
        let generator = pool.voices()[0].generator();
        assert!(generator.is_gliding());
        assert!((generator.current_frequency() - 440.0).abs() < 0.1);

        pool.render(&mut buffer, &RenderCtx::at(SR, 0.1));
        assert!((pool.voices()[0].generator().current_frequency() - 880.0).abs() < 0.1);
    }

    #[test]
    fn active_voices_never_exceed_pool_size() {
        let (mut pool, settings) = pool(4);
        for midi in 40..80 {
            pool.note_on(Note::from_midi(midi).unwrap(), 0.8, &settings);
            assert!(pool.active_count() <= 4);
        }
        assert_eq!(pool.active_count(), 4);
    }

    #[test]
    fn note_off_releases_every_holder_and_nothing_else() {
        let (mut pool, settings) = pool(4);
        pool.note_on(note("C4"), 1.0, &settings);
        pool.note_on(note("C4"), 1.0, &settings);
        pool.note_on(note("G4"), 1.0, &settings);

        assert_eq!(pool.note_off(note("C4")), 2);
        assert_eq!(pool.active_notes().collect::<Vec<_>>(), vec![note("G4")]);
        assert!(pool.voices().iter().filter(|v| !v.is_active()).all(|v| v.note().is_none()));
    }

    #[test]
    fn freed_voice_is_reused_before_stealing() {
        let (mut pool, settings) = pool(2);
        pool.note_on(note("C4"), 1.0, &settings);
        pool.note_on(note("D4"), 1.0, &settings);
        pool.note_off(note("D4"));

        let outcome = pool.note_on(note("E4"), 1.0, &settings).unwrap();
        assert_eq!(outcome.voice, 1);
        assert_eq!(outcome.stolen, None);
    }

    #[test]
    fn panic_clears_all_assignments() {
        let (mut pool, settings) = pool(3);
        for name in ["C4", "E4", "G4"] {
            pool.note_on(note(name), 1.0, &settings);
        }
        assert_eq!(pool.panic(), 3);
        assert_eq!(pool.active_count(), 0);
        assert!(pool.voices().iter().all(|v| v.note().is_none()));
    }

    #[test]
    fn render_sums_voices_and_keeps_release_tail() {
        let (mut pool, settings) = pool(2);
        let ctx = RenderCtx::at(SR, 0.0);
        let mut buffer = vec![0.0; 512];

        pool.render(&mut buffer, &ctx);
        assert!(buffer.iter().all(|&s| s == 0.0));

        pool.note_on(note("A4"), 1.0, &settings);
        pool.render(&mut buffer, &ctx);
        assert!(buffer.iter().any(|&s| s.abs() > 0.01));

        pool.note_off(note("A4"));
        assert_eq!(pool.sounding_count(), 1, "release tail should still sound");
    }

    #[test]
    fn mode_switch_rebuilds_generators() {
        let (mut pool, mut settings) = pool(3);
        pool.note_on(note("C4"), 1.0, &settings);

        let diff = OscillatorUpdate {
            modulation: Some(Some(ModulationSettings { kind: ModulationKind::Fm, amount: 2.0 })),
            ..Default::default()
        }
        .merge_into(&mut settings.oscillator);

        assert!(pool.apply_oscillator(&diff, &settings.oscillator, &settings.envelope, 2_400));
        assert_eq!(pool.kind(), Some(GeneratorKind::Fm));
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.size(), 3);
    }

    #[test]
    fn same_mode_update_ramps_detune() {
        let (mut pool, mut settings) = pool(2);
        let diff = OscillatorUpdate {
            detune: Some(50.0),
            ..Default::default()
        }
        .merge_into(&mut settings.oscillator);

        assert!(!pool.apply_oscillator(&diff, &settings.oscillator, &settings.envelope, 2_400));
        let detune = pool.voices()[0].generator().detune();
        assert!(detune.is_ramping());
        assert_eq!(detune.target(), 50.0);
    }

    #[test]
    fn dispose_releases_once() {
        let (mut pool, _) = pool(5);
        assert_eq!(pool.dispose(), 5);
        assert_eq!(pool.dispose(), 0);
        assert_eq!(pool.allocate(), None);
    }
}

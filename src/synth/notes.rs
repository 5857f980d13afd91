//! Note names, MIDI numbers and frequencies.
//!
//! The table covers all 128 MIDI notes. Names use sharps and the octave
//! convention where middle C (MIDI 60) is `C4`, so MIDI 0 is `C-1` and
//! MIDI 127 is `G9`. Flats are accepted when parsing (`Bb4` is `A#4`) but
//! never produced.

use std::{fmt, str::FromStr};

use crate::engine::EngineError;
use crate::graph::node::midi_note_to_freq;

const SHARP_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// A MIDI note number in 0..=127.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Note(u8);

impl Note {
    pub const MAX: u8 = 127;

    pub fn from_midi(midi: u8) -> Option<Self> {
        (midi <= Self::MAX).then_some(Note(midi))
    }

    pub fn midi(self) -> u8 {
        self.0
    }

    pub fn frequency(self) -> f32 {
        midi_note_to_freq(self.0)
    }

    pub fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    pub fn pitch_class(self) -> &'static str {
        SHARP_NAMES[(self.0 % 12) as usize]
    }

    /// Shift by semitones; `None` when the result leaves the MIDI range.
    pub fn transpose(self, semitones: i16) -> Option<Self> {
        let shifted = self.0 as i16 + semitones;
        u8::try_from(shifted).ok().and_then(Note::from_midi)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class(), self.octave())
    }
}

impl FromStr for Note {
    type Err = EngineError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidNote(name.to_string());

        let mut chars = name.chars();
        let letter = chars.next().ok_or_else(invalid)?;
        let base: i16 = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(invalid()),
        };

        let rest = chars.as_str();
        let (accidental, octave) = match rest.as_bytes().first() {
            Some(b'#') => (1, &rest[1..]),
            Some(b'b') => (-1, &rest[1..]),
            _ => (0, rest),
        };

        let octave: i16 = octave.parse().map_err(|_| invalid())?;
        let midi = (octave + 1) * 12 + base + accidental;
        u8::try_from(midi).ok().and_then(Note::from_midi).ok_or_else(invalid)
    }
}

#[derive(Debug, Clone)]
pub struct NoteEntry {
    pub note: Note,
    pub name: String,
    pub frequency: f32,
}

/// Read-only lookup from note name to MIDI index and frequency.
#[derive(Debug, Clone)]
pub struct NoteTable {
    entries: Vec<NoteEntry>,
}

impl Default for NoteTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl NoteTable {
    /// Equal temperament, A4 = 440 Hz.
    pub fn standard() -> Self {
        let entries = (0..=Note::MAX)
            .map(|midi| {
                let note = Note(midi);
                NoteEntry {
                    note,
                    name: note.to_string(),
                    frequency: note.frequency(),
                }
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&NoteEntry> {
        let note = name.parse::<Note>().ok()?;
        self.entries.get(note.midi() as usize)
    }

    pub fn lookup(&self, name: &str) -> Result<Note, EngineError> {
        self.get(name)
            .map(|entry| entry.note)
            .ok_or_else(|| EngineError::InvalidNote(name.to_string()))
    }

    pub fn entry(&self, note: Note) -> &NoteEntry {
        &self.entries[note.midi() as usize]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteEntry> {
        self.entries.iter()
    }
}

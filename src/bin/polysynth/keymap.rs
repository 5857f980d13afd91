//! Computer keyboard → engine actions.

use crossterm::event::KeyCode;
use polysynth::synth::notes::Note;

/// Piano row, starting at C. Upper row keys are the black notes.
const PIANO_KEYS: [char; 17] = [
    'a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k', 'o', 'l', 'p', ';',
];

const BASE_MIDI: i16 = 60;
const MIN_OCTAVE: i8 = -4;
const MAX_OCTAVE: i8 = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Note(char),
    OctaveDown,
    OctaveUp,
    /// 0 = subtractive, 1 = FM, 2 = AM
    Mode(u8),
    CutoffDown,
    CutoffUp,
    CycleLfoTarget,
    DepthDown,
    DepthUp,
    ToggleReverb,
    ToggleDelay,
    ToggleDistortion,
    Panic,
    Quit,
}

pub fn action(code: KeyCode) -> Option<Action> {
    let c = match code {
        KeyCode::Esc => return Some(Action::Quit),
        KeyCode::Char(c) => c.to_ascii_lowercase(),
        _ => return None,
    };

    Some(match c {
        c if PIANO_KEYS.contains(&c) => Action::Note(c),
        'z' => Action::OctaveDown,
        'x' => Action::OctaveUp,
        '1' => Action::Mode(0),
        '2' => Action::Mode(1),
        '3' => Action::Mode(2),
        '[' => Action::CutoffDown,
        ']' => Action::CutoffUp,
        'v' => Action::CycleLfoTarget,
        '-' => Action::DepthDown,
        '=' => Action::DepthUp,
        'r' => Action::ToggleReverb,
        'q' => Action::ToggleDelay,
        'c' => Action::ToggleDistortion,
        ' ' => Action::Panic,
        _ => return None,
    })
}

/// Keyboard layout with a movable octave.
#[derive(Debug, Default)]
pub struct KeyMap {
    octave: i8,
}

impl KeyMap {
    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn shift(&mut self, delta: i8) {
        self.octave = (self.octave + delta).clamp(MIN_OCTAVE, MAX_OCTAVE);
    }

    /// Note name for a piano key at the current octave.
    pub fn note_name(&self, key: char) -> Option<String> {
        let offset = PIANO_KEYS.iter().position(|&k| k == key)? as i16;
        let midi = BASE_MIDI + self.octave as i16 * 12 + offset;
        let note = Note::from_midi(u8::try_from(midi).ok()?)?;
        Some(note.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_row_starts_at_middle_c() {
        let map = KeyMap::default();
        assert_eq!(map.note_name('a').as_deref(), Some("C4"));
        assert_eq!(map.note_name('w').as_deref(), Some("C#4"));
        assert_eq!(map.note_name(';').as_deref(), Some("E5"));
    }

    #[test]
    fn octave_shift_is_clamped() {
        let mut map = KeyMap::default();
        map.shift(-10);
        assert_eq!(map.octave(), MIN_OCTAVE);
        assert_eq!(map.note_name('a').as_deref(), Some("C0"));
        map.shift(20);
        assert_eq!(map.note_name('a').as_deref(), Some("C8"));
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(action(KeyCode::Char('A')), Some(Action::Note('a')));
        assert_eq!(action(KeyCode::Char('2')), Some(Action::Mode(1)));
        assert_eq!(action(KeyCode::Esc), Some(Action::Quit));
        assert_eq!(action(KeyCode::Char('m')), None);
    }
}

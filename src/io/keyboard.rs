//! Computer keyboard as a one-octave piano.

/*
The home row plays the white keys, the row above plays the black keys:

     w   e       t   y   u
    C#  D#      F#  G#  A#
   a   s   d   f   g   h   j
   C   D   E   F   G   A   B

`z` shifts an octave down and `x` an octave up, within [2, 6].

Each pressed key remembers the note it started, so releasing it after an
octave shift stops the right note instead of leaving the old one stuck.
*/

use crate::io::note::parse_note;

pub const MIN_OCTAVE: i32 = 2;
pub const MAX_OCTAVE: i32 = 6;
pub const DEFAULT_OCTAVE: i32 = 4;

const NOTE_KEYS: [(char, &str); 12] = [
    ('a', "C"),
    ('w', "C#"),
    ('s', "D"),
    ('e', "D#"),
    ('d', "E"),
    ('f', "F"),
    ('t', "F#"),
    ('g', "G"),
    ('y', "G#"),
    ('h', "A"),
    ('u', "A#"),
    ('j', "B"),
];

/// Pitch class for a note key, if the key is mapped.
pub fn pitch_class(key: char) -> Option<&'static str> {
    let key = key.to_ascii_lowercase();
    NOTE_KEYS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, name)| *name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Start this MIDI note.
    NoteOn(u8),
    /// Octave changed to this value.
    Octave(i32),
}

#[derive(Debug, Clone)]
pub struct KeyboardInput {
    octave: i32,
    held: [Option<u8>; 12],
}

impl Default for KeyboardInput {
    fn default() -> Self {
        Self::new(DEFAULT_OCTAVE)
    }
}

impl KeyboardInput {
    pub fn new(octave: i32) -> Self {
        Self {
            octave: octave.clamp(MIN_OCTAVE, MAX_OCTAVE),
            held: [None; 12],
        }
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn shift_octave(&mut self, delta: i32) -> i32 {
        self.octave = (self.octave + delta).clamp(MIN_OCTAVE, MAX_OCTAVE);
        self.octave
    }

    /// Handle a key press. Repeats of an already held key are ignored.
    pub fn press(&mut self, key: char) -> Option<KeyAction> {
        match key.to_ascii_lowercase() {
            'z' => return Some(KeyAction::Octave(self.shift_octave(-1))),
            'x' => return Some(KeyAction::Octave(self.shift_octave(1))),
            _ => {}
        }

        let slot = key_slot(key)?;
        if self.held[slot].is_some() {
            return None;
        }
        let note = parse_note(&format!("{}{}", NOTE_KEYS[slot].1, self.octave))?;
        self.held[slot] = Some(note);
        Some(KeyAction::NoteOn(note))
    }

    /// Handle a key release; returns the note that key started.
    pub fn release(&mut self, key: char) -> Option<u8> {
        let slot = key_slot(key)?;
        self.held[slot].take()
    }

    /// Forget every held key (e.g. after an all-notes-off).
    pub fn clear(&mut self) {
        self.held = [None; 12];
    }

    pub fn held_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.held.iter().flatten().copied()
    }
}

fn key_slot(key: char) -> Option<usize> {
    let key = key.to_ascii_lowercase();
    NOTE_KEYS.iter().position(|(k, _)| *k == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_home_row_to_white_keys() {
        assert_eq!(pitch_class('a'), Some("C"));
        assert_eq!(pitch_class('w'), Some("C#"));
        assert_eq!(pitch_class('J'), Some("B"));
        assert_eq!(pitch_class('k'), None);
    }

    #[test]
    fn press_plays_in_current_octave() {
        let mut keys = KeyboardInput::default();
        assert_eq!(keys.press('a'), Some(KeyAction::NoteOn(60)));
        assert_eq!(keys.press('h'), Some(KeyAction::NoteOn(69)));
    }

    #[test]
    fn repeats_are_ignored() {
        let mut keys = KeyboardInput::default();
        assert!(keys.press('a').is_some());
        assert_eq!(keys.press('a'), None);
        assert_eq!(keys.release('a'), Some(60));
        assert_eq!(keys.release('a'), None);
    }

    #[test]
    fn octave_is_clamped() {
        let mut keys = KeyboardInput::default();
        for _ in 0..5 {
            keys.press('x');
        }
        assert_eq!(keys.octave(), MAX_OCTAVE);
        for _ in 0..10 {
            keys.press('z');
        }
        assert_eq!(keys.octave(), MIN_OCTAVE);
        assert_eq!(keys.press('a'), Some(KeyAction::NoteOn(36)));
    }

    #[test]
    fn release_after_octave_shift_stops_the_note_it_started() {
        let mut keys = KeyboardInput::default();
        keys.press('a');
        keys.press('x');
        assert_eq!(keys.release('a'), Some(60));
    }
}

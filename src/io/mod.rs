// Purpose - external interfaces, format conversions

pub mod keyboard;
pub mod midi;
pub mod note;

pub use keyboard::{KeyAction, KeyboardInput};
pub use midi::{midi_to_synth, MidiEvent};
pub use note::{midi_note_to_freq, note_name, note_to_freq, parse_note};

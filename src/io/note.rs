//! Note identifiers ("C4", "F#3") and their frequencies.

/*
Note Names
==========

A note identifier is a pitch class followed by an octave number:

    C4   F#3   A#-1   G9

    pitch class   C C# D D# E F F# G G# A A# B   (sharps only)
    octave        integer, optional leading '-'

The identifier maps onto a MIDI note number:

    midi = (octave + 1) × 12 + semitone_offset

    C-1 →   0     C4 →  60 (middle C)     A4 →  69     G9 → 127

and the MIDI number onto a frequency in twelve-tone equal temperament
tuned to A4 = 440 Hz:

    freq = 440 × 2^((midi - 69) / 12)

Anything else ("H2", "Cb4", "C", "C#4x", "B9" which is MIDI 131) is not a
note and yields `None`. The mapping is one-to-one inside MIDI range, so the
engine keys its voices by the MIDI number.
*/

const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Parse a note identifier into a MIDI note number.
pub fn parse_note(name: &str) -> Option<u8> {
    let bytes = name.as_bytes();
    let base: i32 = match bytes.first()? {
        b'C' => 0,
        b'D' => 2,
        b'E' => 4,
        b'F' => 5,
        b'G' => 7,
        b'A' => 9,
        b'B' => 11,
        _ => return None,
    };

    let mut rest = &name[1..];
    let mut offset = base;
    if let Some(stripped) = rest.strip_prefix('#') {
        // E# and B# are not in the pitch class set
        if base == 4 || base == 11 {
            return None;
        }
        offset += 1;
        rest = stripped;
    }

    let (negative, digits) = match rest.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, rest),
    };
    if digits.is_empty() || digits.len() > 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let magnitude: i32 = digits.parse().ok()?;
    let octave = if negative { -magnitude } else { magnitude };
    let midi = (octave + 1) * 12 + offset;
    u8::try_from(midi).ok().filter(|&m| m <= 127)
}

/// Note identifier for a MIDI note number (sharps only), e.g. 61 → "C#4".
pub fn note_name(midi: u8) -> Option<String> {
    if midi > 127 {
        return None;
    }
    let octave = (midi / 12) as i32 - 1;
    let pitch_class = PITCH_CLASSES[(midi % 12) as usize];
    Some(format!("{pitch_class}{octave}"))
}

/// Frequency of a MIDI note number in Hz.
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * ((note as f32 - 69.0) / 12.0).exp2()
}

/// Frequency of a note identifier, or `None` if it doesn't parse.
pub fn note_to_freq(name: &str) -> Option<f32> {
    parse_note(name).map(midi_note_to_freq)
}

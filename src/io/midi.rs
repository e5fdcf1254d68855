use crate::synth::message::SynthMessage;

/*
MIDI channel voice messages, as they arrive from a device:

    status byte   1sss cccc   s = message kind, c = channel (0-15)
    data bytes    0ddd dddd   one or two of them, 7 bits each

    0x8n key vel     note off
    0x9n key vel     note on (velocity 0 means note off)
    0xBn ctl val     control change (ctl 123 = all notes off)
    0xCn prog        program change
    0xEn lsb msb     pitch bend, 14 bits centred on 8192

Running status and system messages are not decoded.
*/

/// CC number for "All Notes Off".
pub const CC_ALL_NOTES_OFF: u8 = 123;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Decode one complete message. Returns `None` for anything malformed or
    /// not listed above.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if status < 0x80 || data.iter().any(|&b| b >= 0x80) {
            return None;
        }

        let channel = status & 0x0F;
        match (status & 0xF0, data) {
            (0x80, &[key, velocity, ..]) => Some(MidiEvent::NoteOff {
                channel,
                key,
                velocity,
            }),
            (0x90, &[key, 0, ..]) => Some(MidiEvent::NoteOff {
                channel,
                key,
                velocity: 0,
            }),
            (0x90, &[key, velocity, ..]) => Some(MidiEvent::NoteOn {
                channel,
                key,
                velocity,
            }),
            (0xB0, &[controller, value, ..]) => Some(MidiEvent::ControlChange {
                channel,
                controller,
                value,
            }),
            (0xC0, &[program, ..]) => Some(MidiEvent::ProgramChange { channel, program }),
            (0xE0, &[lsb, msb, ..]) => Some(MidiEvent::PitchBend {
                channel,
                value: (((msb as i16) << 7) | lsb as i16) - 8192,
            }),
            _ => None,
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}

/// Map a MIDI event onto an engine message.
///
/// `channel_filter` of `None` listens on every channel (omni).
pub fn midi_to_synth(midi: MidiEvent, channel_filter: Option<u8>) -> Option<SynthMessage> {
    if channel_filter.is_some_and(|channel| channel != midi.channel()) {
        return None;
    }

    match midi {
        MidiEvent::NoteOn { key, .. } => Some(SynthMessage::NoteOn { note: key }),
        MidiEvent::NoteOff { key, .. } => Some(SynthMessage::NoteOff { note: key }),
        MidiEvent::ControlChange {
            controller: CC_ALL_NOTES_OFF,
            ..
        } => Some(SynthMessage::AllNotesOff),
        _ => None,
    }
}

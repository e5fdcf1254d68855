use crate::dsp::lfo::LfoBlock;
use crate::dsp::mix::sum_in_place;
use crate::io::note::midi_note_to_freq;
use crate::synth::params::SynthParams;
use crate::synth::voice::{Voice, VoiceState};

/*
Voice Pool
==========

A fixed arena of voice slots plus a map from MIDI note to slot.

    note_map[60] = Some(3)   →  C4 is sounding on slot 3
    note_map[64] = None      →  E4 is not held

Only HELD notes are mapped. A released voice is unmapped immediately and
keeps rendering its release tail until both envelopes go idle, then its slot
is free again. Pressing the same key during that tail allocates a fresh
voice; the tail finishes on its own.


Allocation (polyphonic)
-----------------------

    1. a free slot
    2. else steal the oldest releasing voice
    3. else steal the oldest held voice (its key is unmapped)

"Oldest" is by trigger order.


Monophonic
----------

At most one voice is in use. Pressing a key while another is held does NOT
retrigger the envelopes: the voice glides to the new pitch and the map moves
to the new key. Releasing any key other than the current one does nothing.
With no key held, a still-releasing voice is reused and retriggered from its
current level instead of starting a second voice.

Switching between modes releases every held note.
*/

/// Set of held MIDI notes, one bit per note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ActiveNotes(u128);

impl ActiveNotes {
    pub const EMPTY: Self = Self(0);

    pub fn insert(&mut self, note: u8) {
        if note < 128 {
            self.0 |= 1u128 << note;
        }
    }

    pub fn contains(&self, note: u8) -> bool {
        note < 128 && self.0 & (1u128 << note) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Notes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..128u8).filter(move |&note| self.contains(note))
    }
}

impl FromIterator<u8> for ActiveNotes {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut notes = ActiveNotes::EMPTY;
        for note in iter {
            notes.insert(note);
        }
        notes
    }
}

pub struct VoicePool {
    voices: Vec<Voice>,
    note_map: [Option<u16>; 128],
    monophonic: bool,
    current_note: Option<u8>,
    next_age: u64,
}

impl VoicePool {
    pub fn new(sample_rate: f32, max_voices: usize, params: &SynthParams) -> Self {
        debug_assert!(max_voices > 0 && max_voices <= u16::MAX as usize);
        let voices = (0..max_voices)
            .map(|_| Voice::new(sample_rate, params))
            .collect();

        Self {
            voices,
            note_map: [None; 128],
            monophonic: params.voicing.monophonic,
            current_note: None,
            next_age: 0,
        }
    }

    pub fn note_on(&mut self, note: u8, params: &SynthParams) -> ActiveNotes {
        if note > 127 {
            return self.active_notes();
        }
        let frequency = midi_note_to_freq(note);

        if self.monophonic {
            self.mono_note_on(note, frequency, params);
        } else if self.note_map[note as usize].is_none() {
            let age = self.bump_age();
            let idx = self.allocate();
            self.voices[idx].start(note, frequency, params, age);
            self.note_map[note as usize] = Some(idx as u16);
        }

        self.active_notes()
    }

    pub fn note_off(&mut self, note: u8) -> ActiveNotes {
        if note > 127 {
            return self.active_notes();
        }

        if self.monophonic {
            if self.current_note == Some(note) {
                self.current_note = None;
                if let Some(idx) = self.note_map[note as usize].take() {
                    self.voices[idx as usize].release();
                }
            }
        } else if let Some(idx) = self.note_map[note as usize].take() {
            self.voices[idx as usize].release();
        }

        self.active_notes()
    }

    /// Release every held voice.
    pub fn all_notes_off(&mut self) -> ActiveNotes {
        for voice in self.voices.iter_mut() {
            voice.release();
        }
        self.note_map = [None; 128];
        self.current_note = None;
        ActiveNotes::EMPTY
    }

    /// Switch voicing mode; held notes are released when the mode changes.
    pub fn set_monophonic(&mut self, monophonic: bool) {
        if monophonic != self.monophonic {
            self.all_notes_off();
            self.monophonic = monophonic;
        }
    }

    pub fn update_voice_parameters(&mut self, params: &SynthParams) {
        for voice in self.held_voices() {
            voice.update_params(params);
        }
    }

    pub fn update_voice_filter_parameters(&mut self, params: &SynthParams) {
        for voice in self.held_voices() {
            voice.update_filter(params);
        }
    }

    pub fn update_voice_envelope_parameters(&mut self, params: &SynthParams) {
        for voice in self.held_voices() {
            voice.update_envelopes(params);
        }
    }

    /// Render every sounding voice and sum into `out` (overwritten).
    ///
    /// `scratch` must be at least `out.len()` long.
    pub fn render(&mut self, out: &mut [f32], lfo: &LfoBlock, scratch: &mut [f32]) {
        out.fill(0.0);
        let scratch = &mut scratch[..out.len()];
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.render(scratch, lfo);
            sum_in_place(out, scratch);
        }
    }

    pub fn active_notes(&self) -> ActiveNotes {
        self.note_map
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(note, _)| note as u8)
            .collect()
    }

    /// Voices still producing sound, held or releasing.
    pub fn sounding_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn is_monophonic(&self) -> bool {
        self.monophonic
    }

    pub fn current_note(&self) -> Option<u8> {
        self.current_note
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Voice mapped to a held note.
    pub fn voice_for(&self, note: u8) -> Option<&Voice> {
        let idx = (*self.note_map.get(note as usize)?)?;
        self.voices.get(idx as usize)
    }

    fn mono_note_on(&mut self, note: u8, frequency: f32, params: &SynthParams) {
        if let Some(current) = self.current_note {
            if current == note {
                return;
            }
            if let Some(idx) = self.note_map[current as usize].take() {
                self.voices[idx as usize].glide_to(note, frequency, params.voicing.glide_time);
                self.note_map[note as usize] = Some(idx);
                self.current_note = Some(note);
                return;
            }
        }

        // No held note: reuse the most recent tail, if any, so one voice sounds
        let reuse = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_active())
            .max_by_key(|(_, v)| v.age())
            .map(|(idx, _)| idx);
        let idx = match reuse {
            Some(idx) => idx,
            None => self.allocate(),
        };

        let age = self.bump_age();
        self.voices[idx].start(note, frequency, params, age);
        self.note_map[note as usize] = Some(idx as u16);
        self.current_note = Some(note);
    }

    fn allocate(&mut self) -> usize {
        // First pass: find free voice index
        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return idx;
        }

        // Second pass: steal oldest releasing voice, else the oldest held one
        let steal = |state: VoiceState| {
            self.voices
                .iter()
                .enumerate()
                .filter(|(_, v)| v.state() == state)
                .min_by_key(|(_, v)| v.age())
                .map(|(idx, _)| idx)
        };
        let idx = steal(VoiceState::Releasing)
            .or_else(|| steal(VoiceState::Active))
            .unwrap_or(0);

        let stolen = &self.voices[idx];
        if stolen.state() == VoiceState::Active {
            let note = stolen.note() as usize;
            if self.note_map[note] == Some(idx as u16) {
                self.note_map[note] = None;
            }
        }
        idx
    }

    fn held_voices(&mut self) -> impl Iterator<Item = &mut Voice> {
        self.voices
            .iter_mut()
            .filter(|v| v.state() == VoiceState::Active)
    }

    fn bump_age(&mut self) -> u64 {
        self.next_age += 1;
        self.next_age
    }
}

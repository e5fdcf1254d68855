//! What the status panel shows, gathered once per frame.
//!
//! Built on the UI thread from the engine's latest status snapshot and the
//! control-side parameter copy; the audio thread never sees it.

use saavy_synth::{io::note_name, SynthParams, SynthStatus};

#[derive(Clone, Debug)]
pub struct UiState {
    /// Note names of held keys, lowest first
    pub held: Vec<String>,
    /// Voices still sounding, release tails included
    pub voices: usize,
    pub peak: f32,
    pub octave: i32,
    pub sample_rate: f32,
    pub params: SynthParams,
}

impl UiState {
    pub fn new(status: SynthStatus, params: &SynthParams, octave: i32, sample_rate: f32) -> Self {
        Self {
            held: status.active.iter().filter_map(note_name).collect(),
            voices: status.voices,
            peak: status.peak,
            octave,
            sample_rate,
            params: *params,
        }
    }

    pub fn mode(&self) -> &'static str {
        if self.params.voicing.monophonic {
            "mono"
        } else {
            "poly"
        }
    }
}

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};
#[cfg(feature = "rtrb")]
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::dsp::lfo::{Lfo, LfoBlock};
use crate::dsp::mix::peak;
use crate::dsp::ramp::{seconds_to_samples, LinearRamp, PARAM_RAMP_SECONDS};
use crate::synth::message::{MessageReceiver, StatusSink, SynthMessage};
use crate::synth::params::{ParamChange, SynthParams};
use crate::synth::pool::{ActiveNotes, VoicePool};
use crate::{SynthError, MAX_BLOCK_SIZE};

#[cfg(feature = "rtrb")]
use crate::io::note::parse_note;

/*
The Engine
==========

`Synth` owns everything the audio callback touches: the voice pool, the
LFO, the parameter state and every scratch buffer. Nothing else can reach
them. The outside world talks to it through a message queue:

    control thread                      audio thread
    ──────────────                      ────────────
    SynthHandle ──[SynthMessage ring]──→ Synth::render
                ←──[SynthStatus ring]───

Per block:

    1. drain control messages (note on/off, parameter edits)
    2. render the LFO once into the shared tap buffers
    3. render and sum every sounding voice
    4. apply the master volume ramp
    5. publish a status snapshot (held notes, voice count, peak)

Output slices longer than `MAX_BLOCK_SIZE` are split into chunks and each
chunk is a block, so the scratch buffers never grow after construction.
*/

/// Snapshot published after every block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SynthStatus {
    /// Held note keys.
    pub active: ActiveNotes,
    /// Voices still producing sound, including release tails.
    pub voices: usize,
    /// Largest absolute sample of the block.
    pub peak: f32,
}

pub struct Synth<R: MessageReceiver, S: StatusSink = ()> {
    sample_rate: f32,
    params: SynthParams,
    pool: VoicePool,
    lfo: Lfo,
    lfo_block: LfoBlock,
    scratch: Vec<f32>,
    master: LinearRamp,
    rx: R,
    status: S,
    frames: u64,
}

impl<R: MessageReceiver, S: StatusSink> Synth<R, S> {
    /// Build an engine around an arbitrary message source and status sink.
    pub fn with_receiver(
        config: EngineConfig,
        params: SynthParams,
        rx: R,
        status: S,
    ) -> Result<Self, SynthError> {
        config.validate()?;

        let params = params.clamped();

        let lfo = Lfo::new(
            config.sample_rate,
            params.lfo.waveform,
            params.lfo.rate,
            params.lfo.depths,
        );

        Ok(Self {
            sample_rate: config.sample_rate,
            pool: VoicePool::new(config.sample_rate, config.max_voices, &params),
            lfo,
            lfo_block: LfoBlock::new(MAX_BLOCK_SIZE),
            scratch: vec![0.0; MAX_BLOCK_SIZE],
            master: LinearRamp::new(params.master_volume),
            params,
            rx,
            status,
            frames: 0,
        })
    }

    /// Fill `out` with mono samples.
    pub fn render(&mut self, out: &mut [f32]) {
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_block(chunk);
        }
    }

    fn render_block(&mut self, out: &mut [f32]) {
        // Process control messages
        while let Some(msg) = self.rx.pop() {
            self.handle_message(msg);
        }

        let len = out.len();
        self.lfo.render(&mut self.lfo_block, len);
        self.pool.render(out, &self.lfo_block, &mut self.scratch[..len]);

        for sample in out.iter_mut() {
            *sample *= self.master.next_value();
        }

        self.frames += len as u64;
        self.status.publish(SynthStatus {
            active: self.pool.active_notes(),
            voices: self.pool.sounding_voices(),
            peak: peak(out),
        });
    }

    /// Apply one control message immediately.
    pub fn handle_message(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::NoteOn { note } => {
                self.pool.note_on(note, &self.params);
            }
            SynthMessage::NoteOff { note } => {
                self.pool.note_off(note);
            }
            SynthMessage::AllNotesOff => {
                self.pool.all_notes_off();
            }
            SynthMessage::SetParam(change) => self.apply_param(change),
        }
    }

    fn apply_param(&mut self, change: ParamChange) {
        let change = self.params.apply(change);
        let params = &self.params;

        match change {
            ParamChange::OscWaveform(..)
            | ParamChange::OscLevel(..)
            | ParamChange::OscDetune(..)
            | ParamChange::OscillatorMix(_) => self.pool.update_voice_parameters(params),

            ParamChange::FilterType(_)
            | ParamChange::FilterFrequency(_)
            | ParamChange::FilterQ(_)
            | ParamChange::FilterSlope(_) => self.pool.update_voice_filter_parameters(params),

            ParamChange::AmpEnvelope(..)
            | ParamChange::FilterEnvelope(..)
            | ParamChange::FilterEnvDepth(_) => self.pool.update_voice_envelope_parameters(params),

            ParamChange::LfoRate(rate) => self.lfo.set_rate(rate),
            ParamChange::LfoWaveform(waveform) => self.lfo.set_waveform(waveform),
            ParamChange::LfoDepth(tap, depth) => self.lfo.set_depth(tap, depth),

            ParamChange::Monophonic(flag) => self.pool.set_monophonic(flag),
            // Read at the next monophonic note change
            ParamChange::GlideTime(_) => {}

            ParamChange::MasterVolume(volume) => {
                let ramp = seconds_to_samples(PARAM_RAMP_SECONDS, self.sample_rate);
                self.master.set_target(volume, ramp);
            }
        }
    }

    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    pub fn active_notes(&self) -> ActiveNotes {
        self.pool.active_notes()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames rendered since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(feature = "rtrb")]
impl Synth<Consumer<SynthMessage>, Producer<SynthStatus>> {
    /// Create the engine and its control handle, connected by `rtrb` rings.
    pub fn new(config: EngineConfig) -> Result<(Self, SynthHandle), SynthError> {
        Self::with_params(config, SynthParams::default())
    }

    pub fn with_params(
        config: EngineConfig,
        params: SynthParams,
    ) -> Result<(Self, SynthHandle), SynthError> {
        config.validate()?;
        let (tx, rx) = RingBuffer::<SynthMessage>::new(config.control_queue_capacity);
        let (status_tx, status_rx) = RingBuffer::<SynthStatus>::new(config.status_queue_capacity);

        let synth = Self::with_receiver(config, params, rx, status_tx)?;
        let handle = SynthHandle {
            tx,
            status_rx,
            latest: SynthStatus::default(),
        };
        Ok((synth, handle))
    }
}

/// Control-side half of the engine. Lives on the UI / input thread.
#[cfg(feature = "rtrb")]
pub struct SynthHandle {
    tx: Producer<SynthMessage>,
    status_rx: Consumer<SynthStatus>,
    latest: SynthStatus,
}

#[cfg(feature = "rtrb")]
impl SynthHandle {
    /// Start a note by identifier ("C4", "F#3"). Unknown identifiers are ignored.
    pub fn note_on(&mut self, note: &str) -> Result<(), SynthError> {
        match parse_note(note) {
            Some(midi) => self.note_on_midi(midi),
            None => {
                debug!(note, "ignoring unparseable note");
                Ok(())
            }
        }
    }

    /// Stop a note by identifier. Unknown identifiers are ignored.
    pub fn note_off(&mut self, note: &str) -> Result<(), SynthError> {
        match parse_note(note) {
            Some(midi) => self.note_off_midi(midi),
            None => {
                debug!(note, "ignoring unparseable note");
                Ok(())
            }
        }
    }

    pub fn note_on_midi(&mut self, note: u8) -> Result<(), SynthError> {
        if note > 127 {
            return Ok(());
        }
        self.send(SynthMessage::NoteOn { note })
    }

    pub fn note_off_midi(&mut self, note: u8) -> Result<(), SynthError> {
        if note > 127 {
            return Ok(());
        }
        self.send(SynthMessage::NoteOff { note })
    }

    pub fn all_notes_off(&mut self) -> Result<(), SynthError> {
        self.send(SynthMessage::AllNotesOff)
    }

    /// Send a typed parameter edit (clamped on arrival).
    pub fn set(&mut self, change: ParamChange) -> Result<(), SynthError> {
        self.send(SynthMessage::SetParam(change.clamped()))
    }

    /// Send a named parameter edit, e.g. `("filter.frequency", "800")`.
    pub fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), SynthError> {
        let change = ParamChange::parse(name, value)?;
        debug!(name, value, ?change, "parameter edit");
        self.set(change)
    }

    pub fn send(&mut self, msg: SynthMessage) -> Result<(), SynthError> {
        self.tx.push(msg).map_err(|_| {
            warn!(?msg, "control queue full, dropping message");
            SynthError::QueueFull
        })
    }

    /// Most recent status published by the audio thread.
    pub fn latest_status(&mut self) -> SynthStatus {
        while let Ok(status) = self.status_rx.pop() {
            self.latest = status;
        }
        self.latest
    }

    /// Held notes as last reported by the audio thread.
    pub fn active_notes(&mut self) -> ActiveNotes {
        self.latest_status().active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn offline(params: SynthParams) -> Synth<VecDeque<SynthMessage>> {
        Synth::with_receiver(EngineConfig::default(), params, VecDeque::new(), ())
            .expect("valid config")
    }

    #[test]
    fn silent_without_notes() {
        let mut synth = offline(SynthParams::default());
        let mut out = vec![1.0; 512];
        synth.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn renders_long_buffers_in_chunks() {
        let mut synth = offline(SynthParams::default());
        synth.handle_message(SynthMessage::NoteOn { note: 69 });

        let mut out = vec![0.0; MAX_BLOCK_SIZE * 2 + 100];
        synth.render(&mut out);
        assert_eq!(synth.frames(), out.len() as u64);

        let tail_peak = peak(&out[MAX_BLOCK_SIZE * 2..]);
        assert!(tail_peak > 0.1, "last chunk should be rendered, peak {}", tail_peak);
    }

    #[test]
    fn messages_are_applied_at_block_start() {
        let mut queue = VecDeque::new();
        queue.push_back(SynthMessage::NoteOn { note: 60 });
        queue.push_back(SynthMessage::NoteOn { note: 64 });
        let mut synth =
            Synth::with_receiver(EngineConfig::default(), SynthParams::default(), queue, ())
                .expect("valid config");

        assert!(synth.active_notes().is_empty());
        let mut out = vec![0.0; 64];
        synth.render(&mut out);
        assert_eq!(synth.active_notes().len(), 2);
    }

    #[test]
    fn master_volume_ramps() {
        let mut synth = offline(SynthParams::default());
        synth.handle_message(SynthMessage::SetParam(ParamChange::MasterVolume(1.0)));
        assert_eq!(synth.params().master_volume, 1.0);
        assert!(synth.master.is_ramping());

        let mut out = vec![0.0; 480];
        synth.render(&mut out);
        assert_eq!(synth.master.value(), 1.0);
    }

    #[test]
    fn initial_params_are_clamped() {
        let mut params = SynthParams::default();
        params.filter.q = 100.0;
        params.master_volume = 3.0;
        let synth = offline(params);
        assert_eq!(synth.params().filter.q, 30.0);
        assert_eq!(synth.params().master_volume, 1.0);
    }

    #[test]
    fn mode_switch_message_releases_notes() {
        let mut synth = offline(SynthParams::default());
        synth.handle_message(SynthMessage::NoteOn { note: 60 });
        synth.handle_message(SynthMessage::SetParam(ParamChange::Monophonic(true)));
        assert!(synth.active_notes().is_empty());
        assert!(synth.pool().is_monophonic());
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn handle_round_trip() {
        let (mut synth, mut handle) = Synth::new(EngineConfig::default()).expect("valid config");

        handle.note_on("C4").unwrap();
        handle.note_on("not-a-note").unwrap();
        handle.set_parameter("filter.frequency", "800").unwrap();

        let mut out = vec![0.0; 256];
        synth.render(&mut out);

        assert_eq!(synth.params().filter.frequency, 800.0);
        let status = handle.latest_status();
        assert!(status.active.contains(60));
        assert_eq!(status.voices, 1);
        assert!(status.peak > 0.0);
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn full_queue_is_reported() {
        let config = EngineConfig {
            control_queue_capacity: 2,
            ..EngineConfig::default()
        };
        let (_synth, mut handle) = Synth::new(config).expect("valid config");

        handle.note_on_midi(60).unwrap();
        handle.note_on_midi(62).unwrap();
        assert_eq!(handle.note_on_midi(64), Err(SynthError::QueueFull));
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn unknown_parameter_is_an_error() {
        let (_synth, mut handle) = Synth::new(EngineConfig::default()).expect("valid config");
        assert_eq!(
            handle.set_parameter("osc9.level", "1"),
            Err(SynthError::UnknownParameter("osc9.level".into()))
        );
    }
}

use crate::dsp::envelope::Envelope;
use crate::dsp::filter::FilterCascade;
use crate::dsp::lfo::{LfoBlock, LfoTap};
use crate::dsp::mix::equal_power_gains;
use crate::dsp::modulate::{cents_to_ratio, clamp_frequency, semitones_to_cents};
use crate::dsp::oscillator::Oscillator;
use crate::dsp::ramp::{seconds_to_samples, LinearRamp, PARAM_RAMP_SECONDS, SUSTAIN_RAMP_SECONDS};
use crate::synth::params::{OscId, SynthParams, MIN_FREQ};

/*
One Voice
=========

A voice is everything needed to sound one note:

    osc 1 ──× gain 1 ──┐
                       ├──→ × amp envelope ──→ [filter cascade] ──→ out
    osc 2 ──× gain 2 ──┘                            ↑
                                                    │
          cutoff = base + filter envelope + LFO ────┘

Per sample:

    freq_n  = base_freq × 2^((detune_n + lfo_pitch_n) / 1200)   → [20, 20000] Hz
    gain_n  = clamp(level_n + lfo_level_n, 0, 1) × mix_gain_n
    cutoff  = base_cutoff + filter_env + lfo_filter             → [20, 20000] Hz

`base_freq` is a ramp: a monophonic retrigger glides it to the new note.
Level, mix gain, detune, cutoff and Q are ramps too, so parameter edits
never step.

The filter envelope works as an OFFSET from the base cutoff. At trigger:

    floor   = max(20, base - depth) - base     (rest / release target)
    peak    = +depth
    sustain = +depth × filter_sustain

so sweeping the base cutoff while a note sounds moves the whole contour.

Filter coefficients are refreshed every `CONTROL_INTERVAL` samples.


Lifecycle
---------

    Free ──start──→ Active ──release──→ Releasing ──both envelopes idle──→ Free
                      ↑                     │
                      └──── retrigger ──────┘

A releasing voice is retired only once BOTH envelopes are idle, which is
after the longer of the amplitude and filter releases.
*/

/// Samples between filter coefficient updates.
pub const CONTROL_INTERVAL: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Key held, envelopes in attack/decay/sustain
    Releasing, // Key released, envelopes in release phase
}

pub struct Voice {
    note: u8,
    state: VoiceState,
    age: u64,
    sample_rate: f32,

    osc: [Oscillator; 2],
    base_freq: LinearRamp,
    level: [LinearRamp; 2],
    mix_gain: [LinearRamp; 2],
    detune_cents: [LinearRamp; 2],

    cutoff: LinearRamp,
    resonance: LinearRamp,
    filter: FilterCascade,
    control_countdown: u32,

    amp_env: Envelope,
    filter_env: Envelope,
}

impl Voice {
    pub fn new(sample_rate: f32, params: &SynthParams) -> Self {
        let amp = params.amp_env;
        let fenv = params.filter_env;
        let (mix1, mix2) = equal_power_gains(params.oscillator_mix);

        Self {
            note: 0,
            state: VoiceState::Free,
            age: 0,
            sample_rate,

            osc: [
                Oscillator::new(sample_rate, params.osc1.waveform),
                Oscillator::new(sample_rate, params.osc2.waveform),
            ],
            base_freq: LinearRamp::new(440.0),
            level: [
                LinearRamp::new(params.osc1.level),
                LinearRamp::new(params.osc2.level),
            ],
            mix_gain: [LinearRamp::new(mix1), LinearRamp::new(mix2)],
            detune_cents: [
                LinearRamp::new(semitones_to_cents(params.osc1.detune)),
                LinearRamp::new(semitones_to_cents(params.osc2.detune)),
            ],

            cutoff: LinearRamp::new(params.filter.frequency),
            resonance: LinearRamp::new(params.filter.q),
            filter: FilterCascade::new(
                sample_rate,
                params.filter.filter_type,
                params.filter.frequency,
                params.filter.q,
                params.filter.slope,
            ),
            control_countdown: 0,

            amp_env: Envelope::adsr(sample_rate, amp.attack, amp.decay, amp.sustain, amp.release),
            filter_env: Envelope::with_levels(
                sample_rate,
                fenv.attack,
                fenv.decay,
                fenv.release,
                0.0,
                0.0,
                0.0,
            ),
        }
    }

    /// Start a note on this voice with a full envelope trigger.
    ///
    /// A voice taken over while still sounding (stolen, or reused by the
    /// monophonic path) keeps its oscillator phase and its envelopes start
    /// from their current level.
    pub fn start(&mut self, note: u8, frequency: f32, params: &SynthParams, age: u64) {
        let was_free = self.state == VoiceState::Free;

        self.note = note;
        self.state = VoiceState::Active;
        self.age = age;

        if was_free {
            for osc in self.osc.iter_mut() {
                osc.reset();
            }
            self.filter.reset();
            self.amp_env.reset();
            self.filter_env.reset();
        }

        self.base_freq.set_immediate(frequency);
        self.load_params(params);

        self.trigger_envelopes(params);
    }

    /// Glide to a new note without retriggering the envelopes.
    pub fn glide_to(&mut self, note: u8, frequency: f32, glide_seconds: f32) {
        self.note = note;
        self.base_freq
            .set_target(frequency, seconds_to_samples(glide_seconds, self.sample_rate));
    }

    pub fn release(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            self.amp_env.note_off();
            self.filter_env.note_off();
        }
    }

    /// Oscillator level, detune, mix and waveform from the current parameters.
    pub fn update_params(&mut self, params: &SynthParams) {
        let ramp = seconds_to_samples(PARAM_RAMP_SECONDS, self.sample_rate);
        let (mix1, mix2) = equal_power_gains(params.oscillator_mix);

        for id in [OscId::Osc1, OscId::Osc2] {
            let (i, osc) = (id.index(), params.osc(id));
            self.osc[i].set_waveform(osc.waveform);
            self.level[i].set_target(osc.level, ramp);
            self.detune_cents[i].set_target(semitones_to_cents(osc.detune), ramp);
        }
        self.mix_gain[0].set_target(mix1, ramp);
        self.mix_gain[1].set_target(mix2, ramp);
    }

    /// Filter type, slope, cutoff and Q from the current parameters.
    pub fn update_filter(&mut self, params: &SynthParams) {
        let ramp = seconds_to_samples(PARAM_RAMP_SECONDS, self.sample_rate);
        self.filter.set_type(params.filter.filter_type);
        self.filter.set_slope(params.filter.slope);
        self.cutoff.set_target(params.filter.frequency, ramp);
        self.resonance.set_target(params.filter.q, ramp);
    }

    /// Envelope times for future segments; sustain levels re-ramp now.
    pub fn update_envelopes(&mut self, params: &SynthParams) {
        let amp = params.amp_env;
        let fenv = params.filter_env;

        self.amp_env.set_times(amp.attack, amp.decay, amp.release);
        self.amp_env.set_sustain(amp.sustain, SUSTAIN_RAMP_SECONDS);

        self.filter_env.set_times(fenv.attack, fenv.decay, fenv.release);
        self.filter_env
            .set_sustain(params.filter_env_depth * fenv.sustain, SUSTAIN_RAMP_SECONDS);
    }

    /// Render one block into `out`, overwriting it.
    pub fn render(&mut self, out: &mut [f32], lfo: &LfoBlock) {
        debug_assert!(lfo.len() >= out.len());

        let lfo_filter = lfo.tap(LfoTap::Filter);
        let lfo_pitch = [lfo.tap(LfoTap::Osc1Pitch), lfo.tap(LfoTap::Osc2Pitch)];
        let lfo_level = [lfo.tap(LfoTap::Osc1Level), lfo.tap(LfoTap::Osc2Level)];

        for (n, sample) in out.iter_mut().enumerate() {
            let base = self.base_freq.next_value();

            let mut mixed = 0.0;
            for i in 0..2 {
                let mut cents = self.detune_cents[i].next_value();
                if let Some(tap) = lfo_pitch[i] {
                    cents += tap[n];
                }
                let frequency = clamp_frequency(base * cents_to_ratio(cents));

                let mut level = self.level[i].next_value();
                if let Some(tap) = lfo_level[i] {
                    level += tap[n];
                }
                let gain = level.clamp(0.0, 1.0) * self.mix_gain[i].next_value();

                mixed += self.osc[i].next_sample(frequency) * gain;
            }

            let amplitude = self.amp_env.next_sample();
            let env_offset = self.filter_env.next_sample();
            let base_cutoff = self.cutoff.next_value();
            let q = self.resonance.next_value();

            if self.control_countdown == 0 {
                let mut cutoff = base_cutoff + env_offset;
                if let Some(tap) = lfo_filter {
                    cutoff += tap[n];
                }
                self.filter.set_params(cutoff, q);
                self.control_countdown = CONTROL_INTERVAL;
            }
            self.control_countdown -= 1;

            *sample = self.filter.process(mixed * amplitude);
        }

        if self.state == VoiceState::Releasing
            && !self.amp_env.is_active()
            && !self.filter_env.is_active()
        {
            self.free();
        }
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.amp_env.reset();
        self.filter_env.reset();
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Current (possibly gliding) base frequency.
    pub fn frequency(&self) -> f32 {
        self.base_freq.value()
    }

    pub fn amp_envelope(&self) -> &Envelope {
        &self.amp_env
    }

    pub fn filter_envelope(&self) -> &Envelope {
        &self.filter_env
    }

    pub fn filter(&self) -> &FilterCascade {
        &self.filter
    }

    /// Snap every smoothed parameter to `params` (no ramps on a fresh note).
    fn load_params(&mut self, params: &SynthParams) {
        let (mix1, mix2) = equal_power_gains(params.oscillator_mix);

        for id in [OscId::Osc1, OscId::Osc2] {
            let (i, osc) = (id.index(), params.osc(id));
            self.osc[i].set_waveform(osc.waveform);
            self.level[i].set_immediate(osc.level);
            self.detune_cents[i].set_immediate(semitones_to_cents(osc.detune));
        }
        self.mix_gain[0].set_immediate(mix1);
        self.mix_gain[1].set_immediate(mix2);

        self.filter.set_type(params.filter.filter_type);
        self.filter.set_slope(params.filter.slope);
        self.cutoff.set_immediate(params.filter.frequency);
        self.resonance.set_immediate(params.filter.q);
        self.control_countdown = 0;

        let amp = params.amp_env;
        let fenv = params.filter_env;
        self.amp_env.set_times(amp.attack, amp.decay, amp.release);
        self.filter_env.set_times(fenv.attack, fenv.decay, fenv.release);
    }

    fn trigger_envelopes(&mut self, params: &SynthParams) {
        let base = params.filter.frequency;
        let depth = params.filter_env_depth;
        let floor = (base - depth).max(MIN_FREQ) - base;

        self.amp_env.set_levels(0.0, 1.0, params.amp_env.sustain);
        self.filter_env
            .set_levels(floor, depth, depth * params.filter_env.sustain);

        self.amp_env.note_on();
        self.filter_env.note_on();
    }
}

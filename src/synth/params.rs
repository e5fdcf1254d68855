//! Global sound parameters and the typed edits that change them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::filter::FilterType;
use crate::dsp::lfo::{LfoDepths, LfoTap};
use crate::dsp::oscillator::OscillatorWaveform;
use crate::SynthError;

// Control ranges. Out-of-range edits clamp to these.
pub const MIN_FREQ: f32 = 20.0;
pub const MAX_FREQ: f32 = 20_000.0;
pub const MAX_Q: f32 = 30.0;
pub const MAX_DETUNE: f32 = 12.0;
pub const MAX_ENV_TIME: f32 = 2.0;
pub const MAX_GLIDE: f32 = 2.0;
pub const MAX_LFO_RATE: f32 = 20.0;
pub const MAX_LFO_FILTER_DEPTH: f32 = 5_000.0;
pub const MAX_LFO_PITCH_DEPTH: f32 = 200.0;
pub const MAX_LFO_LEVEL_DEPTH: f32 = 0.5;
pub const FILTER_SLOPES: [u32; 4] = [12, 24, 36, 48];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscId {
    Osc1,
    Osc2,
}

impl OscId {
    pub fn index(self) -> usize {
        match self {
            OscId::Osc1 => 0,
            OscId::Osc2 => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeParam {
    Attack,
    Decay,
    Sustain,
    Release,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscParams {
    pub waveform: OscillatorWaveform,
    pub level: f32,
    /// Semitones, [-12, 12].
    pub detune: f32,
}

impl Default for OscParams {
    fn default() -> Self {
        Self {
            waveform: OscillatorWaveform::Sine,
            level: 0.5,
            detune: 0.0,
        }
    }
}

/// Attack/decay/release in seconds, sustain as a level in [0, 1].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: 0.0,
            decay: 0.0,
            sustain: 1.0,
            release: 0.0,
        }
    }
}

impl EnvelopeParams {
    fn set(&mut self, param: EnvelopeParam, value: f32) {
        match param {
            EnvelopeParam::Attack => self.attack = value,
            EnvelopeParam::Decay => self.decay = value,
            EnvelopeParam::Sustain => self.sustain = value,
            EnvelopeParam::Release => self.release = value,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    pub filter_type: FilterType,
    pub frequency: f32,
    /// Resonance in dB, [0, 30].
    pub q: f32,
    /// dB per octave: 12, 24, 36 or 48.
    pub slope: u32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            filter_type: FilterType::LowPass,
            frequency: MAX_FREQ,
            q: 0.0,
            slope: 12,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoParams {
    pub rate: f32,
    pub waveform: OscillatorWaveform,
    pub depths: LfoDepths,
}

impl Default for LfoParams {
    fn default() -> Self {
        Self {
            rate: 0.0,
            waveform: OscillatorWaveform::Sine,
            depths: LfoDepths::default(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VoicingParams {
    pub monophonic: bool,
    /// Seconds, [0, 2].
    pub glide_time: f32,
}

/// Complete sound state of the synth.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthParams {
    pub master_volume: f32,
    /// Balance between the oscillators, 0 = osc 1 only, 1 = osc 2 only.
    pub oscillator_mix: f32,
    pub osc1: OscParams,
    pub osc2: OscParams,
    pub filter: FilterParams,
    pub amp_env: EnvelopeParams,
    pub filter_env: EnvelopeParams,
    /// Filter envelope sweep in Hz, [20, 20000].
    pub filter_env_depth: f32,
    pub lfo: LfoParams,
    pub voicing: VoicingParams,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            master_volume: 0.5,
            oscillator_mix: 0.5,
            osc1: OscParams::default(),
            osc2: OscParams::default(),
            filter: FilterParams::default(),
            amp_env: EnvelopeParams::default(),
            filter_env: EnvelopeParams::default(),
            filter_env_depth: MIN_FREQ,
            lfo: LfoParams::default(),
            voicing: VoicingParams::default(),
        }
    }
}

impl SynthParams {
    pub fn osc(&self, id: OscId) -> &OscParams {
        match id {
            OscId::Osc1 => &self.osc1,
            OscId::Osc2 => &self.osc2,
        }
    }

    fn osc_mut(&mut self, id: OscId) -> &mut OscParams {
        match id {
            OscId::Osc1 => &mut self.osc1,
            OscId::Osc2 => &mut self.osc2,
        }
    }

    /// A copy with every field clamped to its control range.
    pub fn clamped(&self) -> Self {
        let mut clamped = SynthParams::default();
        for change in self.changes() {
            clamped.apply(change);
        }
        clamped
    }

    /// Every field as an edit.
    pub fn changes(&self) -> Vec<ParamChange> {
        let envelope = |env: EnvelopeParams| {
            [
                (EnvelopeParam::Attack, env.attack),
                (EnvelopeParam::Decay, env.decay),
                (EnvelopeParam::Sustain, env.sustain),
                (EnvelopeParam::Release, env.release),
            ]
        };

        let mut changes = vec![
            ParamChange::MasterVolume(self.master_volume),
            ParamChange::OscillatorMix(self.oscillator_mix),
            ParamChange::FilterType(self.filter.filter_type),
            ParamChange::FilterFrequency(self.filter.frequency),
            ParamChange::FilterQ(self.filter.q),
            ParamChange::FilterSlope(self.filter.slope),
            ParamChange::FilterEnvDepth(self.filter_env_depth),
            ParamChange::LfoRate(self.lfo.rate),
            ParamChange::LfoWaveform(self.lfo.waveform),
            ParamChange::Monophonic(self.voicing.monophonic),
            ParamChange::GlideTime(self.voicing.glide_time),
        ];
        for (id, osc) in [(OscId::Osc1, self.osc1), (OscId::Osc2, self.osc2)] {
            changes.push(ParamChange::OscWaveform(id, osc.waveform));
            changes.push(ParamChange::OscLevel(id, osc.level));
            changes.push(ParamChange::OscDetune(id, osc.detune));
        }
        for (param, value) in envelope(self.amp_env) {
            changes.push(ParamChange::AmpEnvelope(param, value));
        }
        for (param, value) in envelope(self.filter_env) {
            changes.push(ParamChange::FilterEnvelope(param, value));
        }
        for tap in LfoTap::ALL {
            changes.push(ParamChange::LfoDepth(tap, self.lfo.depths.get(tap)));
        }
        changes
    }

    /// Clamp `change` to its control range and store it.
    ///
    /// Returns the value actually applied.
    pub fn apply(&mut self, change: ParamChange) -> ParamChange {
        let change = change.clamped();
        match change {
            ParamChange::OscWaveform(id, waveform) => self.osc_mut(id).waveform = waveform,
            ParamChange::OscLevel(id, level) => self.osc_mut(id).level = level,
            ParamChange::OscDetune(id, detune) => self.osc_mut(id).detune = detune,
            ParamChange::OscillatorMix(mix) => self.oscillator_mix = mix,
            ParamChange::FilterType(filter_type) => self.filter.filter_type = filter_type,
            ParamChange::FilterFrequency(frequency) => self.filter.frequency = frequency,
            ParamChange::FilterQ(q) => self.filter.q = q,
            ParamChange::FilterSlope(slope) => self.filter.slope = slope,
            ParamChange::AmpEnvelope(param, value) => self.amp_env.set(param, value),
            ParamChange::FilterEnvelope(param, value) => self.filter_env.set(param, value),
            ParamChange::FilterEnvDepth(depth) => self.filter_env_depth = depth,
            ParamChange::LfoRate(rate) => self.lfo.rate = rate,
            ParamChange::LfoWaveform(waveform) => self.lfo.waveform = waveform,
            ParamChange::LfoDepth(tap, depth) => self.lfo.depths.set(tap, depth),
            ParamChange::Monophonic(flag) => self.voicing.monophonic = flag,
            ParamChange::GlideTime(seconds) => self.voicing.glide_time = seconds,
            ParamChange::MasterVolume(volume) => self.master_volume = volume,
        }
        change
    }
}

/// One typed parameter edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamChange {
    OscWaveform(OscId, OscillatorWaveform),
    OscLevel(OscId, f32),
    OscDetune(OscId, f32),
    OscillatorMix(f32),
    FilterType(FilterType),
    FilterFrequency(f32),
    FilterQ(f32),
    FilterSlope(u32),
    AmpEnvelope(EnvelopeParam, f32),
    FilterEnvelope(EnvelopeParam, f32),
    FilterEnvDepth(f32),
    LfoRate(f32),
    LfoWaveform(OscillatorWaveform),
    LfoDepth(LfoTap, f32),
    Monophonic(bool),
    GlideTime(f32),
    MasterVolume(f32),
}

#[inline]
fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

fn clamp_envelope(param: EnvelopeParam, value: f32) -> f32 {
    match param {
        EnvelopeParam::Sustain => clamp(value, 0.0, 1.0),
        _ => clamp(value, 0.0, MAX_ENV_TIME),
    }
}

/// Snap a slope to the nearest of 12/24/36/48 dB per octave. Ties go to the gentler slope.
pub fn snap_slope(slope: f32) -> u32 {
    let stages = clamp(((slope - 6.0) / 12.0).ceil(), 1.0, FILTER_SLOPES.len() as f32);
    FILTER_SLOPES[stages as usize - 1]
}

impl ParamChange {
    /// The same edit with its value clamped to the control range.
    pub fn clamped(self) -> Self {
        use ParamChange::*;
        match self {
            OscLevel(id, v) => OscLevel(id, clamp(v, 0.0, 1.0)),
            OscDetune(id, v) => OscDetune(id, clamp(v, -MAX_DETUNE, MAX_DETUNE)),
            OscillatorMix(v) => OscillatorMix(clamp(v, 0.0, 1.0)),
            FilterFrequency(v) => FilterFrequency(clamp(v, MIN_FREQ, MAX_FREQ)),
            FilterQ(v) => FilterQ(clamp(v, 0.0, MAX_Q)),
            FilterSlope(v) => FilterSlope(snap_slope(v as f32)),
            AmpEnvelope(p, v) => AmpEnvelope(p, clamp_envelope(p, v)),
            FilterEnvelope(p, v) => FilterEnvelope(p, clamp_envelope(p, v)),
            FilterEnvDepth(v) => FilterEnvDepth(clamp(v, MIN_FREQ, MAX_FREQ)),
            LfoRate(v) => LfoRate(clamp(v, 0.0, MAX_LFO_RATE)),
            LfoDepth(tap, v) => {
                let max = match tap {
                    LfoTap::Filter => MAX_LFO_FILTER_DEPTH,
                    LfoTap::Osc1Pitch | LfoTap::Osc2Pitch => MAX_LFO_PITCH_DEPTH,
                    LfoTap::Osc1Level | LfoTap::Osc2Level => MAX_LFO_LEVEL_DEPTH,
                };
                LfoDepth(tap, clamp(v, 0.0, max))
            }
            GlideTime(v) => GlideTime(clamp(v, 0.0, MAX_GLIDE)),
            MasterVolume(v) => MasterVolume(clamp(v, 0.0, 1.0)),
            other => other,
        }
    }

    /// Parse a named edit such as `("filter.frequency", "800")`.
    pub fn parse(name: &str, value: &str) -> Result<Self, SynthError> {
        use ParamChange::*;

        let invalid = || SynthError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };
        let number = || -> Result<f32, SynthError> {
            value
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(invalid)
        };
        let waveform = || OscillatorWaveform::from_name(value).ok_or_else(invalid);

        let change = match name {
            "osc1.waveform" => OscWaveform(OscId::Osc1, waveform()?),
            "osc2.waveform" => OscWaveform(OscId::Osc2, waveform()?),
            "osc1.level" => OscLevel(OscId::Osc1, number()?),
            "osc2.level" => OscLevel(OscId::Osc2, number()?),
            "osc1.detune" => OscDetune(OscId::Osc1, number()?),
            "osc2.detune" => OscDetune(OscId::Osc2, number()?),
            "oscillatorMix" => OscillatorMix(number()?),

            "filter.type" => FilterType(
                crate::dsp::filter::FilterType::from_name(value).ok_or_else(invalid)?,
            ),
            "filter.frequency" => FilterFrequency(number()?),
            "filter.Q" => FilterQ(number()?),
            "filter.slope" => FilterSlope(snap_slope(number()?)),

            "ampEnv.attack" => AmpEnvelope(EnvelopeParam::Attack, number()?),
            "ampEnv.decay" => AmpEnvelope(EnvelopeParam::Decay, number()?),
            "ampEnv.sustain" => AmpEnvelope(EnvelopeParam::Sustain, number()?),
            "ampEnv.release" => AmpEnvelope(EnvelopeParam::Release, number()?),

            "filterEnv.attack" => FilterEnvelope(EnvelopeParam::Attack, number()?),
            "filterEnv.decay" => FilterEnvelope(EnvelopeParam::Decay, number()?),
            "filterEnv.sustain" => FilterEnvelope(EnvelopeParam::Sustain, number()?),
            "filterEnv.release" => FilterEnvelope(EnvelopeParam::Release, number()?),
            "filterEnv.depth" => FilterEnvDepth(number()?),

            "lfo.rate" => LfoRate(number()?),
            "lfo.waveform" => LfoWaveform(waveform()?),
            "lfo.filterDepth" => LfoDepth(LfoTap::Filter, number()?),
            "lfo.osc1PitchDepth" => LfoDepth(LfoTap::Osc1Pitch, number()?),
            "lfo.osc2PitchDepth" => LfoDepth(LfoTap::Osc2Pitch, number()?),
            "lfo.osc1LevelDepth" => LfoDepth(LfoTap::Osc1Level, number()?),
            "lfo.osc2LevelDepth" => LfoDepth(LfoTap::Osc2Level, number()?),

            "voicing.isMonophonic" => Monophonic(parse_flag(value).ok_or_else(invalid)?),
            "voicing.glideTime" => GlideTime(number()?),
            "master.volume" => MasterVolume(number()?),

            _ => return Err(SynthError::UnknownParameter(name.to_string())),
        };

        Ok(change.clamped())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "mono" => Some(true),
        "false" | "0" | "off" | "poly" => Some(false),
        _ => None,
    }
}

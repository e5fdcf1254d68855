//! Low Frequency Oscillator (LFO) with five modulation taps.

use crate::dsp::oscillator::OscillatorWaveform;
use crate::dsp::ramp::LinearRamp;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Low Frequency Oscillators
=========================

An LFO is simply an oscillator running at sub-audio frequencies. The same
waveform math applies, but the context and usage are completely different.

Vocabulary
----------

  control-rate    Frequencies below human hearing: ~0.1 Hz to ~20 Hz.
                  These oscillators modulate parameters over time.

  bipolar         Output swings positive AND negative: -1.0 to +1.0.
                  The LFO here is always bipolar: vibrato goes sharp AND
                  flat, a filter sweep goes above AND below the base cutoff.

  tap             One scaled copy of the LFO signal routed to one target.
                    tap[n] = lfo[n] × depth

  depth           The scale of a tap, in the target's own unit:
                    filter        Hz added to the cutoff      [0, 5000]
                    osc pitch     cents added to the detune   [0, 1200]
                    osc level     gain added to the level     [0, 1]


One LFO, Five Taps
------------------

There is exactly one LFO in the synth. It is free-running: it does NOT reset
on note_on, so every voice sees the same modulation at the same moment.

                      ┌──→ × filter depth      ──→ every voice's cutoff
                      ├──→ × osc1 pitch depth  ──→ every voice's osc 1 cents
    [LFO oscillator] ─┼──→ × osc2 pitch depth  ──→ every voice's osc 2 cents
                      ├──→ × osc1 level depth  ──→ every voice's osc 1 gain
                      └──→ × osc2 level depth  ──→ every voice's osc 2 gain

The engine renders the LFO once per block into an `LfoBlock` (five
preallocated buffers). Voices only read it. A tap whose depth is zero is
marked inactive and not rendered; voices skip it entirely.


Rate and Waveform
-----------------

Rate is clamped to [0.1, 20] Hz. Rate changes keep the phase, so the sweep
just speeds up or slows down. A waveform change restarts the cycle at
phase 0 so the new shape begins from its natural starting point.

Depth edits are ramped linearly across the next block, so turning a depth
knob never steps the modulated parameter.
*/

pub const MIN_LFO_RATE: f32 = 0.1;
pub const MAX_LFO_RATE: f32 = 20.0;
pub const MAX_FILTER_DEPTH: f32 = 5_000.0;
pub const MAX_PITCH_DEPTH: f32 = 1_200.0;
pub const MAX_LEVEL_DEPTH: f32 = 1.0;

const TAP_COUNT: usize = 5;

/// Modulation target of one LFO tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfoTap {
    Filter,
    Osc1Pitch,
    Osc2Pitch,
    Osc1Level,
    Osc2Level,
}

impl LfoTap {
    pub const ALL: [LfoTap; TAP_COUNT] = [
        LfoTap::Filter,
        LfoTap::Osc1Pitch,
        LfoTap::Osc2Pitch,
        LfoTap::Osc1Level,
        LfoTap::Osc2Level,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    fn max_depth(self) -> f32 {
        match self {
            LfoTap::Filter => MAX_FILTER_DEPTH,
            LfoTap::Osc1Pitch | LfoTap::Osc2Pitch => MAX_PITCH_DEPTH,
            LfoTap::Osc1Level | LfoTap::Osc2Level => MAX_LEVEL_DEPTH,
        }
    }
}

/// Depth of each tap.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LfoDepths {
    pub filter: f32,
    pub osc1_pitch: f32,
    pub osc2_pitch: f32,
    pub osc1_level: f32,
    pub osc2_level: f32,
}

impl LfoDepths {
    pub fn get(&self, tap: LfoTap) -> f32 {
        match tap {
            LfoTap::Filter => self.filter,
            LfoTap::Osc1Pitch => self.osc1_pitch,
            LfoTap::Osc2Pitch => self.osc2_pitch,
            LfoTap::Osc1Level => self.osc1_level,
            LfoTap::Osc2Level => self.osc2_level,
        }
    }

    pub fn set(&mut self, tap: LfoTap, depth: f32) {
        let depth = clamp_depth(tap, depth);
        match tap {
            LfoTap::Filter => self.filter = depth,
            LfoTap::Osc1Pitch => self.osc1_pitch = depth,
            LfoTap::Osc2Pitch => self.osc2_pitch = depth,
            LfoTap::Osc1Level => self.osc1_level = depth,
            LfoTap::Osc2Level => self.osc2_level = depth,
        }
    }
}

#[inline]
fn clamp_depth(tap: LfoTap, depth: f32) -> f32 {
    if depth.is_nan() {
        return 0.0;
    }
    depth.clamp(0.0, tap.max_depth())
}

/// One block of rendered LFO taps, shared read-only by every voice.
pub struct LfoBlock {
    raw: Vec<f32>,
    taps: [Vec<f32>; TAP_COUNT],
    active: [bool; TAP_COUNT],
    len: usize,
}

impl LfoBlock {
    /// Preallocate buffers for blocks of up to `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            raw: vec![0.0; capacity],
            taps: std::array::from_fn(|_| vec![0.0; capacity]),
            active: [false; TAP_COUNT],
            len: 0,
        }
    }

    /// Rendered samples for `tap`, or `None` when its depth is zero.
    #[inline]
    pub fn tap(&self, tap: LfoTap) -> Option<&[f32]> {
        let index = tap.index();
        if self.active[index] {
            Some(&self.taps[index][..self.len])
        } else {
            None
        }
    }

    /// Tap value at sample `n` (0.0 when inactive).
    #[inline]
    pub fn value(&self, tap: LfoTap, n: usize) -> f32 {
        let index = tap.index();
        if self.active[index] {
            self.taps[index][n]
        } else {
            0.0
        }
    }

    pub fn is_active(&self, tap: LfoTap) -> bool {
        self.active[tap.index()]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.raw.len()
    }
}

pub struct Lfo {
    waveform: OscillatorWaveform,
    rate_hz: f32,
    phase: f32,
    sample_rate: f32,

    depths: [LinearRamp; TAP_COUNT],
    targets: LfoDepths,
}

impl Lfo {
    pub fn new(
        sample_rate: f32,
        waveform: OscillatorWaveform,
        rate_hz: f32,
        depths: LfoDepths,
    ) -> Self {
        debug_assert!(sample_rate > 0.0);

        let mut targets = LfoDepths::default();
        for tap in LfoTap::ALL {
            targets.set(tap, depths.get(tap));
        }

        Self {
            waveform,
            rate_hz: clamp_rate(rate_hz),
            phase: 0.0,
            sample_rate,
            depths: LfoTap::ALL.map(|tap| LinearRamp::new(targets.get(tap))),
            targets,
        }
    }

    pub fn set_rate(&mut self, rate_hz: f32) {
        self.rate_hz = clamp_rate(rate_hz);
    }

    /// Switch waveform. A different waveform restarts the cycle at phase 0.
    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        if waveform != self.waveform {
            self.waveform = waveform;
            self.phase = 0.0;
        }
    }

    /// Set one tap's depth; it ramps there over the next rendered block.
    pub fn set_depth(&mut self, tap: LfoTap, depth: f32) {
        self.targets.set(tap, depth);
    }

    pub fn rate(&self) -> f32 {
        self.rate_hz
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    pub fn depths(&self) -> LfoDepths {
        self.targets
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Render `len` samples into `block`, skipping zero-depth taps.
    pub fn render(&mut self, block: &mut LfoBlock, len: usize) {
        debug_assert!(len <= block.capacity(), "LFO block overflow: {len}");
        let len = len.min(block.capacity());
        block.len = len;

        let increment = self.rate_hz / self.sample_rate;
        for sample in block.raw[..len].iter_mut() {
            *sample = self.waveform.evaluate(self.phase);
            self.phase += increment;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
        }

        for tap in LfoTap::ALL {
            let index = tap.index();
            let ramp = &mut self.depths[index];
            let target = self.targets.get(tap);
            if ramp.target() != target {
                ramp.set_target(target, len as u32);
            }

            let active = ramp.value() != 0.0 || ramp.target() != 0.0;
            block.active[index] = active;
            if !active {
                continue;
            }

            let out = &mut block.taps[index][..len];
            for (out, raw) in out.iter_mut().zip(&block.raw[..len]) {
                *out = raw * ramp.next_value();
            }
        }
    }
}

#[inline]
fn clamp_rate(rate_hz: f32) -> f32 {
    if rate_hz.is_nan() {
        return MIN_LFO_RATE;
    }
    rate_hz.clamp(MIN_LFO_RATE, MAX_LFO_RATE)
}

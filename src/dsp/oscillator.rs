use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Phase-Accumulator Oscillator
============================

An oscillator is the fundamental sound source in a synthesizer. It generates
a repeating waveform at a specific frequency (pitch), producing the raw
audio material that gets shaped by filters and envelopes.

Vocabulary
----------

  phase       Position within one cycle, normalized to [0.0, 1.0).
              0.0 is the start of the cycle, 0.5 is halfway.

  increment   How far the phase moves per sample:
                increment = frequency / sample_rate
              At 440 Hz and 48 kHz: 440 / 48000 ≈ 0.00917

  wrap        When phase passes 1.0 we subtract 1.0. The cycle repeats.

  aliasing    Harmonics above Nyquist (sample_rate / 2) fold back down as
              inharmonic tones. Waveforms with hard edges (saw, square)
              have infinitely many harmonics and alias audibly.


Waveforms
---------

Sine: A single frequency with no harmonics. Smooth, hollow, flute-like.

    sin(phase × 2π)

Square: Odd harmonics only, falling off as 1/n. Hollow, woody.

    +1 for phase < 0.5, -1 otherwise

Sawtooth: All harmonics, falling off as 1/n. Bright, buzzy, brassy.

    2 × phase - 1    (ramps from -1 up to +1, then snaps down)

Triangle: Odd harmonics falling off as 1/n². Soft, between sine and square.

    4 × |phase - 0.5| - 1    (starts at +1, down to -1 at half cycle)


Band-limiting with PolyBLEP
---------------------------

The naive saw and square jump instantaneously. A PolyBLEP (polynomial
band-limited step) replaces the sample on each side of the jump with a
smoothed polynomial residual, removing most of the aliasing for the cost
of a couple of multiplies:

    t = phase, dt = increment

    t < dt       →  (t/dt)·2 - (t/dt)² - 1        (just after the jump)
    t > 1 - dt   →  (x)² + 2x + 1, x = (t-1)/dt   (just before the jump)
    otherwise    →  0

Sawtooth jumps down once per cycle at phase 0: subtract the residual there.
Square jumps up at phase 0 and down at phase 0.5: add the residual at 0 and
subtract it at 0.5.

Sine and triangle are continuous and need no correction. The LFO uses the
naive shapes: at sub-audio rates there is nothing to alias.


Frequency Changes
-----------------

Frequency is passed per sample, so glide, detune ramps and LFO vibrato all
change pitch without resetting the phase. Changing the waveform also keeps
the phase: the new shape continues from the same point in the cycle.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OscillatorWaveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl OscillatorWaveform {
    pub const ALL: [OscillatorWaveform; 4] = [
        OscillatorWaveform::Sine,
        OscillatorWaveform::Square,
        OscillatorWaveform::Sawtooth,
        OscillatorWaveform::Triangle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OscillatorWaveform::Sine => "sine",
            OscillatorWaveform::Square => "square",
            OscillatorWaveform::Sawtooth => "sawtooth",
            OscillatorWaveform::Triangle => "triangle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sine" => Some(OscillatorWaveform::Sine),
            "square" => Some(OscillatorWaveform::Square),
            "sawtooth" | "saw" => Some(OscillatorWaveform::Sawtooth),
            "triangle" => Some(OscillatorWaveform::Triangle),
            _ => None,
        }
    }

    /// Naive value of the waveform at `phase` (no band-limiting).
    #[inline]
    pub fn evaluate(self, phase: f32) -> f32 {
        match self {
            OscillatorWaveform::Sine => (phase * TAU).sin(),
            OscillatorWaveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            OscillatorWaveform::Sawtooth => 2.0 * phase - 1.0,
            OscillatorWaveform::Triangle => 4.0 * (phase - 0.5).abs() - 1.0,
        }
    }
}

/// PolyBLEP residual for a unit step at phase 0.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

pub struct Oscillator {
    waveform: OscillatorWaveform,
    phase: f32,
    sample_rate: f32,
}

impl Oscillator {
    pub fn new(sample_rate: f32, waveform: OscillatorWaveform) -> Self {
        debug_assert!(sample_rate > 0.0);
        Self {
            waveform,
            phase: 0.0,
            sample_rate,
        }
    }

    /// Switch waveform. Takes effect on the next sample; phase is kept.
    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Output the current sample at `frequency`, then advance the phase.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32) -> f32 {
        debug_assert!(frequency.is_finite(), "oscillator frequency is {frequency}");

        let dt = frequency / self.sample_rate;
        let t = self.phase;

        let value = match self.waveform {
            OscillatorWaveform::Sine | OscillatorWaveform::Triangle => self.waveform.evaluate(t),
            OscillatorWaveform::Sawtooth => 2.0 * t - 1.0 - poly_blep(t, dt),
            OscillatorWaveform::Square => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(t, dt) - poly_blep((t + 0.5).fract(), dt)
            }
        };

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }

        value
    }

    /// Fill `out` with a constant-frequency block.
    pub fn render(&mut self, out: &mut [f32], frequency: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frequency);
        }
    }
}

//! Linear parameter ramps.

/*
Parameter Smoothing
===================

Every knob turn arrives as a discrete jump: "cutoff was 800 Hz, now it is
2000 Hz". Applying that jump to a sounding voice in a single sample creates
a step discontinuity in the output, which we hear as a click or zipper
noise. A ramp spreads the change over a short time instead.

Vocabulary
----------

  current     The value the ramp outputs right now.

  target      Where the ramp is heading.

  step        How much `current` moves per sample:
                step = (target - current) / remaining_samples

  remaining   Samples left until `current == target`.

  settled     No ramp in progress (remaining == 0, current == target).


Cancel and Restart
------------------

A new target can arrive while a ramp is still running (someone is dragging
a knob). We never jump to the old target first. The new ramp always starts
from the CURRENT interpolated value:

    value
      │          ╱‾‾‾‾‾‾‾‾‾  (new target, set mid-ramp)
      │       ╱‾
      │    ╱‾       ‾ ‾ ‾ ‾  (old target, never reached)
      │ ╱‾
      └──────────────────→ time
           ↑ retarget here

This is what makes rapid edits smooth instead of stair-stepped.


The Last Sample
---------------

Accumulating `current += step` N times drifts by a few ULPs. On the final
sample we snap to `target` so envelope boundaries and glides land exactly.


Typical Ramp Times
------------------

    10 ms   oscillator level/detune, filter cutoff/Q, master volume
    50 ms   sustain level re-ramp on a held note
    0-2 s   glide (portamento) between monophonic notes
*/

/// Ramp time applied to parameter edits that reach sounding voices.
pub const PARAM_RAMP_SECONDS: f32 = 0.010;

/// Ramp time for sustain-level edits on held notes.
pub const SUSTAIN_RAMP_SECONDS: f32 = 0.050;

/// Convert a duration into a whole number of samples (never negative).
#[inline]
pub fn seconds_to_samples(seconds: f32, sample_rate: f32) -> u32 {
    debug_assert!(seconds.is_finite(), "duration must be finite: {seconds}");
    debug_assert!(sample_rate > 0.0);
    (seconds.max(0.0) * sample_rate).round() as u32
}

/// Linear ramp from the current value to a target over a fixed number of samples.
#[derive(Debug, Clone, Copy)]
pub struct LinearRamp {
    current: f32,
    target: f32,
    step: f32,
    remaining: u32,
}

impl LinearRamp {
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
            step: 0.0,
            remaining: 0,
        }
    }

    /// Start a ramp towards `target` lasting `samples` samples.
    ///
    /// Cancels any ramp in progress; the new ramp starts from the current
    /// interpolated value. Zero samples jumps straight to the target.
    pub fn set_target(&mut self, target: f32, samples: u32) {
        debug_assert!(target.is_finite(), "ramp target must be finite: {target}");

        if samples == 0 {
            self.set_immediate(target);
            return;
        }

        self.target = target;
        self.remaining = samples;
        self.step = (target - self.current) / samples as f32;
    }

    /// Jump to `value` and cancel any ramp in progress.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.remaining = 0;
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.current = self.target;
            } else {
                self.current += self.step;
            }
        }
        self.current
    }

    /// Advance `samples` samples at once and return the new value.
    ///
    /// Used for control-rate parameters that are only read every few samples.
    #[inline]
    pub fn advance(&mut self, samples: u32) -> f32 {
        if samples >= self.remaining {
            self.current = self.target;
            self.remaining = 0;
        } else {
            self.remaining -= samples;
            self.current += self.step * samples as f32;
        }
        self.current
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_ramping(&self) -> bool {
        self.remaining > 0
    }
}

impl Default for LinearRamp {
    fn default() -> Self {
        Self::new(0.0)
    }
}

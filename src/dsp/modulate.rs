//! Parameter modulation primitives.

/*
Parameter Modulation
====================

Modulation is using one signal to continuously vary a parameter of another.
It's what makes synthesizers sound alive: without modulation, everything
sounds static.

Vocabulary
----------

  modulator     The signal doing the controlling (the LFO or an envelope).

  target        The parameter being modulated (cutoff, pitch, level).

  depth         How much the parameter changes. Scales the modulator:
                  final_value = base_value + (modulator × depth)

  base value    The parameter's "center" value when the modulator is 0.

  cent          1/100 of a semitone. 1200 cents make an octave.


The Math
--------

For each sample:

    modulated_value = base_value + (modulator_output × depth)

Example: filter cutoff with the LFO
    base_value = 1000 Hz, depth = 500 Hz, LFO swings -1.0 .. +1.0

    LFO = -1.0  →  cutoff =  500 Hz
    LFO =  0.0  →  cutoff = 1000 Hz
    LFO = +1.0  →  cutoff = 1500 Hz


Pitch Lives in Cents
--------------------

Pitch is perceived logarithmically: one octave up DOUBLES the frequency no
matter where you start. So detune and vibrato are summed in CENTS, and only
converted to a frequency ratio at the end:

    cents = detune_semitones × 100 + lfo_pitch_cents
    ratio = 2^(cents / 1200)
    freq  = base_freq × ratio

    +1200 cents  →  ×2.0    (octave up)
     +100 cents  →  ×1.0595 (semitone up)
    -1200 cents  →  ×0.5    (octave down)


Parameter Clamping
------------------

Modulation can push parameters outside valid ranges:

    base = 500 Hz, depth = 1000 Hz, LFO = -1.0  →  -500 Hz (invalid!)

The voice clamps every modulated value before use: frequencies to
[20, 20000] Hz, gains to [0, 1]. This can cause "flat spots" where the
parameter sits on its limit, which is preferable to a NaN filter.
*/

pub const MIN_FREQUENCY_HZ: f32 = 20.0;
pub const MAX_FREQUENCY_HZ: f32 = 20_000.0;

/// Frequency ratio for a pitch offset in cents.
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    (cents / 1200.0).exp2()
}

#[inline]
pub fn semitones_to_cents(semitones: f32) -> f32 {
    semitones * 100.0
}

/// Clamp a frequency into [20, 20000] Hz.
#[inline]
pub fn clamp_frequency(frequency_hz: f32) -> f32 {
    if frequency_hz.is_nan() {
        return MIN_FREQUENCY_HZ;
    }
    frequency_hz.clamp(MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cents_to_ratio() {
        assert!((cents_to_ratio(1200.0) - 2.0).abs() < 1e-6);
        assert!((cents_to_ratio(-1200.0) - 0.5).abs() < 1e-6);
        assert!((cents_to_ratio(0.0) - 1.0).abs() < 1e-6);
        assert!((cents_to_ratio(100.0) - 1.059_463).abs() < 1e-5);
    }

    #[test]
    fn test_semitones_to_cents() {
        assert_eq!(semitones_to_cents(12.0), 1200.0);
        assert_eq!(semitones_to_cents(-0.5), -50.0);
    }

    #[test]
    fn test_clamp_frequency() {
        assert_eq!(clamp_frequency(5.0), MIN_FREQUENCY_HZ);
        assert_eq!(clamp_frequency(30_000.0), MAX_FREQUENCY_HZ);
        assert_eq!(clamp_frequency(440.0), 440.0);
        assert_eq!(clamp_frequency(f32::NAN), MIN_FREQUENCY_HZ);
    }
}

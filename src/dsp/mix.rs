//! Oscillator mixing and voice summing.

use std::f32::consts::FRAC_PI_2;

/*
Signal Mixing
=============

Mixing combines signals by ADDING them together, optionally with weights.
A voice mixes its two oscillators; the engine sums every voice into one
output block.

Vocabulary
----------

  mixing        Combining signals by addition. The result contains both
                signals superimposed.

  crossfade     Transitioning between two signals using complementary
                weights. As one fades out, the other fades in.

  balance       A control value (0.0 to 1.0) that determines the mix ratio.
                  balance = 0.0  →  only oscillator 1
                  balance = 0.5  →  both, equally loud
                  balance = 1.0  →  only oscillator 2

  summing       Adding signals at equal levels (no weighting). Can exceed
                ±1.0 when several voices peak together.


Linear vs Equal-Power Crossfade
-------------------------------

LINEAR:

    weight_a = 1.0 - balance
    weight_b = balance

    At balance = 0.5 both signals sit at 50% amplitude, and the perceived
    loudness DIPS in the middle. Two uncorrelated signals at 50% don't sound
    as loud as one at 100%: power adds, not amplitude.

EQUAL-POWER (what we implement):

    weight_a = cos(balance × π/2)
    weight_b = sin(balance × π/2)

    weight_a² + weight_b² = 1 for every balance, so the total POWER is
    constant through the sweep.

    Level
      1.0 ──────╮          ╭──────
                 ╲        ╱
     0.707        ╳──────╳   ← both at √½ in the middle
                 ╱        ╲
      0.0 ──────╯          ╰──────
          0.0     0.5     1.0
                balance

Detuned oscillators are uncorrelated (their phase relationship keeps
drifting), which is exactly the case equal-power mixing is designed for.


Clipping Risk
-------------

Equal-power weights sum to more than 1.0 in the middle (0.707 + 0.707), and
a chord sums several voices. The engine applies the master volume after
summing and leaves any limiting to the output stage.
*/

/// Equal-power crossfade weights `(cos(mix·π/2), sin(mix·π/2))`.
///
/// `mix` is clamped to [0, 1].
#[inline]
pub fn equal_power_gains(mix: f32) -> (f32, f32) {
    let mix = if mix.is_nan() { 0.5 } else { mix.clamp(0.0, 1.0) };
    let (sin, cos) = (mix * FRAC_PI_2).sin_cos();
    (cos, sin)
}

/// Add signal B into signal A in-place (summing).
///
/// ⚠️ WARNING: Can exceed [-1.0, +1.0] range!
#[inline]
pub fn sum_in_place(a: &mut [f32], b: &[f32]) {
    debug_assert_eq!(a.len(), b.len());

    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb;
    }
}

/// Largest absolute sample in the block.
#[inline]
pub fn peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Resonant Biquad Cascade
=======================

A subtractive synth starts from a harmonically rich waveform and carves
harmonics away. The filter is the carving tool.

| type      | passes       | rejects      |
| --------- | ------------ | ------------ |
| low-pass  | below cutoff | above cutoff |
| high-pass | above cutoff | below cutoff |

Vocabulary
----------

  cutoff      The frequency (Hz) where the filter starts to act.

  resonance   A boost right at the cutoff. Expressed here in dB the way most
              synth panels do: 0 dB is a flat (Butterworth-ish) knee, 30 dB
              is a screaming peak. Converted to the biquad's linear Q with
                Q = 10^(dB / 20)

  slope       How quickly the filter attenuates past the cutoff, in dB per
              octave. One biquad gives 12 dB/oct. Chaining N identical
              biquads gives 12·N dB/oct.

  stage       One biquad section in the chain.


The Biquad (RBJ Audio EQ Cookbook)
----------------------------------

A biquad is a two-pole, two-zero filter:

    y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] - a1·y[n-1] - a2·y[n-2]

Coefficients for a given cutoff f0 and Q at sample rate fs:

    w0    = 2π · f0 / fs
    alpha = sin(w0) / (2·Q)

    low-pass:   b0 = (1 - cos w0)/2   b1 = 1 - cos w0      b2 = b0
    high-pass:  b0 = (1 + cos w0)/2   b1 = -(1 + cos w0)   b2 = b0

                a0 = 1 + alpha        a1 = -2 cos w0       a2 = 1 - alpha

Everything is divided by a0 once so the per-sample loop skips it.

We evaluate in Direct Form II Transposed: two state variables per stage,
good numerical behavior in f32.

    y  = b0·x + z1
    z1 = b1·x - a1·y + z2
    z2 = b2·x - a2·y


The Cascade
-----------

    in ──→ [stage 1] ──→ [stage 2] ──→ [stage 3] ──→ [stage 4] ──→ out
           12 dB/oct     24 dB/oct     36 dB/oct     48 dB/oct

All stages share one coefficient set. The slope selects how many are
active (slope / 12, clamped to 0..=4). Inactive stages are skipped, not
bypassed-by-math: they cost nothing. A stage coming back into the chain
has its state cleared, so it never replays stale history.


Coefficient Updates
-------------------

Computing coefficients costs a sin, a cos and a division. Cutoff moves every
sample when an envelope or LFO sweeps it, so the voice feeds the cascade a
new cutoff at a fixed control interval and the cascade only recomputes when
cutoff, Q or type actually changed.
*/

/// Lowest cutoff the cascade accepts.
pub const MIN_CUTOFF_HZ: f32 = 20.0;
/// Highest cutoff the cascade accepts (also capped below Nyquist).
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
/// Number of biquad stages available to the cascade.
pub const MAX_STAGES: usize = 4;

const MIN_LINEAR_Q: f32 = 1e-4;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    LowPass,
    HighPass,
}

impl FilterType {
    pub fn name(self) -> &'static str {
        match self {
            FilterType::LowPass => "lowpass",
            FilterType::HighPass => "highpass",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "lowpass" => Some(FilterType::LowPass),
            "highpass" => Some(FilterType::HighPass),
            _ => None,
        }
    }
}

/// Number of active stages for a slope in dB/octave.
#[inline]
pub fn stages_for_slope(slope_db: u32) -> usize {
    ((slope_db / 12) as usize).min(MAX_STAGES)
}

/// Clamp a cutoff into the audible range and below Nyquist.
#[inline]
pub fn clamp_cutoff(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let ceiling = MAX_CUTOFF_HZ.min(sample_rate * 0.49);
    if cutoff_hz.is_nan() {
        return ceiling;
    }
    cutoff_hz.clamp(MIN_CUTOFF_HZ, ceiling)
}

/// Normalized biquad coefficients (a0 already divided out).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
}

impl BiquadCoefficients {
    /// Pass-through coefficients.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    pub fn new(
        filter_type: FilterType,
        cutoff_hz: f32,
        resonance_db: f32,
        sample_rate: f32,
    ) -> Self {
        let w0 = TAU * cutoff_hz / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let q = 10f32.powf(resonance_db / 20.0).max(MIN_LINEAR_Q);
        let alpha = sin_w0 / (2.0 * q);

        let (b0, b1, b2) = match filter_type {
            FilterType::LowPass => {
                let b1 = 1.0 - cos_w0;
                (b1 * 0.5, b1, b1 * 0.5)
            }
            FilterType::HighPass => {
                let b1 = -(1.0 + cos_w0);
                (-b1 * 0.5, b1, -b1 * 0.5)
            }
        };

        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        let coeffs = Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        };
        debug_assert!(
            coeffs.b0.is_finite() && coeffs.a1.is_finite() && coeffs.a2.is_finite(),
            "non-finite biquad coefficients for cutoff {} Hz",
            cutoff_hz
        );
        coeffs
    }
}

/// State of one DF2T biquad section.
#[derive(Debug, Clone, Copy, Default)]
pub struct Biquad {
    z1: f32,
    z2: f32,
}

impl Biquad {
    #[inline]
    pub fn process(&mut self, x: f32, c: &BiquadCoefficients) -> f32 {
        let y = c.b0 * x + self.z1;
        self.z1 = c.b1 * x - c.a1 * y + self.z2;
        self.z2 = c.b2 * x - c.a2 * y;
        y
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

pub struct FilterCascade {
    stages: [Biquad; MAX_STAGES],
    active: usize,
    coefficients: BiquadCoefficients,

    filter_type: FilterType,
    cutoff_hz: f32,
    resonance_db: f32,
    sample_rate: f32,
}

impl FilterCascade {
    pub fn new(
        sample_rate: f32,
        filter_type: FilterType,
        cutoff_hz: f32,
        resonance_db: f32,
        slope_db: u32,
    ) -> Self {
        debug_assert!(sample_rate > 0.0);
        let cutoff_hz = clamp_cutoff(cutoff_hz, sample_rate);
        Self {
            stages: [Biquad::default(); MAX_STAGES],
            active: stages_for_slope(slope_db),
            coefficients: BiquadCoefficients::new(
                filter_type,
                cutoff_hz,
                resonance_db,
                sample_rate,
            ),
            filter_type,
            cutoff_hz,
            resonance_db,
            sample_rate,
        }
    }

    /// Set cutoff and resonance; recomputes coefficients only if either changed.
    ///
    /// Returns true when the coefficients were recomputed.
    pub fn set_params(&mut self, cutoff_hz: f32, resonance_db: f32) -> bool {
        let cutoff_hz = clamp_cutoff(cutoff_hz, self.sample_rate);
        if cutoff_hz == self.cutoff_hz && resonance_db == self.resonance_db {
            return false;
        }
        self.cutoff_hz = cutoff_hz;
        self.resonance_db = resonance_db;
        self.recompute();
        true
    }

    pub fn set_type(&mut self, filter_type: FilterType) {
        if filter_type != self.filter_type {
            self.filter_type = filter_type;
            self.recompute();
        }
    }

    /// Select the number of active stages from a slope in dB/octave.
    pub fn set_slope(&mut self, slope_db: u32) {
        let active = stages_for_slope(slope_db);
        // Stages re-entering the chain start from silence
        for stage in self.stages.iter_mut().take(active).skip(self.active) {
            stage.reset();
        }
        self.active = active;
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let coeffs = &self.coefficients;
        self.stages[..self.active]
            .iter_mut()
            .fold(sample, |x, stage| stage.process(x, coeffs))
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        for stage in self.stages.iter_mut() {
            stage.reset();
        }
    }

    pub fn active_stages(&self) -> usize {
        self.active
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn resonance(&self) -> f32 {
        self.resonance_db
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    fn recompute(&mut self) {
        self.coefficients = BiquadCoefficients::new(
            self.filter_type,
            self.cutoff_hz,
            self.resonance_db,
            self.sample_rate,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::{Oscillator, OscillatorWaveform};

    const SAMPLE_RATE: f32 = 48_000.0;

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len() / 2;
        buffer[skip..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    fn filtered_sine_peak(filter: &mut FilterCascade, frequency: f32) -> f32 {
        let mut osc = Oscillator::new(SAMPLE_RATE, OscillatorWaveform::Sine);
        let mut buffer = vec![0.0f32; 4096];
        osc.render(&mut buffer, frequency);
        filter.render(&mut buffer);
        peak_after_transient(&buffer)
    }

    #[test]
    fn slope_selects_active_stages() {
        for (slope, expected) in [(0, 0), (12, 1), (24, 2), (36, 3), (48, 4), (96, 4)] {
            let filter = FilterCascade::new(SAMPLE_RATE, FilterType::LowPass, 1_000.0, 0.0, slope);
            assert_eq!(
                filter.active_stages(),
                expected,
                "slope {} should activate {} stages",
                slope,
                expected
            );
        }
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut filter = FilterCascade::new(SAMPLE_RATE, FilterType::LowPass, 500.0, 0.0, 24);
        let mut buffer = vec![1.0; 4096];
        filter.render(&mut buffer);
        assert!((buffer[4095] - 1.0).abs() < 1e-3, "got {}", buffer[4095]);
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut filter = FilterCascade::new(SAMPLE_RATE, FilterType::HighPass, 500.0, 0.0, 12);
        let mut buffer = vec![1.0; 4096];
        filter.render(&mut buffer);
        assert!(buffer[4095].abs() < 1e-3, "got {}", buffer[4095]);
    }

    #[test]
    fn lowpass_attenuates_above_cutoff() {
        let mut filter = FilterCascade::new(SAMPLE_RATE, FilterType::LowPass, 500.0, 0.0, 12);
        let peak = filtered_sine_peak(&mut filter, 5_000.0);
        assert!(peak < 0.05, "expected high freq attenuation, got peak: {}", peak);
    }

    #[test]
    fn steeper_slope_attenuates_more() {
        let mut gentle = FilterCascade::new(SAMPLE_RATE, FilterType::LowPass, 1_000.0, 0.0, 12);
        let mut steep = FilterCascade::new(SAMPLE_RATE, FilterType::LowPass, 1_000.0, 0.0, 48);

        let gentle_peak = filtered_sine_peak(&mut gentle, 4_000.0);
        let steep_peak = filtered_sine_peak(&mut steep, 4_000.0);
        assert!(
            steep_peak < gentle_peak * 0.1,
            "48 dB/oct should attenuate much more: gentle={}, steep={}",
            gentle_peak,
            steep_peak
        );
    }

    #[test]
    fn resonance_boosts_cutoff() {
        let mut flat = FilterCascade::new(SAMPLE_RATE, FilterType::LowPass, 1_000.0, 0.0, 12);
        let mut resonant = FilterCascade::new(SAMPLE_RATE, FilterType::LowPass, 1_000.0, 12.0, 12);

        let flat_peak = filtered_sine_peak(&mut flat, 1_000.0);
        let resonant_peak = filtered_sine_peak(&mut resonant, 1_000.0);
        assert!(
            resonant_peak > flat_peak * 2.0,
            "resonance should boost the cutoff: flat={}, resonant={}",
            flat_peak,
            resonant_peak
        );
    }

    #[test]
    fn zero_stages_pass_through() {
        let mut filter = FilterCascade::new(SAMPLE_RATE, FilterType::LowPass, 100.0, 0.0, 0);
        assert_eq!(filter.process(0.75), 0.75);
    }

    #[test]
    fn coefficients_only_recomputed_on_change() {
        let mut filter = FilterCascade::new(SAMPLE_RATE, FilterType::LowPass, 1_000.0, 0.0, 12);
        assert!(!filter.set_params(1_000.0, 0.0));
        assert!(filter.set_params(1_200.0, 0.0));
        assert!(!filter.set_params(1_200.0, 0.0));
        assert!(filter.set_params(1_200.0, 3.0));
    }

    #[test]
    fn cutoff_is_clamped() {
        let mut filter = FilterCascade::new(SAMPLE_RATE, FilterType::LowPass, 1_000.0, 0.0, 12);
        filter.set_params(50_000.0, 0.0);
        assert_eq!(filter.cutoff(), MAX_CUTOFF_HZ);
        filter.set_params(-10.0, 0.0);
        assert_eq!(filter.cutoff(), MIN_CUTOFF_HZ);

        let low_rate = FilterCascade::new(32_000.0, FilterType::LowPass, 20_000.0, 0.0, 12);
        assert!(low_rate.cutoff() < 16_000.0);
    }

    #[test]
    fn reactivated_stages_start_clean() {
        let mut filter = FilterCascade::new(SAMPLE_RATE, FilterType::LowPass, 1_000.0, 0.0, 48);
        let mut buffer = vec![1.0; 512];
        filter.render(&mut buffer);

        filter.set_slope(12);
        filter.set_slope(48);
        for stage in &filter.stages[1..] {
            assert_eq!((stage.z1, stage.z2), (0.0, 0.0), "stale stage state");
        }
        assert!(filter.stages[0].z1 != 0.0, "active stage keeps its state");
    }
}

//! Low-level DSP primitives used by the voice and engine layers.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They intentionally stay focused on the
//! signal-processing math so the `synth` layer can layer on orchestration,
//! parameter smoothing and modulation routing.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// RBJ biquad stages and the cascaded multi-slope filter.
pub mod filter;
/// Low frequency oscillator with five modulation taps.
pub mod lfo;
/// Equal-power oscillator mixing and block summing.
pub mod mix;
/// Modulation math: cents, semitones, depth scaling.
pub mod modulate;
/// Phase-accumulator oscillator waveforms.
pub mod oscillator;
/// Linear parameter ramps (smoothing, glide).
pub mod ramp;

pub use envelope::{Envelope, EnvelopeStage};
pub use filter::{Biquad, BiquadCoefficients, FilterCascade, FilterType};
pub use lfo::{Lfo, LfoBlock, LfoDepths, LfoTap};
pub use oscillator::{Oscillator, OscillatorWaveform};
pub use ramp::LinearRamp;

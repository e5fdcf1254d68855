//! Engine construction settings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::SynthError;

/// Static engine configuration, fixed for the lifetime of a `Synth`.
///
/// Sound parameters live in [`SynthParams`](crate::SynthParams) and can
/// change at runtime; these cannot.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Size of the voice slot arena. Notes beyond this steal a voice.
    pub max_voices: usize,
    /// Capacity of the control → audio message ring.
    pub control_queue_capacity: usize,
    /// Capacity of the audio → control status ring.
    pub status_queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_voices: 16,
            control_queue_capacity: 1024,
            status_queue_capacity: 64,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }

    pub fn validate(&self) -> Result<(), SynthError> {
        if !(self.sample_rate.is_finite() && self.sample_rate >= 8_000.0) {
            return Err(SynthError::InvalidConfig("sample rate must be at least 8 kHz"));
        }
        if self.max_voices == 0 || self.max_voices > u16::MAX as usize {
            return Err(SynthError::InvalidConfig("max_voices must be in 1..=65535"));
        }
        if self.control_queue_capacity == 0 || self.status_queue_capacity == 0 {
            return Err(SynthError::InvalidConfig("queue capacities must be non-zero"));
        }
        Ok(())
    }
}

use crate::dsp::ramp::seconds_to_samples;

/*
ADSR Envelope Implementation
============================

This module implements a linear ADSR envelope generator - the workhorse of
synthesizer amplitude control, and (with different levels) of filter sweeps.

Vocabulary
----------

  level       The envelope's current output value. For amplitude this is
              0.0 to 1.0 and multiplies the audio signal. For the filter
              envelope it is an offset in Hz added to the base cutoff.

  stage       Which phase of the envelope we're in: Idle, Attack, Decay,
              Sustain, or Release. A state machine governs transitions.

  gate        The note on/off signal. Gate high (note_on) triggers Attack.
              Gate low (note_off) triggers Release from wherever we are.

  floor       Where the envelope rests when idle, and where release ends.
              0.0 for amplitude.

  peak        Where the attack ends. 1.0 for amplitude.

  segment     One straight line: start level, end level, length in samples.
              Attack, Decay, Release (and a sustain re-ramp) are segments.


The Shape: Linear Segments
--------------------------

  Level
   peak ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
  floor └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release
         (A)   (D)      (S)      (R)

We use LINEAR ramps (straight lines) rather than exponential curves.

Linear pros:  Simple, predictable, CPU-cheap, lands exactly on its targets
Linear cons:  Doesn't match how acoustic sounds decay (exponential)


The Math: Counting Samples
--------------------------

Each segment is converted to a whole number of samples when it starts:

    total = round(time_seconds * sample_rate)

and evaluated by interpolation rather than by accumulating an increment:

    level = start + (end - start) * elapsed / total

Interpolation means the last sample of a segment is EXACTLY `end`. The
sustain level is reached exactly at attack + decay, and release reaches the
floor exactly `release` seconds after note_off. A zero-length segment
completes immediately.


The State Machine
-----------------

    ┌──────┐  note_on   ┌────────┐  peak    ┌───────┐  sustain  ┌─────────┐
    │ Idle │ ─────────→ │ Attack │ ───────→ │ Decay │ ────────→ │ Sustain │
    └──────┘            └────────┘          └───────┘           └─────────┘
        ↑                   │ note_off          │ note_off           │ note_off
        │  floor            ↓                   ↓                    ↓
        └─────────────── ┌─────────┐ ←──────────┴────────────────────┘
                         │ Release │
                         └─────────┘ ──── note_on ──→ Attack (from current level)

Key behaviors:

  - note_off triggers Release from ANY non-idle stage. Release always
    starts from the CURRENT level, so releasing mid-attack never clicks.

  - note_on during Release (a retrigger) starts the new Attack from the
    CURRENT level, not from the floor. Again: no discontinuity.


Changing Sustain While Held
---------------------------

A sustain edit on a held note must not jump. In Sustain we start a short
re-ramp (see `SUSTAIN_RAMP_SECONDS`) from the current level to the new
sustain. In Decay we bend the remaining decay segment toward the new
target. Attack and Release pick the new value up when they reach it.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,    // Gate low, envelope inactive, level = floor
    Attack,  // Gate just went high, ramping to peak
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, ramping back to floor
}

pub struct Envelope {
    sample_rate: f32,

    // Shape parameters
    attack_time: f32,   // seconds to ramp current → peak
    decay_time: f32,    // seconds to ramp peak → sustain
    release_time: f32,  // seconds to ramp current → floor
    floor: f32,         // resting level
    peak: f32,          // attack target
    sustain_level: f32, // level to hold

    // Runtime state
    stage: EnvelopeStage,
    level: f32,

    // Active segment (attack, decay, release or a sustain re-ramp)
    segment_start: f32,
    segment_end: f32,
    segment_total: u32,
    segment_elapsed: u32,
}

impl Envelope {
    /// Amplitude envelope: floor 0.0, peak 1.0.
    pub fn adsr(sample_rate: f32, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self::with_levels(
            sample_rate,
            attack,
            decay,
            release,
            0.0,
            1.0,
            sustain.clamp(0.0, 1.0),
        )
    }

    /// Envelope with arbitrary floor/peak/sustain levels.
    pub fn with_levels(
        sample_rate: f32,
        attack: f32,
        decay: f32,
        release: f32,
        floor: f32,
        peak: f32,
        sustain: f32,
    ) -> Self {
        debug_assert!(sample_rate > 0.0);

        Self {
            sample_rate,
            attack_time: attack.max(0.0),
            decay_time: decay.max(0.0),
            release_time: release.max(0.0),
            floor,
            peak,
            sustain_level: sustain,

            stage: EnvelopeStage::Idle,
            level: floor,
            segment_start: floor,
            segment_end: floor,
            segment_total: 0,
            segment_elapsed: 0,
        }
    }

    /// Update segment durations. Takes effect from the next segment.
    pub fn set_times(&mut self, attack: f32, decay: f32, release: f32) {
        debug_assert!(attack >= 0.0 && decay >= 0.0 && release >= 0.0);
        self.attack_time = attack.max(0.0);
        self.decay_time = decay.max(0.0);
        self.release_time = release.max(0.0);
    }

    /// Update floor/peak/sustain. Used at trigger time; a held note keeps
    /// its current segment.
    pub fn set_levels(&mut self, floor: f32, peak: f32, sustain: f32) {
        debug_assert!(floor.is_finite() && peak.is_finite() && sustain.is_finite());
        if matches!(self.stage, EnvelopeStage::Idle) {
            self.level = floor;
        }
        self.floor = floor;
        self.peak = peak;
        self.sustain_level = sustain;
    }

    /// Change the sustain level without jumping.
    ///
    /// In Sustain the level re-ramps over `ramp_seconds`; in Decay the rest of
    /// the decay segment is retargeted.
    pub fn set_sustain(&mut self, sustain: f32, ramp_seconds: f32) {
        self.sustain_level = sustain;

        match self.stage {
            EnvelopeStage::Sustain => {
                let samples = seconds_to_samples(ramp_seconds, self.sample_rate);
                self.start_segment(sustain, samples);
                if samples == 0 {
                    self.level = sustain;
                }
            }
            EnvelopeStage::Decay => {
                let remaining = self.segment_total.saturating_sub(self.segment_elapsed);
                self.start_segment(sustain, remaining);
                if remaining == 0 {
                    self.level = sustain;
                    self.stage = EnvelopeStage::Sustain;
                }
            }
            _ => {}
        }
    }

    /// Gate high: start the attack phase from the current level.
    pub fn note_on(&mut self) {
        self.enter_attack();
    }

    /// Gate low: start the release phase from the current level.
    pub fn note_off(&mut self) {
        if matches!(self.stage, EnvelopeStage::Idle | EnvelopeStage::Release) {
            return;
        }
        self.enter_release();
    }

    /// Advance the envelope by one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = self.floor;
            }

            EnvelopeStage::Attack => {
                if self.step_segment() {
                    self.enter_decay();
                }
            }

            EnvelopeStage::Decay => {
                if self.step_segment() {
                    self.stage = EnvelopeStage::Sustain;
                    self.segment_total = 0;
                }
            }

            EnvelopeStage::Sustain => {
                // Either holding, or re-ramping after a sustain edit
                if self.segment_total > 0 {
                    if self.step_segment() {
                        self.segment_total = 0;
                    }
                } else {
                    self.level = self.sustain_level;
                }
            }

            EnvelopeStage::Release => {
                if self.step_segment() {
                    self.level = self.floor;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!(self.level.is_finite());
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeStage::Idle)
    }

    /// Reset to idle state.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = self.floor;
        self.segment_total = 0;
        self.segment_elapsed = 0;
    }

    /// Current envelope level
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Current envelope stage
    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn sustain_level(&self) -> f32 {
        self.sustain_level
    }

    pub fn release_time(&self) -> f32 {
        self.release_time
    }

    fn enter_attack(&mut self) {
        self.stage = EnvelopeStage::Attack;
        let samples = seconds_to_samples(self.attack_time, self.sample_rate);
        self.start_segment(self.peak, samples);
        if samples == 0 {
            self.level = self.peak;
            self.enter_decay();
        }
    }

    fn enter_decay(&mut self) {
        self.stage = EnvelopeStage::Decay;
        let samples = seconds_to_samples(self.decay_time, self.sample_rate);
        self.start_segment(self.sustain_level, samples);
        if samples == 0 {
            self.level = self.sustain_level;
            self.stage = EnvelopeStage::Sustain;
            self.segment_total = 0;
        }
    }

    fn enter_release(&mut self) {
        self.stage = EnvelopeStage::Release;
        let samples = seconds_to_samples(self.release_time, self.sample_rate);
        self.start_segment(self.floor, samples);
        if samples == 0 {
            self.level = self.floor;
            self.stage = EnvelopeStage::Idle;
        }
    }

    fn start_segment(&mut self, end: f32, samples: u32) {
        self.segment_start = self.level;
        self.segment_end = end;
        self.segment_total = samples;
        self.segment_elapsed = 0;
    }

    /// Advance the active segment. Returns true on its final sample.
    #[inline]
    fn step_segment(&mut self) -> bool {
        if self.segment_total == 0 {
            self.level = self.segment_end;
            return true;
        }

        self.segment_elapsed += 1;
        if self.segment_elapsed >= self.segment_total {
            self.level = self.segment_end;
            return true;
        }

        let progress = self.segment_elapsed as f32 / self.segment_total as f32;
        self.level = self.segment_start + (self.segment_end - self.segment_start) * progress;
        false
    }
}

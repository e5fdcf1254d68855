//! End-to-end scenarios: messages in through the control handle, samples out
//! of the engine, pitch checked with an FFT.

use rustfft::{num_complex::Complex, FftPlanner};
use saavy_synth::{
    dsp::{FilterType, OscillatorWaveform},
    io::{midi_note_to_freq, note_to_freq},
    synth::{MessageReceiver, StatusSink},
    EngineConfig, Synth, SynthError, SynthParams,
};

const SAMPLE_RATE: f32 = 48_000.0;
const FFT_LEN: usize = 16_384;

fn sine_params() -> SynthParams {
    let mut params = SynthParams::default();
    params.osc1.waveform = OscillatorWaveform::Sine;
    params.osc2.waveform = OscillatorWaveform::Sine;
    params
}

/// Render in host-sized blocks so messages are picked up between them.
fn render<R: MessageReceiver, S: StatusSink>(synth: &mut Synth<R, S>, frames: usize) -> Vec<f32> {
    let mut out = vec![0.0; frames];
    for chunk in out.chunks_mut(256) {
        synth.render(chunk);
    }
    out
}

fn seconds(s: f32) -> usize {
    (s * SAMPLE_RATE) as usize
}

/// Hann-windowed magnitude spectrum of the first `FFT_LEN` samples.
fn spectrum(samples: &[f32]) -> Vec<f32> {
    assert!(samples.len() >= FFT_LEN, "need {} samples, got {}", FFT_LEN, samples.len());
    let mut buf: Vec<Complex<f32>> = samples[..FFT_LEN]
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let w = 0.5 - 0.5 * (std::f32::consts::TAU * i as f32 / (FFT_LEN - 1) as f32).cos();
            Complex::new(s * w, 0.0)
        })
        .collect();
    FftPlanner::new().plan_fft_forward(FFT_LEN).process(&mut buf);
    buf[..FFT_LEN / 2].iter().map(|c| c.norm()).collect()
}

fn bin_hz() -> f32 {
    SAMPLE_RATE / FFT_LEN as f32
}

/// Frequency of the loudest bin between `lo` and `hi` Hz.
fn loudest_between(mags: &[f32], lo: f32, hi: f32) -> (f32, f32) {
    let start = (lo / bin_hz()) as usize;
    let end = ((hi / bin_hz()) as usize).min(mags.len() - 1);
    let (bin, mag) = mags[start..=end]
        .iter()
        .enumerate()
        .fold((0, 0.0f32), |best, (i, &m)| if m > best.1 { (i, m) } else { best });
    ((start + bin) as f32 * bin_hz(), mag)
}

fn energy_above(mags: &[f32], hz: f32) -> f32 {
    let start = (hz / bin_hz()) as usize;
    mags[start..].iter().map(|m| m * m).sum()
}

#[test]
fn a4_is_440() {
    assert!((midi_note_to_freq(69) - 440.0).abs() < 1e-3);
    let a4 = note_to_freq("A4").expect("A4 parses");
    assert!((a4 - 440.0).abs() < 1e-3, "A4 = {}", a4);
    let c4 = note_to_freq("C4").expect("C4 parses");
    assert!((c4 - 261.626).abs() < 0.01, "C4 = {}", c4);
}

#[test]
fn chord_contains_both_pitches() {
    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);
    let (mut synth, mut handle) = Synth::with_params(config, sine_params()).expect("engine");

    handle.note_on("C4").expect("queue");
    handle.note_on("E4").expect("queue");
    let out = render(&mut synth, FFT_LEN + seconds(0.1));

    let mags = spectrum(&out[seconds(0.1)..]);
    let (c4, c4_mag) = loudest_between(&mags, 230.0, 295.0);
    let (e4, e4_mag) = loudest_between(&mags, 300.0, 360.0);
    assert!((c4 - 261.63).abs() < 2.0 * bin_hz(), "C4 peak at {}", c4);
    assert!((e4 - 329.63).abs() < 2.0 * bin_hz(), "E4 peak at {}", e4);

    let (_, noise) = loudest_between(&mags, 1_000.0, 2_000.0);
    assert!(c4_mag > 100.0 * noise, "C4 {} vs floor {}", c4_mag, noise);
    assert!(e4_mag > 100.0 * noise, "E4 {} vs floor {}", e4_mag, noise);

    assert_eq!(synth.active_notes().iter().collect::<Vec<_>>(), vec![60, 64]);
    assert_eq!(synth.pool().sounding_voices(), 2);
}

#[test]
fn released_note_frees_its_voice_after_the_tail() {
    let mut params = sine_params();
    params.amp_env.release = 0.05;
    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);
    let (mut synth, mut handle) = Synth::with_params(config, params).expect("engine");

    handle.note_on("C4").expect("queue");
    handle.note_on("E4").expect("queue");
    render(&mut synth, seconds(0.05));

    handle.note_off("C4").expect("queue");
    render(&mut synth, seconds(0.02));
    assert_eq!(synth.active_notes().iter().collect::<Vec<_>>(), vec![64]);
    assert_eq!(synth.pool().sounding_voices(), 2, "C4 should still be in its release");

    render(&mut synth, seconds(0.1));
    assert_eq!(synth.pool().sounding_voices(), 1);

    let status = handle.latest_status();
    assert_eq!(status.voices, 1);
    assert!(status.active.contains(64));
    assert!(!status.active.contains(60));
}

#[test]
fn mono_glide_lands_on_the_new_note() {
    let mut params = sine_params();
    params.voicing.monophonic = true;
    params.voicing.glide_time = 0.05;
    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);
    let (mut synth, mut handle) = Synth::with_params(config, params).expect("engine");

    handle.note_on("C4").expect("queue");
    render(&mut synth, seconds(0.1));
    handle.note_on("E4").expect("queue");
    let out = render(&mut synth, seconds(0.1) + FFT_LEN);

    assert_eq!(synth.active_notes().iter().collect::<Vec<_>>(), vec![64]);
    assert_eq!(synth.pool().sounding_voices(), 1);
    assert_eq!(synth.pool().current_note(), Some(64));

    let mags = spectrum(&out[seconds(0.1)..]);
    let (peak, _) = loudest_between(&mags, 200.0, 400.0);
    assert!((peak - 329.63).abs() < 2.0 * bin_hz(), "glided to {}", peak);
}

#[test]
fn lowpass_removes_upper_harmonics() {
    let bright = {
        let mut params = sine_params();
        params.osc1.waveform = OscillatorWaveform::Sawtooth;
        params.osc2.waveform = OscillatorWaveform::Sawtooth;
        params
    };
    let mut dark = bright;
    dark.filter.filter_type = FilterType::LowPass;
    dark.filter.frequency = 500.0;
    dark.filter.slope = 48;

    let mut high_energy = Vec::new();
    for params in [bright, dark] {
        let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);
        let (mut synth, mut handle) = Synth::with_params(config, params).expect("engine");
        handle.note_on("A3").expect("queue");
        let out = render(&mut synth, FFT_LEN + seconds(0.05));
        high_energy.push(energy_above(&spectrum(&out[seconds(0.05)..]), 4_000.0));
    }

    assert!(
        high_energy[1] < high_energy[0] * 1e-4,
        "energy above 4kHz: open {} filtered {}",
        high_energy[0],
        high_energy[1]
    );
}

#[test]
fn named_parameter_edits_reach_the_engine() {
    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);
    let (mut synth, mut handle) = Synth::with_params(config, sine_params()).expect("engine");

    handle.set_parameter("filter.frequency", "800").expect("known parameter");
    handle.set_parameter("master.volume", "0").expect("known parameter");
    handle.note_on("A4").expect("queue");
    let out = render(&mut synth, seconds(0.1));

    assert_eq!(synth.params().filter.frequency, 800.0);
    assert_eq!(synth.params().master_volume, 0.0);
    // Master gain ramps to zero within 10ms
    let tail = &out[seconds(0.05)..];
    assert!(tail.iter().all(|s| s.abs() < 1e-6), "volume 0 should be silent");

    assert_eq!(
        handle.set_parameter("filter.cutoff", "800"),
        Err(SynthError::UnknownParameter("filter.cutoff".to_string()))
    );
}

#[test]
fn all_notes_off_silences_everything() {
    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);
    let (mut synth, mut handle) = Synth::with_params(config, sine_params()).expect("engine");

    for note in ["C4", "E4", "G4", "C5"] {
        handle.note_on(note).expect("queue");
    }
    render(&mut synth, seconds(0.02));
    assert_eq!(synth.pool().sounding_voices(), 4);

    handle.all_notes_off().expect("queue");
    let out = render(&mut synth, seconds(0.05));
    assert!(synth.active_notes().is_empty());
    assert_eq!(synth.pool().sounding_voices(), 0);
    assert!(out[seconds(0.01)..].iter().all(|s| *s == 0.0));
}

//! Benchmarks for complete voice chains.
//!
//! Two oscillators, equal-power mix, amplitude envelope, filter cascade,
//! with and without LFO modulation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::{Lfo, LfoBlock, LfoDepths, OscillatorWaveform};
use saavy_synth::synth::voice::Voice;
use saavy_synth::SynthParams;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn saw_pad() -> SynthParams {
    let mut params = SynthParams::default();
    params.osc1.waveform = OscillatorWaveform::Sawtooth;
    params.osc2.waveform = OscillatorWaveform::Square;
    params.osc2.detune = 0.1;
    params.filter.frequency = 1_800.0;
    params.filter.q = 6.0;
    params.filter.slope = 24;
    params
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === STATIC VOICE ===
        // No LFO, the filter only moves with its envelope
        let params = saw_pad();
        let mut voice = Voice::new(SAMPLE_RATE, &params);
        voice.start(45, 110.0, &params, 0);
        let mut idle = LfoBlock::new(size);
        Lfo::new(SAMPLE_RATE, OscillatorWaveform::Sine, 1.0, LfoDepths::default())
            .render(&mut idle, size);

        group.bench_with_input(BenchmarkId::new("static", size), &size, |b, _| {
            b.iter(|| {
                voice.render(black_box(&mut buffer), black_box(&idle));
            })
        });

        // === MODULATED VOICE ===
        // Vibrato and filter wobble: per-sample pitch, cutoff retuned every control tick
        let mut params = saw_pad();
        params.lfo.rate = 6.0;
        params.lfo.depths = LfoDepths {
            filter: 1_200.0,
            osc1_pitch: 30.0,
            osc2_pitch: 30.0,
            ..LfoDepths::default()
        };
        let mut voice = Voice::new(SAMPLE_RATE, &params);
        voice.start(45, 110.0, &params, 0);
        let mut lfo = Lfo::new(
            SAMPLE_RATE,
            params.lfo.waveform,
            params.lfo.rate,
            params.lfo.depths,
        );
        let mut block = LfoBlock::new(size);

        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                lfo.render(&mut block, size);
                voice.render(black_box(&mut buffer), black_box(&block));
            })
        });
    }

    group.finish();
}

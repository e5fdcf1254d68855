//! Benchmarks for the LFO and its tap fan-out.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::{Lfo, LfoBlock, LfoDepths, OscillatorWaveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_lfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/lfo");

    for &size in BLOCK_SIZES {
        let mut block = LfoBlock::new(size);

        // One tap in use
        let depths = LfoDepths {
            filter: 800.0,
            ..LfoDepths::default()
        };
        let mut lfo = Lfo::new(SAMPLE_RATE, OscillatorWaveform::Sine, 5.0, depths);
        group.bench_with_input(BenchmarkId::new("one_tap", size), &size, |b, _| {
            b.iter(|| {
                lfo.render(black_box(&mut block), size);
            })
        });

        // Every tap in use
        let depths = LfoDepths {
            filter: 800.0,
            osc1_pitch: 50.0,
            osc2_pitch: 50.0,
            osc1_level: 0.3,
            osc2_level: 0.3,
        };
        let mut lfo = Lfo::new(SAMPLE_RATE, OscillatorWaveform::Triangle, 5.0, depths);
        group.bench_with_input(BenchmarkId::new("all_taps", size), &size, |b, _| {
            b.iter(|| {
                lfo.render(black_box(&mut block), size);
            })
        });
    }

    group.finish();
}

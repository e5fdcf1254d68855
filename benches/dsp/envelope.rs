//! Benchmarks for the segment envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::Envelope;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Long attack: every sample interpolates
        let mut env = Envelope::adsr(SAMPLE_RATE, 10.0, 0.1, 0.7, 0.2);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Sustain plateau: the common steady-state case
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.0, 0.0, 0.7, 0.2);
        env.note_on();
        env.render(&mut [0.0; 64]);
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

//! Benchmarks for the biquad cascade at every slope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::{FilterCascade, FilterType};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        for slope in [12, 24, 36, 48] {
            let mut filter =
                FilterCascade::new(SAMPLE_RATE, FilterType::LowPass, 1000.0, 6.0, slope);
            group.bench_with_input(
                BenchmarkId::new(format!("lowpass_{}db", slope), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        filter.render(black_box(&mut buffer));
                    })
                },
            );
        }

        // Coefficient recompute cost, as paid at every control tick under modulation
        let mut filter = FilterCascade::new(SAMPLE_RATE, FilterType::HighPass, 1000.0, 6.0, 24);
        let mut cutoff = 1000.0f32;
        group.bench_with_input(BenchmarkId::new("retune", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff > 4000.0 { 1000.0 } else { cutoff * 1.01 };
                filter.set_params(black_box(cutoff), 6.0);
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

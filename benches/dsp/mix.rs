//! Benchmarks for voice summing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::mix::{equal_power_gains, peak, sum_in_place};

use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for &size in BLOCK_SIZES {
        let a: Vec<f32> = (0..size).map(|i| (i as f32 * 0.01).sin()).collect();
        let b_buf: Vec<f32> = (0..size).map(|i| (i as f32 * 0.02).cos()).collect();
        let mut out = vec![0.0f32; size];

        // Two oscillators crossfaded then accumulated into a bus
        group.bench_with_input(BenchmarkId::new("crossfade_sum", size), &size, |b, _| {
            b.iter(|| {
                let (g1, g2) = equal_power_gains(black_box(0.3));
                for ((o, &x), &y) in out.iter_mut().zip(&a).zip(&b_buf) {
                    *o = x * g1 + y * g2;
                }
                sum_in_place(black_box(&mut out), black_box(&a));
                black_box(peak(&out));
            })
        });
    }

    group.finish();
}

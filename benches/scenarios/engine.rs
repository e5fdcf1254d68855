//! Benchmarks for the whole engine: message drain, LFO, pool, master gain.

use std::collections::VecDeque;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::OscillatorWaveform;
use saavy_synth::{EngineConfig, Synth, SynthMessage, SynthParams};

use crate::BLOCK_SIZES;

fn engine_with_notes(notes: &[u8]) -> Synth<VecDeque<SynthMessage>> {
    let mut params = SynthParams::default();
    params.osc1.waveform = OscillatorWaveform::Sawtooth;
    params.osc2.waveform = OscillatorWaveform::Sawtooth;
    params.osc2.detune = 0.07;
    params.filter.frequency = 2_000.0;
    params.filter.slope = 24;
    params.lfo.rate = 4.0;
    params.lfo.depths.filter = 600.0;

    let queue: VecDeque<SynthMessage> =
        notes.iter().map(|&note| SynthMessage::NoteOn { note }).collect();
    match Synth::with_receiver(EngineConfig::default(), params, queue, ()) {
        Ok(synth) => synth,
        Err(err) => panic!("bench engine config rejected: {}", err),
    }
}

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    // Single note, triad, and every voice of the default pool busy
    let chords: [(&str, &[u8]); 3] = [
        ("one_note", &[60]),
        ("triad", &[60, 64, 67]),
        ("sixteen_voices", &[48, 50, 52, 53, 55, 57, 59, 60, 62, 64, 65, 67, 69, 71, 72, 74]),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, notes) in chords {
            let mut synth = engine_with_notes(notes);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    synth.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}

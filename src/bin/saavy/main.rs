//! saavy - terminal synthesizer
//!
//! Run with: cargo run --bin saavy
//! Log with: RUST_LOG=saavy_synth=debug cargo run --bin saavy 2> saavy.log

mod app;
mod ui;

use app::{log_writer, Saavy};
use saavy_synth::dsp::OscillatorWaveform;
use saavy_synth::{EngineConfig, SynthParams};
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_writer)
        .init();

    // A slightly detuned saw pair through a gentle lowpass
    let mut params = SynthParams::default();
    params.osc1.waveform = OscillatorWaveform::Sawtooth;
    params.osc2.waveform = OscillatorWaveform::Sawtooth;
    params.osc2.detune = 0.07;
    params.filter.frequency = 2_400.0;
    params.filter.q = 3.0;
    params.amp_env.release = 0.25;

    Saavy::new(EngineConfig::default())
        .params(params)
        .run()
}

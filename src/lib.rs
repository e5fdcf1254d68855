pub mod config;
pub mod dsp;
pub mod error;
pub mod io; // Note names, MIDI bytes, computer keyboard
pub mod synth; // Voice management, polyphony, engine

pub use config::EngineConfig;
pub use error::SynthError;
pub use synth::engine::{Synth, SynthStatus};
#[cfg(feature = "rtrb")]
pub use synth::engine::SynthHandle;
pub use synth::message::SynthMessage;
pub use synth::params::{ParamChange, SynthParams};
pub use synth::pool::ActiveNotes;

pub const MAX_BLOCK_SIZE: usize = 2048;

// Purpose: Voice management, polyphony, parameter routing
// This layer sits above the dsp primitives and owns everything the audio thread touches

pub mod engine;
pub mod message;
pub mod params;
pub mod pool;
pub mod voice;

pub use message::{MessageReceiver, StatusSink, SynthMessage};
pub use pool::{ActiveNotes, VoicePool};

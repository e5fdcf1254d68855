//! Real-world scenario benchmarks.
//!
//! Single voices as the pool renders them, and the whole engine with
//! chords held, the way a player actually loads it.

mod engine;
mod voices;

pub use engine::bench_engine;
pub use voices::bench_voices;

use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer};

use crate::synth::engine::SynthStatus;
use crate::synth::params::ParamChange;

/// Control → audio message. `Copy` so it crosses the ring without allocating.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { note: u8 },
    NoteOff { note: u8 },
    SetParam(ParamChange),
    AllNotesOff,
}

/// Source of control messages, drained by the engine at block boundaries.
pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Offline rendering and tests: messages queued up front.
impl MessageReceiver for VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}

/// Destination for per-block status snapshots. Must never block.
pub trait StatusSink {
    fn publish(&mut self, status: SynthStatus);
}

impl StatusSink for () {
    fn publish(&mut self, _status: SynthStatus) {}
}

#[cfg(feature = "rtrb")]
impl StatusSink for Producer<SynthStatus> {
    fn publish(&mut self, status: SynthStatus) {
        // Full ring: the control side is behind, drop this snapshot
        let _ = self.push(status);
    }
}

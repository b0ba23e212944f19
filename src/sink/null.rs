//! Null (silent) sink
//!
//! Stands in for the audio output when no device could be opened. Frames are
//! dropped immediately so the dispatcher keeps mirroring state.

use super::AudioSink;
use crate::signal::Frame;

#[derive(Debug, Default)]
pub struct NullSink {
    dropped: u64,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames discarded so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl AudioSink for NullSink {
    fn name(&self) -> &'static str {
        "null"
    }

    fn is_connected(&self) -> bool {
        false
    }

    fn write_and_drain(&mut self, _frame: &Frame) {
        self.dropped += 1;
    }
}

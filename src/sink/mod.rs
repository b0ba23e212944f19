//! Audio sinks carrying encoded frames to the light strip.
//!
//! A sink accepts a finished `Frame` and blocks until it has been played out.
//! That blocking call is the only flow control on the line: the dispatcher
//! does not encode the next command before the previous one has drained.
//!
//! When no output device can be opened the process keeps running on a
//! `NullSink`; commands are still mirrored but nothing is transmitted.

mod null;
mod raw;
mod rodio_sink;


use std::io;
use std::path::PathBuf;

use crate::signal::{Frame, TimingConfig};

pub use null::NullSink;
pub use raw::RawFileSink;
pub use rodio_sink::RodioSink;

/// Errors raised while opening a sink
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Audio output unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Could not open playback stream: {0}")]
    Playback(String),

    #[error("Raw output I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Blocking PCM output.
///
/// Implementations are created on the thread that uses them, so there is no
/// `Send` bound; system audio handles are usually pinned to their thread.
pub trait AudioSink {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Whether frames written to this sink reach a physical line
    fn is_connected(&self) -> bool {
        true
    }

    /// Submit `frame` for playback and block until it has been flushed.
    ///
    /// Failures are not reported; the line is best effort.
    fn write_and_drain(&mut self, frame: &Frame);
}

/// Which output the dispatcher should open
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SinkKind {
    /// Default system audio output
    #[default]
    Audio,
    /// Little-endian PCM written to a file
    Raw(PathBuf),
    /// Discard everything
    Null,
}

/// Open the default audio output, falling back to a `NullSink`.
pub fn open_default(timing: &TimingConfig) -> Box<dyn AudioSink> {
    match RodioSink::open(timing) {
        Ok(sink) => {
            log::info!(
                "Audio sink ready: {} Hz mono, {} baud",
                timing.sample_rate(),
                timing.baud_rate()
            );
            Box::new(sink)
        }
        Err(err) => {
            log::warn!("{}; commands will not be transmitted", err);
            Box::new(NullSink::new())
        }
    }
}

/// Open the sink selected by `kind`. Never fails; see `open_default`.
pub fn open(kind: &SinkKind, timing: &TimingConfig) -> Box<dyn AudioSink> {
    match kind {
        SinkKind::Audio => open_default(timing),
        SinkKind::Raw(path) => match RawFileSink::create(path) {
            Ok(sink) => {
                log::info!("Writing raw PCM to {}", path.display());
                Box::new(sink)
            }
            Err(err) => {
                log::warn!("{}; commands will not be transmitted", err);
                Box::new(NullSink::new())
            }
        },
        SinkKind::Null => {
            log::info!("Audio output disabled");
            Box::new(NullSink::new())
        }
    }
}

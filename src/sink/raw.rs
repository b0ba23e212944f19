//! Raw PCM file sink
//!
//! Writes each frame as signed 16-bit little-endian mono samples, the same
//! bytes the audio device would receive. Useful for inspecting the line with
//! an audio editor or feeding it to another player.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{AudioSink, SinkError};
use crate::signal::Frame;

pub struct RawFileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    bytes_written: u64,
}

impl RawFileSink {
    /// Create (or truncate) the output file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            bytes_written: 0,
        })
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl AudioSink for RawFileSink {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn write_and_drain(&mut self, frame: &Frame) {
        let bytes = frame.to_le_bytes();
        let result = self
            .writer
            .write_all(&bytes)
            .and_then(|_| self.writer.flush());

        match result {
            Ok(()) => self.bytes_written += bytes.len() as u64,
            Err(err) => log::warn!("Raw write to {} failed: {}", self.path.display(), err),
        }
    }
}

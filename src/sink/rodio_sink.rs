//! System audio output through rodio.

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

use super::{AudioSink, SinkError};
use crate::signal::{Frame, TimingConfig};

/// Mono output on the default device.
///
/// `OutputStream` is not `Send`, so this sink has to be opened on the thread
/// that writes to it.
pub struct RodioSink {
    // Dropping the stream closes the device
    _stream: OutputStream,
    _handle: OutputStreamHandle,
    sink: Sink,
    sample_rate: u32,
}

impl RodioSink {
    /// Open the default output device.
    ///
    /// # Errors
    /// `SinkError::DeviceUnavailable` if no output stream can be created,
    /// `SinkError::Playback` if the device refuses a playback sink.
    pub fn open(timing: &TimingConfig) -> Result<Self, SinkError> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| SinkError::DeviceUnavailable(e.to_string()))?;
        let sink = Sink::try_new(&handle).map_err(|e| SinkError::Playback(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            _handle: handle,
            sink,
            sample_rate: timing.sample_rate(),
        })
    }
}

impl AudioSink for RodioSink {
    fn name(&self) -> &'static str {
        "rodio"
    }

    fn write_and_drain(&mut self, frame: &Frame) {
        if frame.is_empty() {
            return;
        }
        if frame.sample_rate() != self.sample_rate {
            log::warn!(
                "Frame rate {} Hz differs from stream rate {} Hz",
                frame.sample_rate(),
                self.sample_rate
            );
        }

        let source = SamplesBuffer::new(1, frame.sample_rate(), frame.samples().to_vec());
        self.sink.append(source);
        self.sink.sleep_until_end();
    }
}

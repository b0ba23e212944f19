//! Tone/silence bursts and asynchronous byte framing.
//!
//! A logical 0 (space) is one bit-time of carrier, a logical 1 (mark) is one
//! bit-time of silence. Each byte is sent as a start bit, eight data bits
//! least-significant first, then two stop bits.

use std::time::Duration;

use super::timing::TimingConfig;

/// Peak magnitude of the carrier before clamping into the i16 range.
pub const TONE_AMPLITUDE: f64 = 32768.0;

/// Number of data bits in a frame
pub const DATA_BITS: usize = 8;

/// Number of stop bits in a frame
pub const STOP_BITS: usize = 2;

/// Bits per framed byte: start + data + stop
pub const FRAME_BITS: usize = 1 + DATA_BITS + STOP_BITS;

/// Generate one bit-time of carrier (logical 0).
pub fn generate_tone_burst(timing: &TimingConfig) -> Vec<i16> {
    let step = timing.carrier_step();
    let phase = timing.phase_offset();

    (0..timing.samples_per_bit())
        .map(|i| {
            let angle = i as f64 * step + phase;
            let sample = (angle.sin() * TONE_AMPLITUDE).trunc();
            sample.clamp(i16::MIN as f64, i16::MAX as f64) as i16
        })
        .collect()
}

/// Generate one bit-time of silence (logical 1, line idle).
pub fn generate_silence_burst(timing: &TimingConfig) -> Vec<i16> {
    vec![0; timing.samples_per_bit()]
}

/// Mono PCM samples produced for one outgoing control string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl Frame {
    fn with_capacity(capacity: usize, sample_rate: u32) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback time of the frame
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    /// Serialize as 16-bit little-endian PCM
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn push_burst(&mut self, burst: &[i16]) {
        self.samples.extend_from_slice(burst);
    }

    fn append(&mut self, other: Frame) {
        self.samples.extend(other.samples);
    }
}

/// Serial-over-audio encoder.
///
/// Both bursts are computed once on construction and reused for every bit.
#[derive(Debug, Clone)]
pub struct Waveform {
    timing: TimingConfig,
    tone: Vec<i16>,
    silence: Vec<i16>,
}

impl Waveform {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            tone: generate_tone_burst(&timing),
            silence: generate_silence_burst(&timing),
            timing,
        }
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// The cached carrier burst
    pub fn tone_burst(&self) -> &[i16] {
        &self.tone
    }

    /// The cached silence burst
    pub fn silence_burst(&self) -> &[i16] {
        &self.silence
    }

    /// Number of samples one framed byte occupies
    pub fn frame_len(&self) -> usize {
        FRAME_BITS * self.timing.samples_per_bit()
    }

    fn burst_for(&self, bit: bool) -> &[i16] {
        if bit {
            &self.silence
        } else {
            &self.tone
        }
    }

    /// Frame a single byte: start, 8 data bits LSB first, 2 stop bits.
    pub fn encode_byte(&self, byte: u8) -> Frame {
        let mut frame = Frame::with_capacity(self.frame_len(), self.timing.sample_rate());

        frame.push_burst(&self.tone);
        for i in 0..DATA_BITS {
            frame.push_burst(self.burst_for((byte >> i) & 1 == 1));
        }
        for _ in 0..STOP_BITS {
            frame.push_burst(&self.silence);
        }

        frame
    }

    /// Frame every byte in order and concatenate the result.
    pub fn encode_bytes(&self, bytes: &[u8]) -> Frame {
        let mut frame =
            Frame::with_capacity(bytes.len() * self.frame_len(), self.timing.sample_rate());
        for &byte in bytes {
            frame.append(self.encode_byte(byte));
        }
        frame
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Self::new(TimingConfig::default())
    }
}

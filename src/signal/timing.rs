//! Line timing derived once at startup.
//!
//! Every byte sent over the audio line is framed with the same bit duration,
//! so the numbers here are computed a single time and shared read-only by the
//! waveform generator and the sinks.

use std::f64::consts::TAU;
use std::time::Duration;

/// Default output sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default ratio between sample rate and baud rate.
pub const DEFAULT_BAUD_DIVISOR: u32 = 16;

/// Default number of carrier periods packed into one tone bit.
pub const DEFAULT_WAVES_PER_BIT: u32 = 4;

/// Default carrier phase offset in degrees.
pub const DEFAULT_PHASE_OFFSET_DEGREES: f64 = 15.0;

/// Errors raised while deriving the line timing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimingError {
    #[error("Sample rate must be positive")]
    ZeroSampleRate,

    #[error("Baud divisor must be positive")]
    ZeroBaudDivisor,

    #[error("Baud divisor {divisor} is larger than the sample rate {sample_rate}")]
    BaudRateTooLow { sample_rate: u32, divisor: u32 },

    #[error("Waves per bit must be between 1 and {samples_per_bit}, got {waves_per_bit}")]
    InvalidWavesPerBit {
        waves_per_bit: u32,
        samples_per_bit: u32,
    },

    #[error("Phase offset must be finite")]
    InvalidPhaseOffset,
}

/// Immutable timing parameters of the serial-over-audio line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    sample_rate: u32,
    baud_rate: u32,
    samples_per_bit: u32,
    waves_per_bit: u32,
    phase_offset: f64,
}

impl TimingConfig {
    /// Derive the line timing from its tunable parameters.
    ///
    /// # Arguments
    /// * `sample_rate` - Output sample rate in Hz
    /// * `baud_divisor` - Baud rate is `sample_rate / baud_divisor` (integer division)
    /// * `waves_per_bit` - Carrier periods per tone bit
    /// * `phase_offset_degrees` - Carrier phase shift
    ///
    /// # Errors
    /// Returns a `TimingError` when the parameters cannot produce at least one
    /// sample per bit and one carrier period per bit.
    pub fn derive(
        sample_rate: u32,
        baud_divisor: u32,
        waves_per_bit: u32,
        phase_offset_degrees: f64,
    ) -> Result<Self, TimingError> {
        if sample_rate == 0 {
            return Err(TimingError::ZeroSampleRate);
        }
        if baud_divisor == 0 {
            return Err(TimingError::ZeroBaudDivisor);
        }
        if !phase_offset_degrees.is_finite() {
            return Err(TimingError::InvalidPhaseOffset);
        }

        let baud_rate = sample_rate / baud_divisor;
        if baud_rate == 0 {
            return Err(TimingError::BaudRateTooLow {
                sample_rate,
                divisor: baud_divisor,
            });
        }

        // Rounded toward zero, so 44100 / 2756 gives 16 and not 16.0016.
        let samples_per_bit = sample_rate / baud_rate;
        if waves_per_bit == 0 || waves_per_bit > samples_per_bit {
            return Err(TimingError::InvalidWavesPerBit {
                waves_per_bit,
                samples_per_bit,
            });
        }

        Ok(Self {
            sample_rate,
            baud_rate,
            samples_per_bit,
            waves_per_bit,
            phase_offset: phase_offset_degrees.to_radians(),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn samples_per_bit(&self) -> usize {
        self.samples_per_bit as usize
    }

    pub fn waves_per_bit(&self) -> u32 {
        self.waves_per_bit
    }

    /// Phase offset in radians
    pub fn phase_offset(&self) -> f64 {
        self.phase_offset
    }

    /// Carrier frequency in Hz: `sample_rate / (samples_per_bit / waves_per_bit)`
    pub fn carrier_frequency(&self) -> f64 {
        let samples_per_wave = self.samples_per_bit as f64 / self.waves_per_bit as f64;
        self.sample_rate as f64 / samples_per_wave
    }

    /// Angular step of the carrier between two consecutive samples
    pub fn carrier_step(&self) -> f64 {
        TAU * self.carrier_frequency() / self.sample_rate as f64
    }

    /// Playback time of `samples` mono samples at this sample rate
    pub fn duration_of(&self, samples: usize) -> Duration {
        Duration::from_secs_f64(samples as f64 / self.sample_rate as f64)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        let sample_rate = DEFAULT_SAMPLE_RATE;
        let baud_rate = sample_rate / DEFAULT_BAUD_DIVISOR;
        Self {
            sample_rate,
            baud_rate,
            samples_per_bit: sample_rate / baud_rate,
            waves_per_bit: DEFAULT_WAVES_PER_BIT,
            phase_offset: DEFAULT_PHASE_OFFSET_DEGREES.to_radians(),
        }
    }
}

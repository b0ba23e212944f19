//! Serial-over-audio waveform library
//!
//! Turns bytes into PCM sample bursts that the light strip's receiver decodes
//! as an asynchronous serial line.

pub mod timing;
pub mod waveform;

#[cfg(test)]
mod tests;

pub use timing::{TimingConfig, TimingError};
pub use waveform::{
    generate_silence_burst, generate_tone_burst, Frame, Waveform, FRAME_BITS,
};

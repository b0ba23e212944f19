//! Unit tests for the waveform library
//!
//! Timing values are checked against the defaults the receiver firmware was
//! tuned for: 44.1 kHz output, 16 samples per bit, 4 carrier periods per bit.

use super::timing::*;
use super::waveform::*;
use proptest::prelude::*;
use rstest::rstest;

fn segment(frame: &Frame, bit: usize, spb: usize) -> &[i16] {
    &frame.samples()[bit * spb..(bit + 1) * spb]
}

// ============================================================================
// Timing
// ============================================================================

#[test]
fn test_default_timing_values() {
    let timing = TimingConfig::default();
    assert_eq!(timing.sample_rate(), 44_100);
    assert_eq!(timing.baud_rate(), 2_756);
    assert_eq!(timing.samples_per_bit(), 16);
    assert_eq!(timing.waves_per_bit(), 4);
    assert_eq!(timing.carrier_frequency(), 11_025.0);
    assert!((timing.phase_offset() - 15f64.to_radians()).abs() < 1e-12);
}

#[test]
fn test_derive_matches_default() {
    let derived = TimingConfig::derive(
        DEFAULT_SAMPLE_RATE,
        DEFAULT_BAUD_DIVISOR,
        DEFAULT_WAVES_PER_BIT,
        DEFAULT_PHASE_OFFSET_DEGREES,
    )
    .unwrap();
    assert_eq!(derived, TimingConfig::default());
}

#[test]
fn test_derive_rounds_samples_per_bit_down() {
    // 48000 / 7 = 6857 baud, 48000 / 6857 = 7.0001 -> 7
    let timing = TimingConfig::derive(48_000, 7, 1, 0.0).unwrap();
    assert_eq!(timing.baud_rate(), 6_857);
    assert_eq!(timing.samples_per_bit(), 7);
}

#[rstest]
#[case(0, 16, 4, 15.0, TimingError::ZeroSampleRate)]
#[case(44_100, 0, 4, 15.0, TimingError::ZeroBaudDivisor)]
#[case(8, 16, 1, 0.0, TimingError::BaudRateTooLow { sample_rate: 8, divisor: 16 })]
#[case(44_100, 16, 0, 15.0, TimingError::InvalidWavesPerBit { waves_per_bit: 0, samples_per_bit: 16 })]
#[case(44_100, 16, 17, 15.0, TimingError::InvalidWavesPerBit { waves_per_bit: 17, samples_per_bit: 16 })]
#[case(44_100, 16, 4, f64::NAN, TimingError::InvalidPhaseOffset)]
fn test_derive_rejects_invalid(
    #[case] rate: u32,
    #[case] divisor: u32,
    #[case] waves: u32,
    #[case] phase: f64,
    #[case] expected: TimingError,
) {
    assert_eq!(TimingConfig::derive(rate, divisor, waves, phase), Err(expected));
}

#[test]
fn test_duration_of_one_second() {
    let timing = TimingConfig::default();
    assert_eq!(timing.duration_of(44_100).as_millis(), 1_000);
}

// ============================================================================
// Bursts
// ============================================================================

#[test]
fn test_tone_burst_samples() {
    let tone = generate_tone_burst(&TimingConfig::default());
    assert_eq!(tone.len(), 16);
    // Four carrier periods of four samples each, shifted by 15 degrees
    let period = [8480, 31651, -8480, -31651];
    for chunk in tone.chunks(4) {
        assert_eq!(chunk, period);
    }
}

#[test]
fn test_tone_burst_stays_in_range_without_offset() {
    // With no phase offset the carrier can hit sin = 1.0, which must clamp
    let timing = TimingConfig::derive(44_100, 16, 4, 90.0).unwrap();
    let tone = generate_tone_burst(&timing);
    assert_eq!(tone[0], i16::MAX);
    assert!(tone[2] <= -32_767);
}

#[test]
fn test_silence_burst_is_zero() {
    let silence = generate_silence_burst(&TimingConfig::default());
    assert_eq!(silence.len(), 16);
    assert!(silence.iter().all(|&s| s == 0));
}

#[test]
fn test_waveform_caches_bursts() {
    let timing = TimingConfig::default();
    let waveform = Waveform::new(timing);
    assert_eq!(waveform.tone_burst(), generate_tone_burst(&timing).as_slice());
    assert_eq!(waveform.silence_burst(), generate_silence_burst(&timing).as_slice());
}

// ============================================================================
// Framing
// ============================================================================

#[test]
fn test_encode_byte_layout() {
    let waveform = Waveform::default();
    let spb = waveform.timing().samples_per_bit();
    // 0b0000_0101: bits 0 and 2 set
    let frame = waveform.encode_byte(0x05);

    assert_eq!(segment(&frame, 0, spb), waveform.tone_burst(), "start bit");
    let expected_data = [true, false, true, false, false, false, false, false];
    for (i, &set) in expected_data.iter().enumerate() {
        let expected = if set {
            waveform.silence_burst()
        } else {
            waveform.tone_burst()
        };
        assert_eq!(segment(&frame, 1 + i, spb), expected, "data bit {}", i);
    }
    assert_eq!(segment(&frame, 9, spb), waveform.silence_burst(), "stop bit 1");
    assert_eq!(segment(&frame, 10, spb), waveform.silence_burst(), "stop bit 2");
}

#[test]
fn test_encode_byte_extremes_differ_only_in_data_bits() {
    let waveform = Waveform::default();
    let spb = waveform.timing().samples_per_bit();
    let zeros = waveform.encode_byte(0x00);
    let ones = waveform.encode_byte(0xFF);

    for bit in 0..FRAME_BITS {
        let same = segment(&zeros, bit, spb) == segment(&ones, bit, spb);
        let is_data = (1..=8).contains(&bit);
        assert_eq!(same, !is_data, "segment {}", bit);
    }
}

#[test]
fn test_encode_bytes_concatenates() {
    let waveform = Waveform::default();
    let frame = waveform.encode_bytes(b"b10");

    let mut expected = Vec::new();
    for &byte in b"b10" {
        expected.extend_from_slice(waveform.encode_byte(byte).samples());
    }
    assert_eq!(frame.samples(), expected.as_slice());
    assert_eq!(frame.len(), 3 * waveform.frame_len());
}

#[test]
fn test_encode_bytes_empty() {
    let frame = Waveform::default().encode_bytes(&[]);
    assert!(frame.is_empty());
    assert_eq!(frame.duration().as_nanos(), 0);
}

#[test]
fn test_frame_le_bytes() {
    let waveform = Waveform::default();
    let frame = waveform.encode_byte(0x00);
    let bytes = frame.to_le_bytes();

    assert_eq!(bytes.len(), frame.len() * 2);
    // 8480 = 0x2120
    assert_eq!(&bytes[..2], &[0x20, 0x21]);
}

#[test]
fn test_frame_duration() {
    let waveform = Waveform::default();
    // 176 samples at 44.1 kHz is just under 4 ms
    let frame = waveform.encode_byte(b'(');
    assert_eq!(frame.len(), 176);
    assert_eq!(frame.duration().as_micros(), 3_990);
}

proptest! {
    #[test]
    fn prop_encode_byte_length(byte in any::<u8>()) {
        let waveform = Waveform::default();
        prop_assert_eq!(waveform.encode_byte(byte).len(), 11 * waveform.timing().samples_per_bit());
    }
}

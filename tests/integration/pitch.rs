//! Pitch, rate, chord-pitch and volume tests.

use sonic::prelude::*;

use crate::helpers::tolerances::{DURATION_TOLERANCE, GAIN_LSB, PITCH_TOLERANCE};
use crate::helpers::*;

const FRAMES: usize = 44100;

fn run(params: StreamParams) -> Vec<i16> {
    let mut stream = StreamBuilder::new()
        .sample_rate(TEST_SAMPLE_RATE)
        .params(params)
        .build()
        .unwrap();
    let input = generate_sine(TEST_TONE_HZ, TEST_SAMPLE_RATE, FRAMES, 1, 10000.0);
    process_chunked(&mut stream, &input, TEST_BLOCK_FRAMES)
}

#[test]
fn test_pitch_up_keeps_duration_raises_frequency() {
    let output = run(StreamParams::new().pitch(1.5));
    assert_close(output.len() as f32, FRAMES as f32, DURATION_TOLERANCE, "frames");
    let frequency = estimate_frequency(&output, TEST_SAMPLE_RATE, 2048);
    assert_close(
        frequency,
        TEST_TONE_HZ as f32 * 1.5,
        PITCH_TOLERANCE,
        "fundamental",
    );
}

#[test]
fn test_pitch_down_keeps_duration_lowers_frequency() {
    let output = run(StreamParams::new().pitch(0.75));
    assert_close(output.len() as f32, FRAMES as f32, DURATION_TOLERANCE, "frames");
    let frequency = estimate_frequency(&output, TEST_SAMPLE_RATE, 2048);
    assert_close(
        frequency,
        TEST_TONE_HZ as f32 * 0.75,
        PITCH_TOLERANCE,
        "fundamental",
    );
}

#[test]
fn test_rate_scales_duration_and_frequency() {
    for rate in [0.5f32, 2.0] {
        let output = run(StreamParams::new().rate(rate));
        assert_close(
            output.len() as f32,
            FRAMES as f32 / rate,
            DURATION_TOLERANCE,
            "frames",
        );
        let frequency = estimate_frequency(&output, TEST_SAMPLE_RATE, 2048);
        assert_close(
            frequency,
            TEST_TONE_HZ as f32 * rate,
            PITCH_TOLERANCE,
            "fundamental",
        );
    }
}

#[test]
fn test_speed_and_pitch_combine() {
    let output = run(StreamParams::new().speed(1.5).pitch(1.25));
    assert_close(
        output.len() as f32,
        FRAMES as f32 / 1.5,
        DURATION_TOLERANCE,
        "frames",
    );
}

#[test]
fn test_chord_pitch_keeps_duration() {
    for pitch in [0.5f32, 0.8, 1.5] {
        let output = run(StreamParams::new().pitch(pitch).chord_pitch(true));
        assert_close(
            output.len() as f32,
            FRAMES as f32,
            DURATION_TOLERANCE,
            &format!("chord frames at pitch {}", pitch),
        );
    }
}

#[test]
fn test_chord_pitch_applies_rate() {
    let output = run(StreamParams::new().pitch(1.2).rate(2.0).chord_pitch(true));
    assert_close(
        output.len() as f32,
        FRAMES as f32 / 2.0,
        DURATION_TOLERANCE,
        "frames",
    );
}

#[test]
fn test_half_volume_halves_peak() {
    let input = generate_sine(TEST_TONE_HZ, TEST_SAMPLE_RATE, 4410, 1, 16000.0);
    let mut stream = StreamBuilder::new()
        .sample_rate(TEST_SAMPLE_RATE)
        .volume(0.5)
        .build()
        .unwrap();
    let output = process_whole(&mut stream, &input);
    assert_eq!(output.len(), input.len());
    assert!((peak(&output) - peak(&input) / 2).abs() <= GAIN_LSB);
}

#[test]
fn test_loud_volume_saturates() {
    let input = generate_sine(TEST_TONE_HZ, TEST_SAMPLE_RATE, 4410, 1, 16000.0);
    let mut stream = StreamBuilder::new()
        .sample_rate(TEST_SAMPLE_RATE)
        .volume(8.0)
        .build()
        .unwrap();
    let output = process_whole(&mut stream, &input);
    assert_eq!(output.iter().copied().max(), Some(i16::MAX));
    assert_eq!(output.iter().copied().min(), Some(i16::MIN));
}

#[test]
fn test_zero_volume_is_silent() {
    let input = generate_voiced(200.0, TEST_SAMPLE_RATE, 4000);
    let mut stream = StreamBuilder::new()
        .sample_rate(TEST_SAMPLE_RATE)
        .speed(1.3)
        .volume(0.0)
        .build()
        .unwrap();
    let output = process_whole(&mut stream, &input);
    assert!(!output.is_empty());
    assert_eq!(peak(&output), 0);
    assert_eq!(rms(&output), 0.0);
}

//! Speed change tests: duration scales, pitch stays.

use sonic::prelude::*;

use crate::helpers::tolerances::{DURATION_TOLERANCE, PITCH_TOLERANCE};
use crate::helpers::*;

const FRAMES: usize = 44100;

fn speed_output(speed: f32, channels: usize) -> Vec<i16> {
    let mut stream = test_stream(channels);
    stream.set_speed(speed);
    let input = generate_sine(TEST_TONE_HZ, TEST_SAMPLE_RATE, FRAMES, channels, 10000.0);
    process_chunked(&mut stream, &input, TEST_BLOCK_FRAMES)
}

#[test]
fn test_double_speed_halves_frames() {
    let output = speed_output(2.0, 1);
    assert_close(
        output.len() as f32,
        FRAMES as f32 / 2.0,
        DURATION_TOLERANCE,
        "frames at 2x",
    );
}

#[test]
fn test_half_speed_doubles_frames() {
    let output = speed_output(0.5, 1);
    assert_close(
        output.len() as f32,
        FRAMES as f32 * 2.0,
        DURATION_TOLERANCE,
        "frames at 0.5x",
    );
}

#[test]
fn test_speed_scales_duration() {
    for speed in [0.6f32, 0.8, 1.25, 1.5, 3.0, 4.0] {
        let output = speed_output(speed, 2);
        assert_close(
            (output.len() / 2) as f32,
            FRAMES as f32 / speed,
            DURATION_TOLERANCE,
            &format!("frames at {}x", speed),
        );
    }
}

#[test]
fn test_uneven_periods_keep_requested_duration() {
    // 133 Hz does not give a whole-frame period at 22050 Hz
    let input = generate_voiced(133.0, TEST_SAMPLE_RATE, FRAMES);
    for (speed, pitch) in [(7.0f32, 1.0f32), (3.0, 0.3), (0.3, 2.5), (1.1, 1.0)] {
        let mut stream = test_stream(1);
        stream.set_speed(speed);
        stream.set_pitch(pitch);
        let output = process_chunked(&mut stream, &input, TEST_BLOCK_FRAMES);
        assert_close(
            output.len() as f32,
            FRAMES as f32 / speed,
            DURATION_TOLERANCE,
            &format!("frames at speed {} pitch {}", speed, pitch),
        );
    }
}

#[test]
fn test_available_never_exceeds_input_over_speed() {
    for speed in [1.0f32, 1.2, 1.5, 2.0, 3.5] {
        let mut stream = test_stream(1);
        stream.set_speed(speed);
        let input = generate_voiced(120.0, TEST_SAMPLE_RATE, FRAMES);
        let mut written = 0;
        for chunk in input.chunks(1000) {
            stream.write(chunk).unwrap();
            written += chunk.len();
            let bound = written as f32 / speed;
            assert!(
                stream.available_frames() as f32 <= bound + 1.0,
                "speed {}: {} frames available after {} written",
                speed,
                stream.available_frames(),
                written
            );
        }
    }
}

#[test]
fn test_speed_keeps_pitch() {
    for speed in [0.5f32, 1.5, 2.0] {
        let output = speed_output(speed, 1);
        let frequency = estimate_frequency(&output, TEST_SAMPLE_RATE, 2048);
        assert_close(
            frequency,
            TEST_TONE_HZ as f32,
            PITCH_TOLERANCE,
            &format!("fundamental at {}x", speed),
        );
    }
}

#[test]
fn test_quality_mode_same_duration() {
    let mut fast = test_stream(1);
    let mut exact = test_stream(1);
    fast.set_speed(1.8);
    exact.set_speed(1.8);
    exact.set_quality(true);

    let input = generate_voiced(180.0, TEST_SAMPLE_RATE, FRAMES);
    let a = process_whole(&mut fast, &input);
    let b = process_whole(&mut exact, &input);
    assert_close(a.len() as f32, b.len() as f32, DURATION_TOLERANCE, "quality");
}

#[test]
fn test_extreme_speeds_complete() {
    for speed in [StreamParams::MIN_FACTOR, StreamParams::MAX_FACTOR] {
        let mut stream = test_stream(1);
        stream.set_speed(speed);
        let input = generate_voiced(150.0, TEST_SAMPLE_RATE, 8000);
        let output = process_whole(&mut stream, &input);
        let expected = 8000.0 / speed;
        // Whole periods at the extremes; only the order of magnitude is stable
        assert!(
            (output.len() as f32) > expected * 0.5 && (output.len() as f32) < expected * 1.5,
            "speed {}: {} frames",
            speed,
            output.len()
        );
    }
}

#[test]
fn test_noise_input_is_stable() {
    let mut stream = test_stream(2);
    stream.set_speed(1.6);
    let input = generate_noise(2 * 20000, 7, 12000);
    let output = process_chunked(&mut stream, &input, 333);
    assert_close(
        (output.len() / 2) as f32,
        20000.0 / 1.6,
        DURATION_TOLERANCE,
        "noise frames",
    );
}

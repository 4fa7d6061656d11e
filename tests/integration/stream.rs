//! Stream lifecycle and queue accounting tests.

use sonic::prelude::*;

use crate::helpers::tolerances::INT16_EPSILON;
use crate::helpers::*;

#[test]
fn test_identity_round_trip_exact() {
    init_tracing();
    let mut stream = test_stream(2);
    let input = generate_sine(TEST_TONE_HZ, TEST_SAMPLE_RATE, 10_000, 2, 12000.0);

    let output = process_chunked(&mut stream, &input, TEST_BLOCK_FRAMES);
    assert_eq!(output.len(), input.len());
    assert_eq!(output, input);
}

#[test]
fn test_identity_has_no_latency() {
    let mut stream = test_stream(1);
    stream.write(&[1, 2, 3, 4]).unwrap();
    assert_eq!(stream.available_frames(), 4);
    assert_eq!(stream.pending_frames(), 0);
}

#[test]
fn test_repeated_create_drop() {
    for channels in 1..=8 {
        let mut stream = test_stream(channels);
        stream.set_speed(1.7);
        let input = generate_sine(200.0, TEST_SAMPLE_RATE, 4000, channels, 8000.0);
        let output = process_whole(&mut stream, &input);
        assert_eq!(output.len() % channels, 0);
    }
}

#[test]
fn test_zero_capacity_read_leaves_queue() {
    let mut stream = test_stream(2);
    stream
        .write(&generate_sine(TEST_TONE_HZ, TEST_SAMPLE_RATE, 100, 2, 5000.0))
        .unwrap();
    let before = stream.available_samples();

    assert_eq!(stream.read(&mut []), 0);
    assert_eq!(stream.read_f32(&mut []), 0);
    assert_eq!(stream.read_u8(&mut [0u8]), 0);
    assert_eq!(stream.available_samples(), before);
}

#[test]
fn test_read_returns_whole_frames() {
    let mut stream = test_stream(3);
    stream.write(&[1, 2, 3, 4, 5, 6]).unwrap();
    let mut out = [0i16; 5];
    assert_eq!(stream.read(&mut out), 1);
    assert_eq!(&out[..3], &[1, 2, 3]);
    assert_eq!(stream.available_samples(), 3);
}

#[test]
fn test_flush_is_idempotent() {
    let mut stream = test_stream(1);
    stream.set_speed(1.4);
    stream
        .write(&generate_sine(TEST_TONE_HZ, TEST_SAMPLE_RATE, 5000, 1, 9000.0))
        .unwrap();
    stream.flush().unwrap();
    let after_first = stream.available_frames();
    stream.flush().unwrap();
    assert_eq!(stream.available_frames(), after_first);
    assert_eq!(stream.pending_frames(), 0);
}

#[test]
fn test_format_change_keeps_old_frames_separate() {
    let mut stream = Stream::new(8000, 1).unwrap();
    stream.set_speed(2.0);
    stream
        .write(&generate_sine(160.0, 8000, 8000, 1, 9000.0))
        .unwrap();

    stream.set_sample_rate(16000).unwrap();
    stream.set_channels(2).unwrap();
    assert_eq!(stream.format(), StreamFormat::stereo(16000).unwrap());
    stream
        .write(&generate_sine(160.0, 16000, 16000, 2, 9000.0))
        .unwrap();
    stream.flush().unwrap();

    // All old-format frames come first, in their own format
    assert_eq!(stream.output_format(), StreamFormat::mono(8000).unwrap());
    let mono = stream.drain();
    assert_eq!(mono.len(), 4000);

    assert_eq!(stream.output_format(), StreamFormat::stereo(16000).unwrap());
    let stereo = stream.drain();
    assert_eq!(stereo.len(), 8000 * 2);
    assert_eq!(stream.available_frames(), 0);
}

#[test]
fn test_float_path_matches_integer_path() {
    let floats: Vec<f32> = generate_sine(TEST_TONE_HZ, TEST_SAMPLE_RATE, 6000, 1, 0.6 * 32767.0)
        .iter()
        .map(|&s| s as f32 / 32767.0)
        .collect();
    let ints: Vec<i16> = floats.iter().map(|&s| (s * 32767.0) as i16).collect();

    let mut a = test_stream(1);
    let mut b = test_stream(1);
    a.set_speed(1.3);
    b.set_speed(1.3);

    a.write_f32(&floats).unwrap();
    a.flush().unwrap();
    let expected = process_whole(&mut b, &ints);

    let mut out = vec![0.0f32; expected.len()];
    assert_eq!(a.read_f32(&mut out), expected.len());
    for (&f, &i) in out.iter().zip(&expected) {
        approx::assert_abs_diff_eq!(f, i as f32 / 32767.0, epsilon = INT16_EPSILON);
    }
}

#[test]
fn test_params_round_trip_through_setter() {
    let mut stream = test_stream(1);
    let params = StreamParams::new()
        .speed(1.1)
        .pitch(0.9)
        .rate(1.2)
        .volume(2.0)
        .chord_pitch(true)
        .quality(true);
    stream.set_params(params);
    assert_eq!(stream.params(), params);
}

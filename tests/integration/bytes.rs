//! Byte-level boundary tests.

use sonic::prelude::*;
use sonic::WriteReport;

use crate::helpers::*;

fn to_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

fn from_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[test]
fn test_bytes_match_sample_path() {
    let input = generate_voiced(170.0, TEST_SAMPLE_RATE, 20000);

    let mut samples = test_stream(1);
    samples.set_speed(1.35);
    let expected = process_whole(&mut samples, &input);

    let mut bytes = StreamBuilder::new()
        .sample_rate(TEST_SAMPLE_RATE)
        .speed(1.35)
        .build_bytes()
        .unwrap();
    for chunk in to_bytes(&input).chunks(1000) {
        bytes.put_bytes(chunk).unwrap();
    }
    bytes.flush().unwrap();

    let mut out = vec![0u8; bytes.available_bytes()];
    let written = bytes.receive_bytes(&mut out).unwrap();
    assert_eq!(written, expected.len() * 2);
    assert_eq!(from_bytes(&out), expected);
}

#[test]
fn test_rejects_partial_frame() {
    let mut stream = StreamBuilder::new().channels(2).build_bytes().unwrap();
    let err = stream.put_bytes(&[0u8; 10]).unwrap_err();
    assert!(matches!(
        err,
        sonic::bridge::Error::MalformedInput {
            len: 10,
            frame_bytes: 4,
            remainder: 2
        }
    ));
    assert_eq!(stream.available_bytes(), 0);

    // Errors convert into the umbrella type
    let err: sonic::Error = err.into();
    assert!(matches!(err, sonic::Error::Bridge(_)));
}

#[test]
fn test_truncate_policy_reports_remainder() {
    let mut stream = StreamBuilder::new()
        .channels(2)
        .trailing_bytes(TrailingBytes::Truncate)
        .build_bytes()
        .unwrap();
    let report = stream.put_bytes(&to_bytes(&[1, 2, 3, 4, 5])).unwrap();
    assert_eq!(
        report,
        WriteReport {
            frames: 2,
            trailing_bytes: 2
        }
    );
    assert_eq!(stream.available_bytes(), 8);
}

#[test]
fn test_available_bytes_sizes_receive() {
    let mut stream = StreamBuilder::new().channels(2).build_bytes().unwrap();
    stream.put_bytes(&to_bytes(&[7; 64])).unwrap();
    assert_eq!(stream.available_bytes(), 128);

    let mut out = vec![0u8; stream.available_bytes()];
    assert_eq!(stream.receive_bytes(&mut out).unwrap(), 128);
    assert_eq!(stream.available_bytes(), 0);
    assert_eq!(stream.receive_bytes(&mut out).unwrap(), 0);
}

#[test]
fn test_zero_length_calls() {
    let mut stream = StreamBuilder::new().build_bytes().unwrap();
    assert_eq!(stream.put_bytes(&[]).unwrap(), WriteReport::default());
    stream.put_bytes(&[1, 0]).unwrap();
    assert_eq!(stream.receive_bytes(&mut []).unwrap(), 0);
    assert_eq!(stream.available_bytes(), 2);
}

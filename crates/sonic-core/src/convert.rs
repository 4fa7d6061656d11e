//! Sample format conversions at the stream edges.

/// Float sample in `[-1, 1]` to 16-bit. Out-of-range input saturates.
#[inline]
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

#[inline]
pub fn i16_to_f32(sample: i16) -> f32 {
    sample as f32 / 32767.0
}

/// Unsigned 8-bit PCM (silence at 128) to 16-bit.
#[inline]
pub fn u8_to_i16(sample: u8) -> i16 {
    (sample as i16 - 128) << 8
}

#[inline]
pub fn i16_to_u8(sample: i16) -> u8 {
    ((sample >> 8) + 128) as u8
}

/// Decode little-endian byte pairs into `out`; returns samples written.
///
/// A trailing odd byte is ignored; callers check frame alignment first.
pub fn decode_le(bytes: &[u8], out: &mut [i16]) -> usize {
    let mut count = 0;
    for (dst, pair) in out.iter_mut().zip(bytes.chunks_exact(2)) {
        *dst = i16::from_le_bytes([pair[0], pair[1]]);
        count += 1;
    }
    count
}

/// Encode samples as little-endian byte pairs into `out`; returns bytes written.
pub fn encode_le(samples: &[i16], out: &mut [u8]) -> usize {
    let mut count = 0;
    for (pair, &sample) in out.chunks_exact_mut(2).zip(samples) {
        pair.copy_from_slice(&sample.to_le_bytes());
        count += 2;
    }
    count
}

//! Output volume.

/// Q12 fixed-point scale applied by [`scale_samples`].
const GAIN_SHIFT: u32 = 12;

/// Multiply every sample by `volume`, saturating at the i16 range.
pub fn scale_samples(samples: &mut [i16], volume: f32) {
    let fixed = (volume * (1 << GAIN_SHIFT) as f32) as i64;
    for sample in samples {
        let value = (*sample as i64 * fixed) >> GAIN_SHIFT;
        *sample = value.clamp(i16::MIN as i64, i16::MAX as i64) as i16;
    }
}

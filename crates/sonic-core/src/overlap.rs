//! Overlap-add crossfades on interleaved frames.

/// Linearly crossfade `frames` frames from `ramp_down` into `ramp_up`.
///
/// All three slices are interleaved with `channels` samples per frame and
/// must hold at least `frames` frames. The first output frame equals
/// `ramp_down`, the fade reaches `ramp_up` one frame past the end.
pub fn overlap_add(
    frames: usize,
    channels: usize,
    out: &mut [i16],
    ramp_down: &[i16],
    ramp_up: &[i16],
) {
    if frames == 0 {
        return;
    }
    let len = frames * channels;
    let width = frames as i64;
    for (i, ((o, &d), &u)) in out[..len]
        .iter_mut()
        .zip(&ramp_down[..len])
        .zip(&ramp_up[..len])
        .enumerate()
    {
        let t = (i / channels) as i64;
        *o = ((d as i64 * (width - t) + u as i64 * t) / width) as i16;
    }
}

/// Crossfade where `ramp_up` starts `separation` frames after `ramp_down`.
///
/// Writes `frames + separation` frames: the head holds the fading-out
/// signal alone, the middle both, the tail the fading-in signal alone.
/// Used by the chord pitch stage to lengthen a period while keeping both
/// copies audible.
pub fn overlap_add_with_separation(
    frames: usize,
    channels: usize,
    separation: usize,
    out: &mut [i16],
    ramp_down: &[i16],
    ramp_up: &[i16],
) {
    if frames == 0 {
        return;
    }
    let width = frames as i64;
    for t in 0..frames + separation {
        let fade_out = (width - t as i64).max(0);
        let fade_in = t as i64 - separation as i64;
        for ch in 0..channels {
            let down = if t < frames {
                ramp_down[t * channels + ch] as i64 * fade_out
            } else {
                0
            };
            let up = if t >= separation {
                ramp_up[(t - separation) * channels + ch] as i64 * fade_in
            } else {
                0
            };
            out[t * channels + ch] = ((down + up) / width) as i16;
        }
    }
}

/// Rounds fractional frame counts down, keeping the remainder for the next call.
///
/// Stages that emit `period / factor` frames at a time use one of these per
/// count, so over many periods the totals match the exact ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCarry(f64);

impl FrameCarry {
    /// Whole frames for `exact` plus any carried fraction.
    pub fn take(&mut self, exact: f64) -> usize {
        let total = (exact + self.0).max(0.0);
        let whole = total.floor();
        self.0 = total - whole;
        whole as usize
    }

    pub fn reset(&mut self) {
        self.0 = 0.0;
    }
}

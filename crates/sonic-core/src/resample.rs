//! Streaming linear-interpolation resampler for the rate stage.
//!
//! Positions are tracked as integers on both sides of the conversion so the
//! stage never drifts: after `old_rate` input frames exactly `new_rate`
//! output frames have been produced. Both rates are halved until they fit in
//! 14 bits to keep the position products small.

use crate::buffer::SampleBuffer;
use crate::error::Result;

const MAX_REDUCED_RATE: i64 = 1 << 14;

#[derive(Debug, Clone)]
pub struct Resampler {
    buffer: SampleBuffer,
    channels: usize,
    old_position: i64,
    new_position: i64,
    rates: (i64, i64),
}

impl Resampler {
    pub fn new(channels: usize) -> Self {
        Self {
            buffer: SampleBuffer::new(channels),
            channels,
            old_position: 0,
            new_position: 0,
            rates: (0, 0),
        }
    }

    /// Frames held back (always the last input frame, for interpolation).
    pub fn pending_frames(&self) -> usize {
        self.buffer.frames()
    }

    /// Make room for `incoming` frames from the previous stage.
    pub fn reserve(&mut self, incoming: usize) -> Result<()> {
        self.buffer.reserve_frames(incoming)
    }

    /// Most frames one `process` call can emit after `incoming` more frames arrive.
    pub fn output_bound(&self, incoming: usize, sample_rate: u32, rate: f32) -> usize {
        let (old_rate, new_rate) = reduced_rates(sample_rate, rate);
        output_frames(self.buffer.frames() + incoming, old_rate, new_rate)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.old_position = 0;
        self.new_position = 0;
    }

    /// Take the frames of `output` from `mark` on and write them back resampled by `rate`.
    pub fn process(
        &mut self,
        output: &mut SampleBuffer,
        mark: usize,
        sample_rate: u32,
        rate: f32,
    ) -> Result<()> {
        output.move_tail_to(mark, &mut self.buffer)?;
        let frames = self.buffer.frames();
        if frames < 2 {
            return Ok(());
        }

        let (old_rate, new_rate) = reduced_rates(sample_rate, rate);
        if (old_rate, new_rate) != self.rates {
            self.old_position = 0;
            self.new_position = 0;
            self.rates = (old_rate, new_rate);
        }
        output.reserve_frames(output_frames(frames, old_rate, new_rate))?;

        let ch = self.channels;
        for position in 0..frames - 1 {
            while (self.old_position + 1) * new_rate > self.new_position * old_rate {
                let out = output.grow(1)?;
                let left = self.buffer.frame_slice(position, 1);
                let right = self.buffer.frame_slice(position + 1, 1);
                for c in 0..ch {
                    out[c] = self.interpolate(left[c], right[c], old_rate, new_rate);
                }
                self.new_position += 1;
            }
            self.old_position += 1;
            if self.old_position == old_rate {
                self.old_position = 0;
                debug_assert_eq!(self.new_position, new_rate);
                self.new_position = 0;
            }
        }
        self.buffer.discard_front(frames - 1);
        Ok(())
    }

    fn interpolate(&self, left: i16, right: i16, old_rate: i64, new_rate: i64) -> i16 {
        let position = self.new_position * old_rate;
        let left_position = self.old_position * new_rate;
        let right_position = (self.old_position + 1) * new_rate;
        let ratio = right_position - position;
        let width = right_position - left_position;
        ((ratio * left as i64 + (width - ratio) * right as i64) / width) as i16
    }
}

fn output_frames(frames: usize, old_rate: i64, new_rate: i64) -> usize {
    (frames as i64 * new_rate / old_rate) as usize + 2
}

/// Input and output rates for the integer position math.
fn reduced_rates(sample_rate: u32, rate: f32) -> (i64, i64) {
    let mut old_rate = sample_rate as i64;
    let mut new_rate = (sample_rate as f64 / rate as f64) as i64;
    while new_rate > MAX_REDUCED_RATE || old_rate > MAX_REDUCED_RATE {
        new_rate /= 2;
        old_rate /= 2;
    }
    (old_rate.max(1), new_rate.max(1))
}

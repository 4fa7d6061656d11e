//! Overlap-add pitch stage ("chord pitch").
//!
//! Re-spaces every pitch period to `period / pitch` frames. Raising pitch
//! crossfades the start of a period into its own tail; lowering pitch lays two
//! copies of the period over each other with a gap, so the original and the
//! shifted period sound together.

use crate::buffer::SampleBuffer;
use crate::error::Result;
use crate::format::PeriodWindow;
use crate::overlap::{overlap_add, overlap_add_with_separation, FrameCarry};
use crate::pitch::PeriodFinder;

#[derive(Debug, Clone)]
pub struct ChordStage {
    buffer: SampleBuffer,
    finder: PeriodFinder,
    channels: usize,
    period_carry: FrameCarry,
}

impl ChordStage {
    pub fn new(window: PeriodWindow, channels: usize) -> Result<Self> {
        Ok(Self {
            buffer: SampleBuffer::with_capacity(channels, window.max_required)?,
            finder: PeriodFinder::new(window, channels)?,
            channels,
            period_carry: FrameCarry::default(),
        })
    }

    pub fn set_quality(&mut self, quality: bool) {
        self.finder.set_quality(quality);
    }

    /// Frames waiting for enough look-ahead.
    pub fn pending_frames(&self) -> usize {
        self.buffer.frames()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.finder.reset();
        self.period_carry.reset();
    }

    /// Make room for `incoming` frames from the previous stage.
    pub fn reserve(&mut self, incoming: usize) -> Result<()> {
        self.buffer.reserve_frames(incoming)
    }

    /// Most frames one `process` call can emit after `incoming` more frames arrive.
    pub fn output_bound(&self, incoming: usize, pitch: f32) -> usize {
        let frames = self.buffer.frames() + incoming;
        (frames as f64 / pitch as f64).ceil() as usize + 1
    }

    /// Take the frames of `output` from `mark` on and write them back pitch-shifted.
    pub fn process(&mut self, output: &mut SampleBuffer, mark: usize, pitch: f32) -> Result<()> {
        output.move_tail_to(mark, &mut self.buffer)?;
        let mut position = 0;
        let result = self.run(output, pitch, &mut position);
        self.buffer.discard_front(position);
        result
    }

    fn run(&mut self, output: &mut SampleBuffer, pitch: f32, position: &mut usize) -> Result<()> {
        let max_required = self.finder.window().max_required;
        let ch = self.channels;
        while self.buffer.frames() - *position >= max_required {
            let samples = &self.buffer.as_slice()[*position * ch..];
            let period = self.finder.find(samples, false);
            let new_period = self.period_carry.take(period as f64 / pitch as f64);
            let out = output.grow(new_period)?;
            if pitch >= 1.0 {
                overlap_add(
                    new_period,
                    ch,
                    out,
                    samples,
                    &samples[(period - new_period) * ch..],
                );
            } else {
                let separation = new_period - period;
                overlap_add_with_separation(period, ch, separation, out, samples, samples);
            }
            *position += period;
        }
        Ok(())
    }
}

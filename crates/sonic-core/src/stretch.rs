//! Pitch-synchronous overlap-add time stretching.
//!
//! ## Algorithm Overview
//!
//! 1. **Period search**: find the pitch period at the read position
//! 2. **Skip or insert**: to speed up, crossfade two adjacent periods into one;
//!    to slow down, emit a period and then a crossfade of it with the next
//! 3. **Copy**: pass input through verbatim until the running ratio of output
//!    to input matches the speed again
//!
//! Whole periods are dropped or repeated, so the waveform keeps its local
//! pitch. The stage holds back `max_required` frames of look-ahead.
//!
//! Crossfade and copy lengths are fractional at most speeds. Each is rounded
//! down and the remainder carried into the next period, so the output length
//! tracks `input / speed` over any number of periods.

use crate::buffer::SampleBuffer;
use crate::error::Result;
use crate::format::PeriodWindow;
use crate::overlap::{overlap_add, FrameCarry};
use crate::params::needs_speed_change;
use crate::pitch::PeriodFinder;

/// Speed stage state.
#[derive(Debug, Clone)]
pub struct Stretcher {
    finder: PeriodFinder,
    channels: usize,
    /// Frames to copy verbatim before the next skip/insert
    remaining_to_copy: usize,
    crossfade_carry: FrameCarry,
    copy_carry: FrameCarry,
}

impl Stretcher {
    pub fn new(window: PeriodWindow, channels: usize) -> Result<Self> {
        Ok(Self {
            finder: PeriodFinder::new(window, channels)?,
            channels,
            remaining_to_copy: 0,
            crossfade_carry: FrameCarry::default(),
            copy_carry: FrameCarry::default(),
        })
    }

    pub fn set_quality(&mut self, quality: bool) {
        self.finder.set_quality(quality);
    }

    /// Look-ahead needed before a period can be processed.
    pub fn max_required(&self) -> usize {
        self.finder.window().max_required
    }

    /// Forget the pending verbatim copy and period history (after a flush).
    pub fn end_of_input(&mut self) {
        self.remaining_to_copy = 0;
        self.crossfade_carry.reset();
        self.copy_carry.reset();
        self.finder.reset();
    }

    /// Most frames one `process` call can emit for `frames` input frames.
    pub fn output_bound(&self, frames: usize, speed: f32) -> usize {
        if !needs_speed_change(speed) || speed > 1.0 {
            // Every skip emits fewer frames than it consumes
            return frames;
        }
        if frames < self.max_required() {
            return 0;
        }
        ((frames + 1) as f64 / speed as f64).ceil() as usize + 2 * self.max_required()
    }

    /// Consume as much of `input` as possible into `output` at `speed`.
    ///
    /// Frames that were processed are removed from `input` even when growing
    /// `output` fails part way. Reserve [`output_bound`](Self::output_bound)
    /// frames first to rule that out.
    pub fn process(
        &mut self,
        input: &mut SampleBuffer,
        output: &mut SampleBuffer,
        speed: f32,
    ) -> Result<()> {
        if !needs_speed_change(speed) {
            output.extend(input.as_slice())?;
            input.clear();
            return Ok(());
        }
        if input.frames() < self.max_required() {
            return Ok(());
        }

        let mut position = 0;
        let result = self.run(input, output, speed, &mut position);
        input.discard_front(position);
        result
    }

    fn run(
        &mut self,
        input: &SampleBuffer,
        output: &mut SampleBuffer,
        speed: f32,
        position: &mut usize,
    ) -> Result<()> {
        let max_required = self.max_required();
        let available = input.frames();
        loop {
            if self.remaining_to_copy > 0 {
                let frames = self.remaining_to_copy.min(max_required);
                output.extend(input.frame_slice(*position, frames))?;
                self.remaining_to_copy -= frames;
                *position += frames;
            } else {
                let samples = &input.as_slice()[*position * self.channels..];
                let period = self.finder.find(samples, true);
                if speed > 1.0 {
                    let skipped = self.skip_period(samples, output, speed, period)?;
                    *position += period + skipped;
                } else {
                    *position += self.insert_period(samples, output, speed, period)?;
                }
            }
            if *position + max_required > available {
                return Ok(());
            }
        }
    }

    /// Replace two periods with one crossfaded period; returns frames emitted.
    fn skip_period(
        &mut self,
        samples: &[i16],
        output: &mut SampleBuffer,
        speed: f32,
        period: usize,
    ) -> Result<usize> {
        let period_f = period as f64;
        let speed = speed as f64;
        let (new_frames, copy) = if speed >= 2.0 {
            (self.crossfade_carry.take(period_f / (speed - 1.0)), 0)
        } else {
            (
                period,
                self.copy_carry.take(period_f * (2.0 - speed) / (speed - 1.0)),
            )
        };
        let out = output.grow(new_frames)?;
        overlap_add(
            new_frames,
            self.channels,
            out,
            samples,
            &samples[period * self.channels..],
        );
        self.remaining_to_copy = copy;
        Ok(new_frames)
    }

    /// Emit a period followed by a crossfade back into it; returns input frames used.
    fn insert_period(
        &mut self,
        samples: &[i16],
        output: &mut SampleBuffer,
        speed: f32,
        period: usize,
    ) -> Result<usize> {
        let period_f = period as f64;
        let speed = speed as f64;
        // Below 0.5 this can round to zero; the carry grows until a frame is consumed
        let (new_frames, copy) = if speed < 0.5 {
            (self.crossfade_carry.take(period_f * speed / (1.0 - speed)), 0)
        } else {
            (
                period,
                self.copy_carry.take(period_f * (2.0 * speed - 1.0) / (1.0 - speed)),
            )
        };
        let ch = self.channels;
        let out = output.grow(period + new_frames)?;
        out[..period * ch].copy_from_slice(&samples[..period * ch]);
        overlap_add(
            new_frames,
            ch,
            &mut out[period * ch..],
            &samples[period * ch..],
            samples,
        );
        self.remaining_to_copy = copy;
        Ok(new_frames)
    }
}

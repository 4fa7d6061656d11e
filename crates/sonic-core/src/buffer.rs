//! Interleaved 16-bit sample FIFO.
//!
//! ## Growth policy
//!
//! Capacity grows to at least double the previous capacity whenever an append
//! does not fit, and is never released while the buffer lives. Appends are
//! therefore amortised O(1) and a stream settles at a steady allocation after
//! the first few blocks. Growth goes through `try_reserve_exact`, so a failed
//! allocation reports `OutOfMemory` and leaves the contents untouched.

use crate::error::{Error, Result};

/// Growable FIFO of interleaved frames.
#[derive(Debug, Clone, Default)]
pub struct SampleBuffer {
    samples: Vec<i16>,
    channels: usize,
}

impl SampleBuffer {
    pub fn new(channels: usize) -> Self {
        Self {
            samples: Vec::new(),
            channels: channels.max(1),
        }
    }

    /// Create with room for `frames` frames up front.
    pub fn with_capacity(channels: usize, frames: usize) -> Result<Self> {
        let mut buffer = Self::new(channels);
        buffer.reserve_frames(frames)?;
        Ok(buffer)
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of whole frames held.
    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Frames that fit without reallocating.
    pub fn capacity_frames(&self) -> usize {
        self.samples.capacity() / self.channels
    }

    #[inline]
    pub fn as_slice(&self) -> &[i16] {
        &self.samples
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [i16] {
        &mut self.samples
    }

    /// Samples of frames `start..start + len`.
    #[inline]
    pub fn frame_slice(&self, start: usize, len: usize) -> &[i16] {
        &self.samples[start * self.channels..(start + len) * self.channels]
    }

    /// Make room for `frames` more frames, doubling capacity when it runs out.
    pub fn reserve_frames(&mut self, frames: usize) -> Result<()> {
        let oom = Error::OutOfMemory {
            requested: frames.saturating_mul(self.channels),
        };
        let additional = frames.checked_mul(self.channels).ok_or(oom.clone())?;
        let needed = self.samples.len().checked_add(additional).ok_or(oom.clone())?;
        let capacity = self.samples.capacity();
        if needed <= capacity {
            return Ok(());
        }
        let target = needed.max(capacity * 2);
        self.samples
            .try_reserve_exact(target - self.samples.len())
            .map_err(|_| oom)
    }

    /// Append interleaved samples. `samples.len()` must be a whole number of frames.
    pub fn extend(&mut self, samples: &[i16]) -> Result<()> {
        debug_assert_eq!(samples.len() % self.channels, 0);
        self.reserve_frames(samples.len() / self.channels)?;
        self.samples.extend_from_slice(samples);
        Ok(())
    }

    /// Append `frames` frames of silence.
    pub fn extend_silence(&mut self, frames: usize) -> Result<()> {
        self.reserve_frames(frames)?;
        let len = self.samples.len() + frames * self.channels;
        self.samples.resize(len, 0);
        Ok(())
    }

    /// Append `frames` zeroed frames and return them for writing.
    pub fn grow(&mut self, frames: usize) -> Result<&mut [i16]> {
        let start = self.samples.len();
        self.extend_silence(frames)?;
        Ok(&mut self.samples[start..])
    }

    /// Drop `frames` frames from the front.
    pub fn discard_front(&mut self, frames: usize) {
        let count = (frames * self.channels).min(self.samples.len());
        self.samples.drain(..count);
    }

    /// Keep only the first `frames` frames.
    pub fn truncate_frames(&mut self, frames: usize) {
        self.samples.truncate(frames * self.channels);
    }

    /// Append `frames` frames produced by `samples`, reserving once up front.
    pub fn extend_from_iter(
        &mut self,
        frames: usize,
        samples: impl IntoIterator<Item = i16>,
    ) -> Result<()> {
        self.reserve_frames(frames)?;
        let len = self.samples.len() + frames * self.channels;
        self.samples.extend(samples.into_iter().take(frames * self.channels));
        self.samples.resize(len, 0);
        Ok(())
    }

    /// Move whole frames from the front into `out`; returns frames moved.
    pub fn pop_into(&mut self, out: &mut [i16]) -> usize {
        let frames = (out.len() / self.channels).min(self.frames());
        let count = frames * self.channels;
        out[..count].copy_from_slice(&self.samples[..count]);
        self.samples.drain(..count);
        frames
    }

    /// Like [`pop_into`](Self::pop_into), converting each sample with `convert`.
    pub fn pop_with<T>(&mut self, out: &mut [T], convert: impl Fn(i16) -> T) -> usize {
        let frames = (out.len() / self.channels).min(self.frames());
        let count = frames * self.channels;
        for (dst, src) in out.iter_mut().zip(self.samples.drain(..count)) {
            *dst = convert(src);
        }
        frames
    }

    /// Move every frame from `start` onwards to the end of `dest`.
    pub fn move_tail_to(&mut self, start: usize, dest: &mut SampleBuffer) -> Result<()> {
        let from = start * self.channels;
        if from >= self.samples.len() {
            return Ok(());
        }
        dest.extend(&self.samples[from..])?;
        self.samples.truncate(from);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

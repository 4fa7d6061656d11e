//! Stream format and the pitch-period window derived from it.

use crate::error::{Error, Result};

/// Highest voice pitch the period search looks for, in Hz.
pub const MAX_PITCH_HZ: u32 = 400;
/// Lowest voice pitch the period search looks for, in Hz.
pub const MIN_PITCH_HZ: u32 = 65;
/// Rate the coarse period search decimates to, in Hz.
pub const AMDF_FREQ: u32 = 4000;

/// Sample rate and channel layout of interleaved 16-bit frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct StreamFormat {
    /// Frames per second
    pub sample_rate: u32,
    /// Samples per frame
    pub channels: usize,
}

impl StreamFormat {
    /// Validates that both values are non-zero.
    pub fn new(sample_rate: u32, channels: usize) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::invalid("sample rate must be positive"));
        }
        if channels == 0 {
            return Err(Error::invalid("channel count must be positive"));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Mono format at the given rate.
    pub fn mono(sample_rate: u32) -> Result<Self> {
        Self::new(sample_rate, 1)
    }

    /// Stereo format at the given rate.
    pub fn stereo(sample_rate: u32) -> Result<Self> {
        Self::new(sample_rate, 2)
    }

    /// Number of interleaved samples in `frames` frames.
    #[inline]
    pub fn samples(&self, frames: usize) -> usize {
        frames * self.channels
    }

    /// Number of whole frames in `samples` interleaved samples.
    #[inline]
    pub fn frames(&self, samples: usize) -> usize {
        samples / self.channels
    }

    /// Bytes per frame of 16-bit PCM.
    #[inline]
    pub fn frame_bytes(&self) -> usize {
        self.channels * std::mem::size_of::<i16>()
    }

    /// Pitch-period search window for this format.
    pub fn periods(&self) -> PeriodWindow {
        PeriodWindow::for_sample_rate(self.sample_rate)
    }
}

/// Period bounds in frames.
///
/// `max_required` is the look-ahead the speed and pitch stages need before
/// they can act: two of the longest periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub min_period: usize,
    pub max_period: usize,
    pub max_required: usize,
    /// Decimation factor for the coarse search (1 = none)
    pub skip: usize,
}

impl PeriodWindow {
    pub fn for_sample_rate(sample_rate: u32) -> Self {
        let min_period = ((sample_rate / MAX_PITCH_HZ) as usize).max(1);
        let max_period = ((sample_rate / MIN_PITCH_HZ) as usize).max(min_period + 1);
        let skip = if sample_rate > AMDF_FREQ {
            (sample_rate / AMDF_FREQ) as usize
        } else {
            1
        };
        Self {
            min_period,
            max_period,
            max_required: 2 * max_period,
            skip,
        }
    }
}

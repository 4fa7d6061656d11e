//! Pitch-period search using the average magnitude difference function (AMDF).
//!
//! ## Algorithm
//!
//! For each candidate lag `τ` in the period window the difference
//! `d(τ) = Σ |x[j] - x[j+τ]|, j < τ` is accumulated and normalised by `τ`.
//! The lag with the smallest normalised difference wins.
//!
//! Above [`AMDF_FREQ`](crate::format::AMDF_FREQ) the search first runs on a
//! channel-mixed, decimated copy of the window and then refines the coarse
//! result at full resolution in a `±4 * skip` neighbourhood. The previous
//! period is kept when the new match is not clearly better, which stops the
//! stretcher from jittering between octave candidates.

use crate::error::{Error, Result};
use crate::format::PeriodWindow;

/// Outcome of one range search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RangeMatch {
    period: usize,
    min_diff: u64,
    max_diff: u64,
}

/// Stateful period finder for one stream format.
#[derive(Debug, Clone)]
pub struct PeriodFinder {
    window: PeriodWindow,
    channels: usize,
    quality: bool,
    downsampled: Vec<i16>,
    prev_period: usize,
    prev_min_diff: u64,
}

impl PeriodFinder {
    pub fn new(window: PeriodWindow, channels: usize) -> Result<Self> {
        let mut downsampled = Vec::new();
        downsampled
            .try_reserve_exact(window.max_required)
            .map_err(|_| Error::OutOfMemory {
                requested: window.max_required,
            })?;
        Ok(Self {
            window,
            channels: channels.max(1),
            quality: false,
            downsampled,
            prev_period: 0,
            prev_min_diff: 0,
        })
    }

    pub fn window(&self) -> PeriodWindow {
        self.window
    }

    /// Search at full resolution only.
    pub fn set_quality(&mut self, quality: bool) {
        self.quality = quality;
    }

    /// Forget the period history.
    pub fn reset(&mut self) {
        self.prev_period = 0;
        self.prev_min_diff = 0;
    }

    /// Find the period of the interleaved frames at the start of `samples`.
    ///
    /// `samples` must hold at least `max_required` frames. With
    /// `prefer_new` the fresh estimate wins unless it is noticeably worse
    /// than the previous one.
    pub fn find(&mut self, samples: &[i16], prefer_new: bool) -> usize {
        debug_assert!(samples.len() >= self.window.max_required * self.channels);
        let w = self.window;
        let skip = if self.quality { 1 } else { w.skip };

        let found = if self.channels == 1 && skip == 1 {
            search_range(samples, w.min_period, w.max_period)
        } else {
            self.downsample(samples, skip);
            let coarse = search_range(
                &self.downsampled,
                (w.min_period / skip).max(1),
                (w.max_period / skip).max(1),
            );
            if skip == 1 {
                coarse
            } else {
                let center = coarse.period * skip;
                let lo = center.saturating_sub(skip * 4).max(w.min_period);
                let hi = (center + skip * 4).min(w.max_period);
                if self.channels == 1 {
                    search_range(samples, lo, hi)
                } else {
                    self.downsample(samples, 1);
                    search_range(&self.downsampled, lo, hi)
                }
            }
        };

        let period = if self.prev_period_better(&found, prefer_new) {
            self.prev_period
        } else {
            found.period
        };
        self.prev_min_diff = found.min_diff;
        self.prev_period = found.period;
        period
    }

    fn prev_period_better(&self, found: &RangeMatch, prefer_new: bool) -> bool {
        if found.min_diff == 0 || self.prev_period == 0 {
            return false;
        }
        if prefer_new {
            if found.max_diff > found.min_diff * 3 {
                return false;
            }
            if found.min_diff * 2 <= self.prev_min_diff * 3 {
                return false;
            }
        } else if found.min_diff <= self.prev_min_diff {
            return false;
        }
        true
    }

    /// Average `skip` frames (all channels) into each output value.
    fn downsample(&mut self, samples: &[i16], skip: usize) {
        let per_value = self.channels * skip;
        let count = self.window.max_required / skip;
        self.downsampled.clear();
        self.downsampled.extend(
            samples[..count * per_value]
                .chunks_exact(per_value)
                .map(|chunk| {
                    let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                    (sum / per_value as i32) as i16
                }),
        );
    }
}

/// AMDF over `min..=max` on mono samples (needs `2 * max` samples).
fn search_range(samples: &[i16], min: usize, max: usize) -> RangeMatch {
    let min = min.max(1);
    let max = max.max(min);
    let mut best_period = 0usize;
    let mut worst_period = 255usize;
    let mut min_diff: u64 = 1;
    let mut max_diff: u64 = 0;

    for period in min..=max {
        let diff: u64 = samples[..period]
            .iter()
            .zip(&samples[period..2 * period])
            .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs() as u64)
            .sum();
        // Compare diff / period without dividing
        if diff * (best_period as u64) < min_diff * period as u64 {
            min_diff = diff;
            best_period = period;
        }
        if diff * (worst_period as u64) > max_diff * period as u64 {
            max_diff = diff;
            worst_period = period;
        }
    }

    RangeMatch {
        period: best_period,
        min_diff: min_diff / best_period as u64,
        max_diff: max_diff / worst_period as u64,
    }
}

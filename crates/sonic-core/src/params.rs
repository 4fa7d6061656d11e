//! Speed, pitch, rate and volume parameters.

/// Factor parameters for a stream.
///
/// ## Range Limits
///
/// - `speed`, `pitch`, `rate`: 0.05 - 20.0
/// - `volume`: 0.0 - 64.0
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct StreamParams {
    /// Duration scaling without pitch change (2.0 = twice as fast)
    pub speed: f32,

    /// Pitch scaling without duration change (2.0 = one octave up)
    pub pitch: f32,

    /// Speed and pitch together, like changing the playback rate of a tape
    pub rate: f32,

    /// Linear output gain
    pub volume: f32,

    /// Overlap-add pitch stage instead of resampling; harmonises when pitch < 1
    pub chord_pitch: bool,

    /// Full-resolution period search (slower, slightly cleaner)
    pub quality: bool,
}

impl StreamParams {
    pub const MIN_FACTOR: f32 = 0.05;
    pub const MAX_FACTOR: f32 = 20.0;
    pub const MAX_VOLUME: f32 = 64.0;

    /// Identity parameters (no effect).
    pub fn new() -> Self {
        Self {
            speed: 1.0,
            pitch: 1.0,
            rate: 1.0,
            volume: 1.0,
            chord_pitch: false,
            quality: false,
        }
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = sanitize_factor(speed, self.speed);
        self
    }

    pub fn pitch(mut self, pitch: f32) -> Self {
        self.pitch = sanitize_factor(pitch, self.pitch);
        self
    }

    pub fn rate(mut self, rate: f32) -> Self {
        self.rate = sanitize_factor(rate, self.rate);
        self
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = sanitize_volume(volume, self.volume);
        self
    }

    pub fn chord_pitch(mut self, enabled: bool) -> Self {
        self.chord_pitch = enabled;
        self
    }

    pub fn quality(mut self, enabled: bool) -> Self {
        self.quality = enabled;
        self
    }

    /// True when every sample would pass through unchanged.
    pub fn is_identity(&self) -> bool {
        !needs_speed_change(self.effective_speed())
            && self.resample_rate() == 1.0
            && (!self.chord_pitch || self.pitch == 1.0)
            && self.volume == 1.0
    }

    /// Speed the overlap-add stage runs at.
    ///
    /// Pitch is realised by stretching first and then resampling (or
    /// re-spacing periods in chord mode), so the stretch absorbs `1 / pitch`.
    pub fn effective_speed(&self) -> f32 {
        self.speed / self.pitch
    }

    /// Factor the resampling stage runs at.
    pub fn resample_rate(&self) -> f32 {
        if self.chord_pitch {
            self.rate
        } else {
            self.rate * self.pitch
        }
    }

    /// Expected output frames for `frames` input frames.
    pub fn expected_frames(&self, frames: usize) -> usize {
        (frames as f64 / (self.speed as f64 * self.rate as f64)).round() as usize
    }
}

impl Default for StreamParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Speed factors this close to 1.0 bypass the overlap-add stage.
pub(crate) fn needs_speed_change(speed: f32) -> bool {
    !(0.99999..=1.00001).contains(&speed)
}

pub(crate) fn sanitize_factor(value: f32, previous: f32) -> f32 {
    if !value.is_finite() || value <= 0.0 {
        tracing::warn!("Ignoring non-positive factor {}", value);
        return previous;
    }
    value.clamp(StreamParams::MIN_FACTOR, StreamParams::MAX_FACTOR)
}

pub(crate) fn sanitize_volume(value: f32, previous: f32) -> f32 {
    if !value.is_finite() || value < 0.0 {
        tracing::warn!("Ignoring invalid volume {}", value);
        return previous;
    }
    value.min(StreamParams::MAX_VOLUME)
}

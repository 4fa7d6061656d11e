//! Builder for configuring and constructing a [`Stream`].

use sonic_core::{Stream, StreamFormat, StreamParams};

use crate::Result;

#[cfg(feature = "bridge")]
use sonic_bridge::{ByteStream, HandleRegistry, StreamHandle, TrailingBytes};

/// Factor setters follow the stream's own rules: out-of-range values are
/// clamped and non-positive ones ignored. Format errors surface from
/// [`build`](Self::build).
///
/// # Example
///
/// ```
/// use sonic::prelude::*;
///
/// let mut stream = StreamBuilder::new()
///     .sample_rate(22050)
///     .channels(2)
///     .speed(1.5)
///     .volume(0.8)
///     .build()?;
///
/// assert_eq!(stream.channels(), 2);
/// stream.write(&[0; 1024])?;
/// # Ok::<(), sonic::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct StreamBuilder {
    sample_rate: u32,
    channels: usize,
    params: StreamParams,

    #[cfg(feature = "bridge")]
    trailing_bytes: TrailingBytes,
}

impl Default for StreamBuilder {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            params: StreamParams::new(),

            #[cfg(feature = "bridge")]
            trailing_bytes: TrailingBytes::default(),
        }
    }
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default: 44100
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Default: 1
    pub fn channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn format(mut self, format: StreamFormat) -> Self {
        self.sample_rate = format.sample_rate;
        self.channels = format.channels;
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.params = self.params.speed(speed);
        self
    }

    pub fn pitch(mut self, pitch: f32) -> Self {
        self.params = self.params.pitch(pitch);
        self
    }

    pub fn rate(mut self, rate: f32) -> Self {
        self.params = self.params.rate(rate);
        self
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.params = self.params.volume(volume);
        self
    }

    pub fn chord_pitch(mut self, enabled: bool) -> Self {
        self.params = self.params.chord_pitch(enabled);
        self
    }

    pub fn quality(mut self, enabled: bool) -> Self {
        self.params = self.params.quality(enabled);
        self
    }

    /// Replace all factor parameters at once.
    pub fn params(mut self, params: StreamParams) -> Self {
        self.params = params;
        self
    }

    /// Trailing-byte handling for [`build_bytes`](Self::build_bytes). Default: reject.
    #[cfg(feature = "bridge")]
    pub fn trailing_bytes(mut self, policy: TrailingBytes) -> Self {
        self.trailing_bytes = policy;
        self
    }

    pub fn build(self) -> Result<Stream> {
        let format = StreamFormat::new(self.sample_rate, self.channels)?;
        tracing::debug!("Building stream: {:?}", self);
        Ok(Stream::with_params(format, self.params)?)
    }

    /// Build a byte-level stream for a host binding.
    #[cfg(feature = "bridge")]
    pub fn build_bytes(self) -> Result<ByteStream> {
        let policy = self.trailing_bytes;
        Ok(ByteStream::from_stream(self.build()?).with_policy(policy))
    }

    /// Build a byte-level stream and hand it to `registry`.
    #[cfg(feature = "bridge")]
    pub fn register(self, registry: &HandleRegistry) -> Result<StreamHandle> {
        Ok(registry.insert(self.build_bytes()?)?)
    }
}

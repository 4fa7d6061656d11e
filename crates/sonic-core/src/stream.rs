//! Push/pull speed, pitch, rate and volume stream.
//!
//! ## Pipeline
//!
//! ```text
//! write -> input -> Stretcher (speed / pitch) -> ChordStage (chord mode)
//!                                            -> Resampler (rate, or rate * pitch)
//!                                            -> volume -> egress -> read
//! ```
//!
//! Each stage works on the frames the previous stage appended to the egress
//! queue during the same call, so a single output buffer is shared by all of
//! them. Stages that are not needed for the current parameters are skipped
//! unless they still hold frames from earlier calls.
//!
//! Before a call consumes any input, every buffer it can grow is reserved
//! for the worst case. If that fails the call returns `OutOfMemory` and the
//! stream is left exactly as it was, so the same write can be retried.
//!
//! ## Format changes
//!
//! [`Stream::set_sample_rate`] and [`Stream::set_channels`] only record the
//! new format. The next [`write`](Stream::write) or [`flush`](Stream::flush)
//! first flushes everything buffered under the old format, then rebuilds the
//! stages. Frames already in the egress queue keep their old format; see
//! [`Stream::output_format`].

use crate::buffer::SampleBuffer;
use crate::chord::ChordStage;
use crate::convert::{f32_to_i16, i16_to_f32, i16_to_u8, u8_to_i16};
use crate::egress::Egress;
use crate::error::{Error, Result};
use crate::format::StreamFormat;
use crate::gain::scale_samples;
use crate::params::{needs_speed_change, sanitize_factor, sanitize_volume, StreamParams};
use crate::resample::Resampler;
use crate::stretch::Stretcher;

/// Per-format processing state.
#[derive(Debug, Clone)]
struct Pipeline {
    input: SampleBuffer,
    stretcher: Stretcher,
    chord: ChordStage,
    resampler: Resampler,
    max_required: usize,
    /// Largest reservation allowed, to exercise the out-of-memory path
    #[cfg(test)]
    reserve_limit: Option<usize>,
}

/// Which stages one `process` call runs, and at what factors.
#[derive(Debug, Clone, Copy)]
struct Plan {
    speed: f32,
    chord: Option<f32>,
    resample: Option<f32>,
    sample_rate: u32,
}

impl Pipeline {
    fn new(format: StreamFormat, quality: bool) -> Result<Self> {
        let window = format.periods();
        let mut stretcher = Stretcher::new(window, format.channels)?;
        let mut chord = ChordStage::new(window, format.channels)?;
        stretcher.set_quality(quality);
        chord.set_quality(quality);
        Ok(Self {
            input: SampleBuffer::with_capacity(format.channels, window.max_required)?,
            stretcher,
            chord,
            resampler: Resampler::new(format.channels),
            max_required: window.max_required,
            #[cfg(test)]
            reserve_limit: None,
        })
    }

    fn set_quality(&mut self, quality: bool) {
        self.stretcher.set_quality(quality);
        self.chord.set_quality(quality);
    }

    fn pending_frames(&self) -> usize {
        self.input.frames() + self.chord.pending_frames() + self.resampler.pending_frames()
    }

    /// Reserve every buffer `plan` can grow, so no stage fails after consuming input.
    fn reserve(&mut self, output: &mut SampleBuffer, plan: Plan) -> Result<()> {
        let mut incoming = self.stretcher.output_bound(self.input.frames(), plan.speed);
        let mut largest = incoming;
        if let Some(pitch) = plan.chord {
            self.chord.reserve(incoming)?;
            incoming = self.chord.output_bound(incoming, pitch);
            largest = largest.max(incoming);
        }
        if let Some(rate) = plan.resample {
            self.resampler.reserve(incoming)?;
            incoming = self.resampler.output_bound(incoming, plan.sample_rate, rate);
            largest = largest.max(incoming);
        }
        #[cfg(test)]
        if self.reserve_limit.is_some_and(|limit| largest > limit) {
            return Err(Error::OutOfMemory {
                requested: largest * output.channels(),
            });
        }
        output.reserve_frames(largest)
    }

    fn reset(&mut self) {
        self.input.clear();
        self.stretcher.end_of_input();
        self.chord.clear();
        self.resampler.clear();
    }
}

/// Streaming speed/pitch/rate/volume processor for interleaved 16-bit PCM.
///
/// # Example
///
/// ```
/// use sonic_core::Stream;
///
/// let mut stream = Stream::new(8000, 1)?;
/// stream.set_speed(2.0);
///
/// let input = vec![0i16; 8000];
/// stream.write(&input)?;
/// stream.flush()?;
///
/// let mut output = vec![0i16; 8000];
/// let frames = stream.read(&mut output);
/// assert_eq!(frames, 4000);
/// # Ok::<(), sonic_core::Error>(())
/// ```
#[derive(Debug)]
pub struct Stream {
    format: StreamFormat,
    pending_format: Option<StreamFormat>,
    params: StreamParams,
    pipeline: Pipeline,
    egress: Egress,
}

impl Stream {
    /// Create a stream with identity parameters.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `sample_rate` or `channels` is zero.
    pub fn new(sample_rate: u32, channels: usize) -> Result<Self> {
        Self::with_format(StreamFormat::new(sample_rate, channels)?)
    }

    pub fn with_format(format: StreamFormat) -> Result<Self> {
        Self::with_params(format, StreamParams::new())
    }

    /// Create a stream with all factor parameters set at once.
    pub fn with_params(format: StreamFormat, params: StreamParams) -> Result<Self> {
        let format = StreamFormat::new(format.sample_rate, format.channels)?;
        let params = sanitize_params(params, StreamParams::new());
        let stream = Self {
            format,
            pending_format: None,
            params,
            pipeline: Pipeline::new(format, params.quality)?,
            egress: Egress::new(format),
        };
        tracing::debug!(
            "Created stream: {} Hz, {} channels, {:?}",
            format.sample_rate,
            format.channels,
            params
        );
        Ok(stream)
    }

    // Accessors

    /// Format that the next written samples are interpreted in.
    pub fn format(&self) -> StreamFormat {
        self.pending_format.unwrap_or(self.format)
    }

    pub fn sample_rate(&self) -> u32 {
        self.format().sample_rate
    }

    pub fn channels(&self) -> usize {
        self.format().channels
    }

    /// Format of the frames the next read returns.
    pub fn output_format(&self) -> StreamFormat {
        self.egress.front_format()
    }

    pub fn params(&self) -> StreamParams {
        self.params
    }

    pub fn speed(&self) -> f32 {
        self.params.speed
    }

    pub fn pitch(&self) -> f32 {
        self.params.pitch
    }

    pub fn rate(&self) -> f32 {
        self.params.rate
    }

    pub fn volume(&self) -> f32 {
        self.params.volume
    }

    pub fn chord_pitch(&self) -> bool {
        self.params.chord_pitch
    }

    pub fn quality(&self) -> bool {
        self.params.quality
    }

    // Setters

    /// Set the speed factor. Non-positive or non-finite values are ignored.
    pub fn set_speed(&mut self, speed: f32) {
        self.params.speed = sanitize_factor(speed, self.params.speed);
        tracing::debug!("Stream speed changed: {}", self.params.speed);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.params.pitch = sanitize_factor(pitch, self.params.pitch);
        tracing::debug!("Stream pitch changed: {}", self.params.pitch);
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.params.rate = sanitize_factor(rate, self.params.rate);
        tracing::debug!("Stream rate changed: {}", self.params.rate);
    }

    /// Set the output gain, clamped to `0.0..=64.0`.
    pub fn set_volume(&mut self, volume: f32) {
        self.params.volume = sanitize_volume(volume, self.params.volume);
        tracing::debug!("Stream volume changed: {}", self.params.volume);
    }

    pub fn set_chord_pitch(&mut self, enabled: bool) {
        self.params.chord_pitch = enabled;
        tracing::debug!("Stream chord pitch: {}", enabled);
    }

    pub fn set_quality(&mut self, enabled: bool) {
        self.params.quality = enabled;
        self.pipeline.set_quality(enabled);
        tracing::debug!("Stream quality search: {}", enabled);
    }

    /// Replace every factor parameter, sanitizing each like the single setters.
    pub fn set_params(&mut self, params: StreamParams) {
        self.params = sanitize_params(params, self.params);
        self.pipeline.set_quality(self.params.quality);
        tracing::debug!("Stream params changed: {:?}", self.params);
    }

    /// Change the sample rate for frames written from now on.
    ///
    /// Takes effect at the next `write` or `flush`.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<()> {
        let next = StreamFormat::new(sample_rate, self.channels())?;
        self.schedule_format(next);
        Ok(())
    }

    /// Change the channel count for frames written from now on.
    ///
    /// Takes effect at the next `write` or `flush`.
    pub fn set_channels(&mut self, channels: usize) -> Result<()> {
        let next = StreamFormat::new(self.sample_rate(), channels)?;
        self.schedule_format(next);
        Ok(())
    }

    fn schedule_format(&mut self, next: StreamFormat) {
        self.pending_format = if next == self.format {
            None
        } else {
            Some(next)
        };
        tracing::debug!(
            "Stream format scheduled: {} Hz, {} channels",
            next.sample_rate,
            next.channels
        );
    }

    // Queue state

    /// Frames waiting in the egress queue, across all formats.
    pub fn available_frames(&self) -> usize {
        self.egress.frames()
    }

    /// Individual samples waiting in the egress queue.
    pub fn available_samples(&self) -> usize {
        self.egress.samples()
    }

    /// Frames written but not yet turned into output.
    pub fn pending_frames(&self) -> usize {
        self.pipeline.pending_frames()
    }

    /// Upper bound on [`pending_frames`](Self::pending_frames) after a write.
    ///
    /// Each stage in use adds its own look-ahead: `max_required` for the
    /// speed and chord stages, one frame for the resampler. A stage that was
    /// switched off still counts while it holds frames.
    pub fn latency_frames(&self) -> usize {
        let pipeline = &self.pipeline;
        let mut frames = 0;
        if needs_speed_change(self.params.effective_speed()) || pipeline.input.frames() > 0 {
            frames += pipeline.max_required;
        }
        if self.chord_active() {
            frames += pipeline.max_required;
        }
        if self.resampler_active() {
            frames += 1;
        }
        frames
    }

    // Writing

    /// Append interleaved frames and process as far as possible.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `samples.len()` is not a whole number of frames;
    /// `OutOfMemory` if a buffer cannot grow.
    pub fn write(&mut self, samples: &[i16]) -> Result<()> {
        self.check_whole_frames(samples.len())?;
        self.apply_pending_format()?;
        if samples.is_empty() {
            return Ok(());
        }
        self.stage_input(|input| input.extend(samples))?;
        tracing::trace!("Wrote {} frames", samples.len() / self.format.channels);
        self.process()
    }

    /// Append float frames in `[-1.0, 1.0]`; values outside are clipped.
    pub fn write_f32(&mut self, samples: &[f32]) -> Result<()> {
        self.write_converted(samples, |&s| f32_to_i16(s))
    }

    /// Append unsigned 8-bit frames (128 is silence).
    pub fn write_u8(&mut self, samples: &[u8]) -> Result<()> {
        self.write_converted(samples, |&s| u8_to_i16(s))
    }

    fn write_converted<T>(&mut self, samples: &[T], convert: impl Fn(&T) -> i16) -> Result<()> {
        self.check_whole_frames(samples.len())?;
        self.apply_pending_format()?;
        if samples.is_empty() {
            return Ok(());
        }
        let frames = samples.len() / self.format.channels;
        self.stage_input(|input| input.extend_from_iter(frames, samples.iter().map(convert)))?;
        tracing::trace!("Wrote {} frames", frames);
        self.process()
    }

    /// Append to the input with `append` and reserve for processing it.
    ///
    /// On failure the appended frames are removed again.
    fn stage_input(
        &mut self,
        append: impl FnOnce(&mut SampleBuffer) -> Result<()>,
    ) -> Result<()> {
        let held = self.pipeline.input.frames();
        let staged = match append(&mut self.pipeline.input) {
            Ok(()) => {
                let plan = self.plan();
                self.pipeline.reserve(self.egress.active_mut(), plan)
            }
            Err(err) => Err(err),
        };
        if staged.is_err() {
            self.pipeline.input.truncate_frames(held);
        }
        staged
    }

    fn check_whole_frames(&self, samples: usize) -> Result<()> {
        let channels = self.channels();
        if samples % channels != 0 {
            return Err(Error::invalid(format!(
                "{} samples is not a whole number of {}-channel frames",
                samples, channels
            )));
        }
        Ok(())
    }

    // Reading

    /// Move up to `out.len() / channels` frames into `out`; returns frames read.
    ///
    /// Never returns frames of two different formats in one call.
    pub fn read(&mut self, out: &mut [i16]) -> usize {
        let frames = self.egress.read_with(out, |s| s);
        tracing::trace!("Read {} frames", frames);
        frames
    }

    /// Like [`read`](Self::read), producing floats in `[-1.0, 1.0]`.
    pub fn read_f32(&mut self, out: &mut [f32]) -> usize {
        self.egress.read_with(out, i16_to_f32)
    }

    /// Like [`read`](Self::read), producing unsigned 8-bit samples.
    pub fn read_u8(&mut self, out: &mut [u8]) -> usize {
        self.egress.read_with(out, i16_to_u8)
    }

    /// Read every queued frame of the current output format.
    pub fn drain(&mut self) -> Vec<i16> {
        let mut out = vec![0; self.egress.samples()];
        let channels = self.output_format().channels;
        let frames = self.read(&mut out);
        out.truncate(frames * channels);
        out
    }

    // Processing

    /// Emit everything still held back, as if followed by silence, then
    /// trim the output of that silence.
    pub fn flush(&mut self) -> Result<()> {
        self.apply_pending_format()?;
        self.drain_pipeline()
    }

    fn apply_pending_format(&mut self) -> Result<()> {
        let Some(next) = self.pending_format else {
            return Ok(());
        };
        let pipeline = Pipeline::new(next, self.params.quality)?;
        self.drain_pipeline()?;

        self.pipeline = pipeline;
        self.pending_format = None;
        self.format = next;
        self.egress.switch_format(next);
        tracing::debug!(
            "Stream format changed: {} Hz, {} channels",
            next.sample_rate,
            next.channels
        );
        Ok(())
    }

    /// Flush the current pipeline into the egress queue.
    fn drain_pipeline(&mut self) -> Result<()> {
        let remaining = self.pipeline.input.frames();
        let chord_pending = self.pipeline.chord.pending_frames();
        let resampler_pending = self.pipeline.resampler.pending_frames();
        if remaining == 0 && chord_pending == 0 && resampler_pending == 0 {
            self.pipeline.stretcher.end_of_input();
            return Ok(());
        }

        let params = self.params;
        let speed = params.effective_speed();
        let mut expected = if needs_speed_change(speed) {
            remaining as f64 / speed as f64
        } else {
            remaining as f64
        };
        if self.chord_active() {
            expected = (expected + chord_pending as f64) / self.chord_factor() as f64;
        }
        if self.resampler_active() {
            expected = (expected + resampler_pending as f64) / params.resample_rate() as f64;
        }
        let expected = self.egress.active().frames() + expected.round() as usize;

        let max_required = self.pipeline.max_required;
        let pad = max_required + (3.0 * max_required as f32 * speed.max(1.0)).ceil() as usize;
        self.stage_input(|input| input.extend_silence(pad))?;
        let result = self.process();

        let output = self.egress.active_mut();
        if output.frames() > expected {
            output.truncate_frames(expected);
        }
        self.pipeline.reset();
        tracing::debug!(
            "Stream flushed: {} frames pending, {} frames queued",
            remaining,
            expected
        );
        result
    }

    fn chord_active(&self) -> bool {
        (self.params.chord_pitch && self.params.pitch != 1.0)
            || self.pipeline.chord.pending_frames() > 0
    }

    /// Pitch the chord stage runs at; leftovers drain unshifted after chord mode is turned off.
    fn chord_factor(&self) -> f32 {
        if self.params.chord_pitch {
            self.params.pitch
        } else {
            1.0
        }
    }

    fn resampler_active(&self) -> bool {
        self.params.resample_rate() != 1.0 || self.pipeline.resampler.pending_frames() > 0
    }

    fn plan(&self) -> Plan {
        Plan {
            speed: self.params.effective_speed(),
            chord: self.chord_active().then(|| self.chord_factor()),
            resample: self.resampler_active().then(|| self.params.resample_rate()),
            sample_rate: self.format.sample_rate,
        }
    }

    /// Run every stage once. Later stages still run if an earlier one fails
    /// part way; the first error is returned.
    fn process(&mut self) -> Result<()> {
        let plan = self.plan();
        let volume = self.params.volume;
        let channels = self.format.channels;

        let output = self.egress.active_mut();
        let mark = output.frames();
        let pipeline = &mut self.pipeline;

        let mut result = pipeline
            .stretcher
            .process(&mut pipeline.input, output, plan.speed);
        if let Some(pitch) = plan.chord {
            result = result.and(pipeline.chord.process(output, mark, pitch));
        }
        if let Some(rate) = plan.resample {
            result = result.and(pipeline.resampler.process(output, mark, plan.sample_rate, rate));
        }
        if volume != 1.0 {
            scale_samples(&mut output.as_mut_slice()[mark * channels..], volume);
        }
        result
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        tracing::debug!(
            "Dropped stream with {} frames unread",
            self.egress.frames()
        );
    }
}

/// Apply every field of `params` over `previous` with the setter rules.
fn sanitize_params(params: StreamParams, previous: StreamParams) -> StreamParams {
    StreamParams {
        speed: sanitize_factor(params.speed, previous.speed),
        pitch: sanitize_factor(params.pitch, previous.pitch),
        rate: sanitize_factor(params.rate, previous.rate),
        volume: sanitize_volume(params.volume, previous.volume),
        chord_pitch: params.chord_pitch,
        quality: params.quality,
    }
}

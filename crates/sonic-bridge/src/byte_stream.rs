//! Little-endian byte interface over [`Stream`].

use sonic_core::convert::{decode_le, encode_le};
use sonic_core::Stream;

use crate::error::{Error, Result};
use crate::policy::{TrailingBytes, WriteReport};
use crate::scratch::ScratchBuffer;

/// A [`Stream`] fed and drained with 16-bit little-endian PCM bytes.
///
/// # Example
///
/// ```
/// use sonic_bridge::ByteStream;
///
/// let mut stream = ByteStream::new(8000, 1)?;
/// let report = stream.put_bytes(&[0x01, 0x00, 0xff, 0x7f])?;
/// assert_eq!(report.frames, 2);
///
/// let mut out = vec![0u8; stream.available_bytes()];
/// assert_eq!(stream.receive_bytes(&mut out)?, 4);
/// assert_eq!(out, [0x01, 0x00, 0xff, 0x7f]);
/// # Ok::<(), sonic_bridge::Error>(())
/// ```
#[derive(Debug)]
pub struct ByteStream {
    stream: Stream,
    scratch: ScratchBuffer,
    policy: TrailingBytes,
}

impl ByteStream {
    pub fn new(sample_rate: u32, channels: usize) -> Result<Self> {
        Ok(Self::from_stream(Stream::new(sample_rate, channels)?))
    }

    pub fn from_stream(stream: Stream) -> Self {
        Self {
            stream,
            scratch: ScratchBuffer::new(),
            policy: TrailingBytes::default(),
        }
    }

    /// Builder-style policy setter.
    pub fn with_policy(mut self, policy: TrailingBytes) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> TrailingBytes {
        self.policy
    }

    pub fn set_policy(&mut self, policy: TrailingBytes) {
        self.policy = policy;
    }

    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    /// Access to parameters and format setters.
    pub fn stream_mut(&mut self) -> &mut Stream {
        &mut self.stream
    }

    pub fn into_inner(self) -> Stream {
        self.stream
    }

    /// Decode `bytes` as interleaved frames and write them.
    ///
    /// # Errors
    ///
    /// `MalformedInput` when `bytes` ends in a partial frame and the policy
    /// is [`TrailingBytes::Reject`]; nothing is written in that case.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<WriteReport> {
        let format = self.stream.format();
        let frame_bytes = format.frame_bytes();
        let remainder = bytes.len() % frame_bytes;
        if remainder != 0 {
            match self.policy {
                TrailingBytes::Reject => {
                    return Err(Error::MalformedInput {
                        len: bytes.len(),
                        frame_bytes,
                        remainder,
                    });
                }
                TrailingBytes::Truncate => {
                    tracing::debug!(
                        "Dropping {} trailing bytes of a {}-byte write",
                        remainder,
                        bytes.len()
                    );
                }
            }
        }

        let whole = &bytes[..bytes.len() - remainder];
        let samples = whole.len() / 2;
        let scratch = self.scratch.get(samples)?;
        decode_le(whole, scratch);
        self.stream.write(scratch)?;

        Ok(WriteReport {
            frames: samples / format.channels,
            trailing_bytes: remainder,
        })
    }

    /// Fill `out` with whole frames; returns bytes written.
    pub fn receive_bytes(&mut self, out: &mut [u8]) -> Result<usize> {
        let format = self.stream.output_format();
        let frames = out.len() / format.frame_bytes();
        if frames == 0 {
            return Ok(0);
        }
        let scratch = self.scratch.get(format.samples(frames))?;
        let read = self.stream.read(scratch);
        Ok(encode_le(&scratch[..format.samples(read)], out))
    }

    /// Bytes waiting to be received.
    pub fn available_bytes(&self) -> usize {
        self.stream.available_samples() * std::mem::size_of::<i16>()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stream.flush()?;
        Ok(())
    }
}

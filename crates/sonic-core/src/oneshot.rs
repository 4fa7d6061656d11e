//! Whole-buffer processing.

use crate::error::Result;
use crate::format::StreamFormat;
use crate::params::StreamParams;
use crate::stream::Stream;

/// Process a complete clip in one call: write, flush, read everything.
///
/// `samples` must hold whole frames of `format`.
///
/// # Example
///
/// ```
/// use sonic_core::{change_speed, StreamFormat, StreamParams};
///
/// let clip = vec![0i16; 4410];
/// let format = StreamFormat::mono(44100)?;
/// let faster = change_speed(&clip, format, StreamParams::new().speed(2.0))?;
/// assert!(faster.len() < clip.len());
/// # Ok::<(), sonic_core::Error>(())
/// ```
pub fn change_speed(
    samples: &[i16],
    format: StreamFormat,
    params: StreamParams,
) -> Result<Vec<i16>> {
    let mut stream = Stream::with_params(format, params)?;
    stream.write(samples)?;
    stream.flush()?;
    Ok(stream.drain())
}

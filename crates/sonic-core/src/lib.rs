//! Streaming speed, pitch, rate and volume modification for interleaved
//! 16-bit PCM.
//!
//! Tuned for speech: the pitch-period search covers 65 - 400 Hz and whole
//! periods are skipped or repeated, so voices keep their timbre at up to
//! several times normal speed.
//!
//! # Features
//!
//! - **Speed**: pitch-synchronous overlap-add, zero latency at 1.0
//! - **Pitch**: stretch then resample, or the overlap-add "chord" mode
//! - **Rate**: linear-interpolation resampling (speed and pitch together)
//! - **Volume**: saturating fixed-point gain
//! - **Formats**: i16, f32 and unsigned 8-bit I/O, any channel count
//!
//! # Example
//!
//! ```
//! use sonic_core::{Stream, StreamFormat, StreamParams};
//!
//! let format = StreamFormat::stereo(44100)?;
//! let mut stream = Stream::with_params(format, StreamParams::new().speed(1.5))?;
//!
//! let block = vec![0i16; 2048];
//! let mut out = vec![0i16; 4096];
//! stream.write(&block)?;
//! let frames = stream.read(&mut out);
//! assert!(frames <= 1024);
//!
//! stream.flush()?;
//! # Ok::<(), sonic_core::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

mod format;
mod params;
pub use format::{PeriodWindow, StreamFormat, AMDF_FREQ, MAX_PITCH_HZ, MIN_PITCH_HZ};
pub use params::StreamParams;

mod stream;
pub use stream::Stream;

mod oneshot;
pub use oneshot::change_speed;

pub mod buffer;
pub mod convert;
pub use buffer::SampleBuffer;

// Processing stages
mod chord;
mod egress;
mod gain;
mod overlap;
mod pitch;
mod resample;
mod stretch;

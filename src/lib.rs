//! # Sonic - Streaming Speech Speed Engine
//!
//! Speed, pitch, rate and volume modification for interleaved 16-bit PCM,
//! tuned for speech, plus a byte-level boundary for host bindings.
//!
//! ## Architecture
//!
//! Sonic is an umbrella crate that coordinates:
//! - **sonic-core** - The stream: period search, overlap-add, resampling, gain
//! - **sonic-bridge** - Byte I/O, trailing-byte policy, handle registry
//!
//! ## Quick Start
//!
//! ```
//! use sonic::prelude::*;
//!
//! let mut stream = StreamBuilder::new()
//!     .sample_rate(16000)
//!     .speed(2.0)
//!     .build()?;
//!
//! stream.write(&vec![0i16; 16000])?;
//! stream.flush()?;
//! assert_eq!(stream.drain().len(), 8000);
//! # Ok::<(), sonic::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Engine plus boundary layer
//! - `bridge` - Byte streams and handle registry
//! - `serialization` - serde support for formats and parameters

/// Re-export of sonic-core for direct access
pub use sonic_core as core;

// Core types
pub use sonic_core::{change_speed, SampleBuffer, Stream, StreamFormat, StreamParams};

// Boundary layer
#[cfg(feature = "bridge")]
pub use sonic_bridge as bridge;

#[cfg(feature = "bridge")]
pub use sonic_bridge::{ByteStream, HandleRegistry, StreamHandle, TrailingBytes, WriteReport};

mod builder;
pub mod error;

pub use builder::StreamBuilder;
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Stream, StreamBuilder, StreamFormat, StreamParams};

    #[cfg(feature = "bridge")]
    pub use crate::{ByteStream, HandleRegistry, StreamHandle, TrailingBytes};
}

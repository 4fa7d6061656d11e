//! Byte-oriented boundary for host bindings.
//!
//! Wraps [`sonic_core::Stream`] with the operations a foreign-language
//! binding needs: little-endian byte I/O with a reusable conversion buffer,
//! an explicit policy for writes that end in a partial frame, and a registry
//! that hands out checked integer handles instead of pointers.
//!
//! # Example
//!
//! ```
//! use sonic_bridge::HandleRegistry;
//!
//! let registry = HandleRegistry::new();
//! let handle = registry.create(22050, 1)?;
//!
//! registry.with(handle, |stream| {
//!     stream.stream_mut().set_speed(1.5);
//!     stream.put_bytes(&[0u8; 4410])
//! })??;
//!
//! registry.destroy(handle)?;
//! assert!(registry.destroy(handle).is_err());
//! # Ok::<(), sonic_bridge::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

mod byte_stream;
mod policy;
mod registry;
mod scratch;

pub use byte_stream::ByteStream;
pub use policy::{TrailingBytes, WriteReport};
pub use registry::{HandleRegistry, StreamHandle};
pub use scratch::ScratchBuffer;

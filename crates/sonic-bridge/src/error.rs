//! Error types.

use thiserror::Error;

use crate::registry::StreamHandle;

/// Error type for the byte-level boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input bytes do not form a whole number of frames.
    #[error("Malformed input: {len} bytes is not a multiple of the {frame_bytes}-byte frame ({remainder} left over)")]
    MalformedInput {
        len: usize,
        frame_bytes: usize,
        remainder: usize,
    },

    /// Error from the underlying stream.
    #[error(transparent)]
    Stream(#[from] sonic_core::Error),

    /// Handle was never issued or has been destroyed.
    #[error("Unknown stream handle: {0}")]
    UnknownHandle(StreamHandle),

    /// Every handle id has been issued.
    #[error("Stream handles exhausted")]
    HandlesExhausted,
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

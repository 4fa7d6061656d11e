//! Error types for sonic-core.

use thiserror::Error;

/// Error type for stream operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A buffer could not grow to hold `requested` more samples.
    #[error("Out of memory: could not reserve {requested} samples")]
    OutOfMemory { requested: usize },
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }

    /// True if the stream is still usable after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::OutOfMemory { .. })
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

//! What to do with bytes that do not complete a frame.

/// Handling of a byte count that is not a multiple of the frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingBytes {
    /// Fail with `MalformedInput` and write nothing.
    #[default]
    Reject,
    /// Write the whole frames and drop the remainder.
    Truncate,
}

/// Outcome of a successful `put_bytes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteReport {
    /// Frames handed to the stream
    pub frames: usize,
    /// Bytes dropped under [`TrailingBytes::Truncate`]
    pub trailing_bytes: usize,
}

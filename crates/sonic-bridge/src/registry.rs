//! Opaque handles for streams owned on the host's behalf.
//!
//! A host binding cannot hold a Rust value, so it keeps a [`StreamHandle`]
//! (convertible to and from a plain `u64`) and every call is checked against
//! the registry. Use after destroy and double destroy become
//! [`Error::UnknownHandle`] instead of undefined behaviour.
//!
//! Streams live in a `DashMap` keyed by handle, each behind its own mutex, so
//! different handles can be driven from different threads at once while
//! calls on one handle are serialised.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::byte_stream::ByteStream;
use crate::error::{Error, Result};

/// Identifier of a registered stream. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamHandle(NonZeroU64);

impl StreamHandle {
    pub fn as_raw(self) -> u64 {
        self.0.get()
    }

    /// `None` for 0, which is never issued.
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }
}

impl fmt::Display for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Thread-safe table of live byte streams.
pub struct HandleRegistry {
    streams: DashMap<StreamHandle, Mutex<ByteStream>>,
    next_id: AtomicU64,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self {
            streams: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a stream and return its handle.
    pub fn create(&self, sample_rate: u32, channels: usize) -> Result<StreamHandle> {
        let stream = ByteStream::new(sample_rate, channels)?;
        self.insert(stream)
    }

    /// Take ownership of an already configured stream.
    ///
    /// # Errors
    ///
    /// `HandlesExhausted` once every id has been issued; the stream is dropped.
    pub fn insert(&self, stream: ByteStream) -> Result<StreamHandle> {
        let handle = self.next_handle()?;
        self.streams.insert(handle, Mutex::new(stream));
        tracing::debug!("Registered stream {}", handle);
        Ok(handle)
    }

    /// Issue the next id. Ids are never reused, so the counter stops at `u64::MAX`.
    fn next_handle(&self) -> Result<StreamHandle> {
        self.next_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| id.checked_add(1))
            .ok()
            .and_then(NonZeroU64::new)
            .map(StreamHandle)
            .ok_or(Error::HandlesExhausted)
    }

    /// Drop the stream behind `handle`.
    pub fn destroy(&self, handle: StreamHandle) -> Result<()> {
        match self.streams.remove(&handle) {
            Some(_) => {
                tracing::debug!("Destroyed stream {}", handle);
                Ok(())
            }
            None => Err(Error::UnknownHandle(handle)),
        }
    }

    /// Run `f` with exclusive access to the stream behind `handle`.
    ///
    /// `f` must not create or destroy handles on the same registry.
    pub fn with<R>(&self, handle: StreamHandle, f: impl FnOnce(&mut ByteStream) -> R) -> Result<R> {
        let entry = self
            .streams
            .get(&handle)
            .ok_or(Error::UnknownHandle(handle))?;
        let mut stream = entry.lock();
        Ok(f(&mut *stream))
    }

    pub fn contains(&self, handle: StreamHandle) -> bool {
        self.streams.contains_key(&handle)
    }

    /// Number of live streams.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("streams", &self.streams.len())
            .finish()
    }
}

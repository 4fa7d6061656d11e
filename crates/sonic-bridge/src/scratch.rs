//! Reusable conversion buffer between host bytes and engine samples.

use sonic_core::Error;

/// Sample scratch space that doubles when too small and never shrinks.
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    samples: Vec<i16>,
}

impl ScratchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Borrow at least `len` samples, growing to `max(len, 2 * capacity)` if needed.
    pub fn get(&mut self, len: usize) -> Result<&mut [i16], Error> {
        let current = self.samples.len();
        if len > current {
            let target = len.max(current.saturating_mul(2));
            self.samples
                .try_reserve_exact(target - current)
                .map_err(|_| Error::OutOfMemory { requested: target })?;
            self.samples.resize(target, 0);
            tracing::trace!("Scratch buffer grown to {} samples", target);
        }
        Ok(&mut self.samples[..len])
    }
}

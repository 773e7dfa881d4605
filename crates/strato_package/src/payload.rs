//! Executable payload mapping.
//!
//! The payload is copied out of the container into an anonymous memory
//! mapping sized exactly to the payload, then sealed read-only. The
//! mapping lives as long as the handle and is released exactly once, on
//! drop or explicit [`PayloadMapping::unload`].

use memmap2::{Mmap, MmapMut};
use tracing::debug;

use crate::error::{LoadError, LoadResult};

/// A read-only anonymous mapping holding the executable payload.
pub struct PayloadMapping {
    /// The sealed mapping. `None` after an explicit unload.
    map: Option<Mmap>,
    /// Payload size in bytes, kept for statistics after unload.
    len: usize,
}

impl PayloadMapping {
    /// Maps `bytes` into a fresh anonymous mapping sized exactly to the
    /// payload and seals it read-only.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::AllocationFailed`] when the mapping cannot
    /// be created or sealed. The caller treats this as fatal to the
    /// load, not to the process.
    pub fn from_bytes(bytes: &[u8]) -> LoadResult<Self> {
        let mut map = MmapMut::map_anon(bytes.len()).map_err(|source| {
            LoadError::AllocationFailed {
                size: bytes.len(),
                source,
            }
        })?;
        map.copy_from_slice(bytes);
        let map = map
            .make_read_only()
            .map_err(|source| LoadError::AllocationFailed {
                size: bytes.len(),
                source,
            })?;

        debug!(size = bytes.len(), "payload mapped");
        Ok(Self {
            map: Some(map),
            len: bytes.len(),
        })
    }

    /// The mapped payload bytes. Empty after an explicit unload.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    /// Payload size in bytes at map time.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the payload is zero-sized.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns whether the mapping is still live.
    #[inline]
    #[must_use]
    pub const fn is_mapped(&self) -> bool {
        self.map.is_some()
    }

    /// Releases the mapping now instead of at drop. Idempotent.
    pub fn unload(&mut self) {
        if self.map.take().is_some() {
            debug!(size = self.len, "payload unmapped");
        }
    }
}

impl std::fmt::Debug for PayloadMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadMapping")
            .field("len", &self.len)
            .field("mapped", &self.is_mapped())
            .finish()
    }
}

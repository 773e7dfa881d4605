//! Native method handle table.
//!
//! Registered native methods used to be raw pointers parsed out of a
//! wire-format string. Here they live in an arena of slots addressed by
//! `(index, generation)` handles: releasing a slot bumps its
//! generation, so a stale handle is detected instead of dereferencing a
//! dangling pointer.

use std::collections::BTreeMap;

use crate::error::{ApiError, ApiResult};

/// A validated reference into the native method table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NativeHandle {
    /// Slot index.
    index: u32,
    /// Generation the slot had when the handle was issued.
    generation: u32,
}

impl NativeHandle {
    /// Slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation carried by the handle.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "native:{}v{}", self.index, self.generation)
    }
}

/// One registered native method.
#[derive(Clone, Debug)]
pub struct NativeEntry {
    /// Method name, e.g. `os.SystemClock.currentTimeMillis`.
    pub name: String,
    /// Opaque symbol reference the execution engine resolves later.
    pub symbol: String,
}

/// An arena slot: entry plus generation counter.
#[derive(Debug, Default)]
struct Slot {
    /// Bumped on every release so stale handles fail validation.
    generation: u32,
    /// The live entry, `None` after release.
    entry: Option<NativeEntry>,
}

/// The native method arena.
#[derive(Debug, Default)]
pub struct NativeRegistry {
    /// Slot storage; indices are stable for the registry's lifetime.
    slots: Vec<Slot>,
    /// Released slot indices available for reuse.
    free: Vec<u32>,
    /// Name to current-handle index.
    by_name: BTreeMap<String, NativeHandle>,
}

impl NativeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a native method, replacing any previous registration
    /// under the same name. Returns the handle for the new entry.
    pub fn register(&mut self, name: impl Into<String>, symbol: impl Into<String>) -> NativeHandle {
        let name = name.into();
        if let Some(old) = self.by_name.remove(&name) {
            // Replacement releases the old slot; its handle goes stale.
            let _ = self.release(old);
        }

        let entry = NativeEntry {
            name: name.clone(),
            symbol: symbol.into(),
        };

        let index = if let Some(index) = self.free.pop() {
            self.slots[index as usize].entry = Some(entry);
            index
        } else {
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            // Registrations are bounded by the API surface; u32 does
            // not overflow in practice.
            #[allow(clippy::cast_possible_truncation)]
            let index = (self.slots.len() - 1) as u32;
            index
        };

        let handle = NativeHandle {
            index,
            generation: self.slots[index as usize].generation,
        };
        self.by_name.insert(name, handle);
        handle
    }

    /// Looks up the current handle for a registered name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<NativeHandle> {
        self.by_name.get(name).copied()
    }

    /// Resolves a handle to its entry, rejecting stale handles.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::StaleHandle`] when the slot was released or
    /// recycled since the handle was issued.
    pub fn resolve(&self, handle: NativeHandle) -> ApiResult<&NativeEntry> {
        let stale = || ApiError::StaleHandle {
            index: handle.index,
            generation: handle.generation,
        };
        let slot = self.slots.get(handle.index as usize).ok_or_else(stale)?;
        if slot.generation != handle.generation {
            return Err(stale());
        }
        slot.entry.as_ref().ok_or_else(stale)
    }

    /// Releases a handle's slot, bumping its generation.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::StaleHandle`] when the handle is already
    /// stale; releasing twice is an error, not a corruption.
    pub fn release(&mut self, handle: NativeHandle) -> ApiResult<()> {
        let stale = || ApiError::StaleHandle {
            index: handle.index,
            generation: handle.generation,
        };
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .ok_or_else(stale)?;
        if slot.generation != handle.generation || slot.entry.is_none() {
            return Err(stale());
        }

        if let Some(entry) = slot.entry.take() {
            self.by_name.remove(&entry.name);
        }
        slot.generation += 1;
        self.free.push(handle.index);
        Ok(())
    }

    /// Number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns whether no methods are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let mut registry = NativeRegistry::new();
        let handle = registry.register("os.Clock.now", "libos_clock_now");

        let entry = registry.resolve(handle).unwrap();
        assert_eq!(entry.name, "os.Clock.now");
        assert_eq!(entry.symbol, "libos_clock_now");
        assert_eq!(registry.lookup("os.Clock.now"), Some(handle));
    }

    #[test]
    fn test_release_detects_use_after_free() {
        let mut registry = NativeRegistry::new();
        let handle = registry.register("gfx.Canvas.create", "libgfx_canvas");
        registry.release(handle).unwrap();

        assert!(matches!(
            registry.resolve(handle),
            Err(ApiError::StaleHandle { .. })
        ));
        assert!(matches!(
            registry.release(handle),
            Err(ApiError::StaleHandle { .. })
        ));
        assert!(registry.lookup("gfx.Canvas.create").is_none());
    }

    #[test]
    fn test_recycled_slot_invalidates_old_handle() {
        let mut registry = NativeRegistry::new();
        let first = registry.register("a", "sym_a");
        registry.release(first).unwrap();

        // Reuses the freed slot with a bumped generation.
        let second = registry.register("b", "sym_b");
        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());

        assert!(registry.resolve(first).is_err());
        assert_eq!(registry.resolve(second).unwrap().name, "b");
    }

    #[test]
    fn test_reregistration_replaces_and_stales_old_handle() {
        let mut registry = NativeRegistry::new();
        let first = registry.register("os.Clock.now", "old_sym");
        let second = registry.register("os.Clock.now", "new_sym");

        assert!(registry.resolve(first).is_err());
        assert_eq!(registry.resolve(second).unwrap().symbol, "new_sym");
        assert_eq!(registry.len(), 1);
    }
}

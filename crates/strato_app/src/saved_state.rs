//! Saved instance state.
//!
//! A detached snapshot of opaque key/value pairs plus the finishing and
//! focus flags. It has no ownership relation to the activity that
//! produced it; a fresh activity can consume it to restore equivalent
//! flags.

use std::collections::BTreeMap;
use std::time::SystemTime;

/// A detached snapshot of an activity's restorable state.
#[derive(Clone, Debug)]
pub struct SavedState {
    /// Opaque key/value pairs, keys unique.
    values: BTreeMap<String, String>,
    /// Whether the producing activity was finishing.
    is_finishing: bool,
    /// Whether the producing activity held window focus.
    has_focus: bool,
    /// When the snapshot was taken.
    taken_at: SystemTime,
}

impl SavedState {
    /// Creates a snapshot with the given flags and no values.
    #[must_use]
    pub fn new(is_finishing: bool, has_focus: bool) -> Self {
        Self {
            values: BTreeMap::new(),
            is_finishing,
            has_focus,
            taken_at: SystemTime::now(),
        }
    }

    /// Stores a key/value pair, replacing any previous value.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Looks up a stored value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of stored key/value pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the producing activity was finishing.
    #[inline]
    #[must_use]
    pub const fn is_finishing(&self) -> bool {
        self.is_finishing
    }

    /// Whether the producing activity held window focus.
    #[inline]
    #[must_use]
    pub const fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// When the snapshot was taken.
    #[inline]
    #[must_use]
    pub const fn taken_at(&self) -> SystemTime {
        self.taken_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_roundtrip() {
        let mut state = SavedState::new(false, true);
        state.put("score", "42");
        state.put("score", "43");
        assert_eq!(state.get("score"), Some("43"));
        assert_eq!(state.len(), 1);
        assert!(state.has_focus());
        assert!(!state.is_finishing());
    }

    #[test]
    fn test_missing_key_is_none() {
        let state = SavedState::new(true, false);
        assert!(state.is_empty());
        assert_eq!(state.get("anything"), None);
    }
}

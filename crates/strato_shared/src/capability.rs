//! Capability names and the fixed allow-list.
//!
//! A capability is a named permission string declared by a package and
//! checked at call time. The runtime grants a capability only when it
//! is BOTH declared in the package manifest AND present on the fixed
//! allow-list below. There is no persisted grant/revocation store; this
//! is a policy stub, not a permission engine.

/// Network access.
pub const CAP_INTERNET: &str = "strato.capability.INTERNET";

/// Read access to external storage.
pub const CAP_READ_STORAGE: &str = "strato.capability.READ_STORAGE";

/// Write access to external storage.
pub const CAP_WRITE_STORAGE: &str = "strato.capability.WRITE_STORAGE";

/// The fixed allow-list. Everything not listed here is denied at check
/// time, even when the package declares it.
pub const ALLOW_LIST: &[&str] = &[CAP_INTERNET, CAP_READ_STORAGE, CAP_WRITE_STORAGE];

/// Returns whether `name` is on the fixed allow-list.
#[inline]
#[must_use]
pub fn is_allow_listed(name: &str) -> bool {
    ALLOW_LIST.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_members() {
        assert!(is_allow_listed(CAP_INTERNET));
        assert!(is_allow_listed(CAP_READ_STORAGE));
        assert!(is_allow_listed(CAP_WRITE_STORAGE));
    }

    #[test]
    fn test_unknown_capability_denied() {
        assert!(!is_allow_listed("strato.capability.CAMERA"));
        assert!(!is_allow_listed(""));
    }
}

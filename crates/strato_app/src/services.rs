//! System service registry.
//!
//! A fixed mapping of service names to opaque handles, populated when
//! the activity is created and cleared when it is destroyed. Unknown
//! names return `None` rather than failing.

use std::collections::BTreeMap;

/// Window service name.
pub const WINDOW_SERVICE: &str = "window";

/// Layout inflater service name.
pub const LAYOUT_INFLATER_SERVICE: &str = "layout_inflater";

/// Activity manager service name.
pub const ACTIVITY_SERVICE: &str = "activity";

/// Input method service name.
pub const INPUT_METHOD_SERVICE: &str = "input_method";

/// Location service name.
pub const LOCATION_SERVICE: &str = "location";

/// The fixed set of services the registry knows about.
const KNOWN_SERVICES: &[&str] = &[
    WINDOW_SERVICE,
    LAYOUT_INFLATER_SERVICE,
    ACTIVITY_SERVICE,
    INPUT_METHOD_SERVICE,
    LOCATION_SERVICE,
];

/// Opaque handle to a system service.
///
/// Handles are plain indices into the fixed service set; they carry no
/// pointer and cannot dangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ServiceHandle(u16);

impl ServiceHandle {
    /// The raw index of the handle.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u16 {
        self.0
    }
}

/// The per-activity service registry.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    /// Name to handle mapping. Empty outside create..destroy.
    services: BTreeMap<&'static str, ServiceHandle>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates the fixed service set. Called at activity create.
    pub fn populate(&mut self) {
        self.services = KNOWN_SERVICES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                // Fixed set of five services; the cast cannot truncate.
                #[allow(clippy::cast_possible_truncation)]
                let handle = ServiceHandle(i as u16);
                (*name, handle)
            })
            .collect();
    }

    /// Clears all services. Called at activity destroy.
    pub fn clear(&mut self) {
        self.services.clear();
    }

    /// Looks up a service by name. Unknown names yield `None`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ServiceHandle> {
        self.services.get(name).copied()
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

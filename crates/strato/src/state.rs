//! The coordinator's execution state machine.

use std::fmt;

/// Where the coordinator is in its lifecycle.
///
/// ```text
/// NotStarted ──load──> Loading ──ok──> Stopped ──start──> Running
///                         │                                │  ▲
///                         └──fail──> Error            pause│  │resume
///                                      │                   ▼  │
///                                      └──load──┐        Paused
///            Stopped/Error <──stop── (any) <────┘
/// ```
///
/// `Stopped` doubles as "loaded, not running" and "shut down"; a loaded
/// package is what distinguishes the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionState {
    /// Nothing loaded yet.
    NotStarted,
    /// A package load is in progress.
    Loading,
    /// The app is executing.
    Running,
    /// The app is paused and can resume.
    Paused,
    /// Loaded but not executing, or shut down.
    Stopped,
    /// A load or start failed; the message is in `last_error`.
    Error,
}

impl ExecutionState {
    /// Whether a package load may begin from this state.
    #[must_use]
    pub const fn can_load(self) -> bool {
        matches!(self, Self::NotStarted | Self::Stopped | Self::Error)
    }

    /// Whether execution may start from this state.
    #[must_use]
    pub const fn can_start(self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Whether the coordinator holds a live app in this state.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "NotStarted",
            Self::Loading => "Loading",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
            Self::Error => "Error",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_allowed_from_fresh_stopped_and_error() {
        assert!(ExecutionState::NotStarted.can_load());
        assert!(ExecutionState::Stopped.can_load());
        assert!(ExecutionState::Error.can_load());
        assert!(!ExecutionState::Running.can_load());
        assert!(!ExecutionState::Paused.can_load());
        assert!(!ExecutionState::Loading.can_load());
    }

    #[test]
    fn test_start_only_from_stopped() {
        assert!(ExecutionState::Stopped.can_start());
        assert!(!ExecutionState::NotStarted.can_start());
        assert!(!ExecutionState::Error.can_start());
    }
}

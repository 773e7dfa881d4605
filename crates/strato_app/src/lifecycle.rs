//! Activity lifecycle state machine.
//!
//! ## Phase graph
//!
//! ```text
//!   Created ──> Started ──> Resumed
//!                              │
//!                  ┌───────────┘
//!                  ▼
//!               Paused ──> Stopped ──> Destroyed
//!                  │
//!                  └──> Resumed   (the only backward edge)
//! ```
//!
//! Every transition method checks its required source phase first and
//! returns silently when unmet: no side effect, no log entry, no hook
//! call. This mirrors the platform's idempotent callback contract and
//! is what lets the coordinator call `resume()` every tick.
//!
//! The guard logic lives in [`Activity`], which is not overridable.
//! Specializations implement [`ActivityHooks`]; hooks run strictly
//! after the phase change is committed, so a panicking hook cannot
//! leave the machine mid-transition.

use std::time::SystemTime;

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, info};

use crate::saved_state::SavedState;
use crate::services::{ServiceHandle, ServiceRegistry};

/// One discrete stage of a running component's life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecyclePhase {
    /// The component exists and `on_create` ran.
    Created,
    /// Visible but not in the foreground.
    Started,
    /// In the foreground, receiving input.
    Resumed,
    /// Lost the foreground but still visible.
    Paused,
    /// No longer visible.
    Stopped,
    /// Torn down; terminal.
    Destroyed,
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Created => "Created",
            Self::Started => "Started",
            Self::Resumed => "Resumed",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
            Self::Destroyed => "Destroyed",
        };
        f.write_str(name)
    }
}

/// An immutable record of one committed transition.
#[derive(Clone, Debug)]
pub struct TransitionEntry {
    /// When the transition was committed.
    pub at: SystemTime,
    /// The phase that was entered.
    pub phase: LifecyclePhase,
    /// Optional free-form detail.
    pub detail: Option<String>,
}

/// A lifecycle transition notification delivered to observers.
#[derive(Clone, Debug)]
pub struct LifecycleEvent {
    /// Name of the activity that transitioned.
    pub activity: String,
    /// The phase that was entered.
    pub phase: LifecyclePhase,
}

/// Overridable lifecycle callbacks.
///
/// Default implementations do nothing; the phase bookkeeping happens in
/// [`Activity`] regardless of what a specialization does here.
#[allow(unused_variables)]
pub trait ActivityHooks: Send {
    /// Called once when the component is created.
    fn on_create(&mut self) {}
    /// Called when the component becomes visible.
    fn on_start(&mut self) {}
    /// Called when the component enters the foreground.
    fn on_resume(&mut self) {}
    /// Called when the component leaves the foreground.
    fn on_pause(&mut self) {}
    /// Called when the component is no longer visible.
    fn on_stop(&mut self) {}
    /// Called once when the component is torn down.
    fn on_destroy(&mut self) {}
    /// Called while producing a state snapshot; may add values.
    fn on_save_instance_state(&mut self, state: &mut SavedState) {}
    /// Called while consuming a state snapshot.
    fn on_restore_instance_state(&mut self, state: &SavedState) {}
    /// Called when window focus changes.
    fn on_window_focus_changed(&mut self, has_focus: bool) {}
}

/// The default specialization: phase and log updates only.
#[derive(Debug, Default)]
pub struct DefaultHooks;

impl ActivityHooks for DefaultHooks {}

/// The non-overridable lifecycle guard wrapper.
///
/// Owns the phase, the transition log, the finishing/focus flags and
/// the system-service registry. Specializations only see their hooks.
pub struct Activity {
    /// Component name, for logs and events.
    name: String,
    /// Current phase.
    phase: LifecyclePhase,
    /// Whether `create()` has committed. Distinguishes a fresh
    /// instance from one already in `Created`.
    created: bool,
    /// One-shot finishing flag.
    finishing: bool,
    /// Window focus flag.
    has_focus: bool,
    /// Append-only transition log.
    log: Vec<TransitionEntry>,
    /// System services, populated at create and cleared at destroy.
    services: ServiceRegistry,
    /// Observer feed. Sends never block; a full channel drops the
    /// event, not the transition.
    events: Option<Sender<LifecycleEvent>>,
    /// The overridable callbacks.
    hooks: Box<dyn ActivityHooks>,
}

impl Activity {
    /// Creates an activity in its pre-`create` state.
    #[must_use]
    pub fn new(name: impl Into<String>, hooks: Box<dyn ActivityHooks>) -> Self {
        Self {
            name: name.into(),
            phase: LifecyclePhase::Created,
            created: false,
            finishing: false,
            has_focus: false,
            log: Vec::new(),
            services: ServiceRegistry::new(),
            events: None,
            hooks,
        }
    }

    /// Creates an activity with the default hooks.
    #[must_use]
    pub fn with_default_hooks(name: impl Into<String>) -> Self {
        Self::new(name, Box::new(DefaultHooks))
    }

    /// Attaches an observer channel and returns its receiving end.
    /// Events are best-effort: a full channel drops them.
    pub fn subscribe(&mut self, capacity: usize) -> Receiver<LifecycleEvent> {
        let (tx, rx) = bounded(capacity);
        self.events = Some(tx);
        rx
    }

    /// Commits a transition: phase, log entry, trace, observer event.
    fn commit(&mut self, phase: LifecyclePhase, detail: Option<String>) {
        self.phase = phase;
        self.log.push(TransitionEntry {
            at: SystemTime::now(),
            phase,
            detail,
        });
        info!(activity = %self.name, %phase, "lifecycle transition");
        if let Some(events) = &self.events {
            // try_send: the producer must never block on observers.
            let _ = events.try_send(LifecycleEvent {
                activity: self.name.clone(),
                phase,
            });
        }
    }

    /// Drives the create transition. No-op unless the instance is
    /// fresh.
    pub fn create(&mut self) {
        if self.created || self.phase != LifecyclePhase::Created {
            debug!(activity = %self.name, phase = %self.phase, "create ignored");
            return;
        }
        self.created = true;
        self.services.populate();
        self.commit(LifecyclePhase::Created, None);
        self.hooks.on_create();
    }

    /// Drives `Created -> Started`.
    pub fn start(&mut self) {
        if !self.created || self.phase != LifecyclePhase::Created {
            debug!(activity = %self.name, phase = %self.phase, "start ignored");
            return;
        }
        self.commit(LifecyclePhase::Started, None);
        self.hooks.on_start();
    }

    /// Drives `Started -> Resumed` or the backward edge
    /// `Paused -> Resumed`.
    pub fn resume(&mut self) {
        if self.phase != LifecyclePhase::Started && self.phase != LifecyclePhase::Paused {
            debug!(activity = %self.name, phase = %self.phase, "resume ignored");
            return;
        }
        self.commit(LifecyclePhase::Resumed, None);
        self.hooks.on_resume();
    }

    /// Drives `Resumed -> Paused`.
    pub fn pause(&mut self) {
        if self.phase != LifecyclePhase::Resumed {
            debug!(activity = %self.name, phase = %self.phase, "pause ignored");
            return;
        }
        self.commit(LifecyclePhase::Paused, None);
        self.hooks.on_pause();
    }

    /// Drives `Paused -> Stopped`.
    pub fn stop(&mut self) {
        if self.phase != LifecyclePhase::Paused {
            debug!(activity = %self.name, phase = %self.phase, "stop ignored");
            return;
        }
        self.commit(LifecyclePhase::Stopped, None);
        self.hooks.on_stop();
    }

    /// Drives `Stopped -> Destroyed` and clears the service registry.
    pub fn destroy(&mut self) {
        if self.phase != LifecyclePhase::Stopped {
            debug!(activity = %self.name, phase = %self.phase, "destroy ignored");
            return;
        }
        self.services.clear();
        self.commit(LifecyclePhase::Destroyed, None);
        self.hooks.on_destroy();
    }

    /// Sets the one-shot finishing flag and synchronously drives the
    /// remaining shutdown transitions. Calling this more than once has
    /// no additional effect.
    ///
    /// The teardown runs through the guarded transitions, so it only
    /// completes from `Resumed`, `Paused` or `Stopped`. From `Created`
    /// or `Started` the flag is set but the phase stays where it is;
    /// there is no skip-ahead path to `Destroyed`.
    pub fn finish(&mut self) {
        if self.finishing {
            return;
        }
        self.finishing = true;
        info!(activity = %self.name, "finishing");
        self.pause();
        self.stop();
        self.destroy();
    }

    /// Produces a detached state snapshot.
    pub fn save_instance_state(&mut self) -> SavedState {
        let mut state = SavedState::new(self.finishing, self.has_focus);
        self.hooks.on_save_instance_state(&mut state);
        debug!(activity = %self.name, values = state.len(), "instance state saved");
        state
    }

    /// Restores the focus flag from a snapshot and notifies the hooks.
    pub fn restore_instance_state(&mut self, state: &SavedState) {
        self.has_focus = state.has_focus();
        self.hooks.on_restore_instance_state(state);
        debug!(activity = %self.name, "instance state restored");
    }

    /// Updates the window focus flag and notifies the hooks.
    pub fn window_focus_changed(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
        self.hooks.on_window_focus_changed(has_focus);
    }

    /// Looks up a system service. Unknown names yield `None`; outside
    /// create..destroy the registry is empty.
    #[must_use]
    pub fn system_service(&self, name: &str) -> Option<ServiceHandle> {
        self.services.get(name)
    }

    /// Component name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current phase.
    #[inline]
    #[must_use]
    pub const fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Whether `finish()` has been requested.
    #[inline]
    #[must_use]
    pub const fn is_finishing(&self) -> bool {
        self.finishing
    }

    /// Whether the activity holds window focus.
    #[inline]
    #[must_use]
    pub const fn has_window_focus(&self) -> bool {
        self.has_focus
    }

    /// Whether the activity reached its terminal phase.
    #[inline]
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.phase == LifecyclePhase::Destroyed
    }

    /// The append-only transition log.
    #[inline]
    #[must_use]
    pub fn log(&self) -> &[TransitionEntry] {
        &self.log
    }
}

impl std::fmt::Debug for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Activity")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("finishing", &self.finishing)
            .field("log_entries", &self.log.len())
            .finish_non_exhaustive()
    }
}

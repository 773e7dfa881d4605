//! The execution-engine seam.
//!
//! Resolving a component name into executable code is the one piece of
//! the runtime that needs a real interpreter behind it. The coordinator
//! only ever talks to the [`ExecutionEngine`] trait; the bundled
//! [`StubEngine`] validates names, tracks resolutions and accepts
//! native-method registrations without executing anything.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Components every engine resolves without consulting a package.
pub const CORE_COMPONENTS: &[&str] = &[
    "strato.app.Activity",
    "strato.os.Handler",
    "strato.view.Surface",
];

/// Entry methods an engine must be able to locate on a component.
pub const LIFECYCLE_METHODS: &[&str] = &[
    "onCreate",
    "onStart",
    "onResume",
    "onPause",
    "onStop",
    "onDestroy",
];

/// What the coordinator needs from an interpreter.
pub trait ExecutionEngine: Send {
    /// Resolves a fully-qualified component name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ClassNotFound`] when the component cannot
    /// be resolved.
    fn resolve_component(&mut self, name: &str) -> EngineResult<()>;

    /// Locates an entry method on a previously resolved component.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ClassNotFound`] for an unresolved
    /// component and [`EngineError::MethodNotFound`] for a missing
    /// method.
    fn resolve_method(&self, component: &str, method: &str) -> EngineResult<()>;

    /// Registers a native method binding for `component`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ClassNotFound`] for an unresolved
    /// component.
    fn register_native(&mut self, component: &str, method: &str, symbol: &str) -> EngineResult<()>;
}

/// Whether `name` is shaped like a fully-qualified component name:
/// dot-separated identifier segments, at least one dot.
fn is_well_formed(name: &str) -> bool {
    let mut segments = 0usize;
    for segment in name.split('.') {
        let mut chars = segment.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        if !(first.is_ascii_alphabetic() || first == '_') {
            return false;
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
            return false;
        }
        segments += 1;
    }
    segments >= 2
}

/// Name-validating engine with no interpreter behind it.
#[derive(Debug)]
pub struct StubEngine {
    /// Components resolved so far, core preloads included.
    resolved: BTreeSet<String>,
    /// Native bindings keyed by `component.method`.
    natives: BTreeMap<String, String>,
}

impl StubEngine {
    /// Creates an engine with the core components preloaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolved: CORE_COMPONENTS.iter().map(|&c| c.to_owned()).collect(),
            natives: BTreeMap::new(),
        }
    }

    /// Whether `name` has been resolved.
    #[must_use]
    pub fn is_resolved(&self, name: &str) -> bool {
        self.resolved.contains(name)
    }

    /// Number of resolved components, core preloads included.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    /// Number of registered native bindings.
    #[must_use]
    pub fn native_count(&self) -> usize {
        self.natives.len()
    }
}

impl Default for StubEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionEngine for StubEngine {
    fn resolve_component(&mut self, name: &str) -> EngineResult<()> {
        if !is_well_formed(name) {
            return Err(EngineError::ClassNotFound(name.to_owned()));
        }
        if self.resolved.insert(name.to_owned()) {
            debug!(component = name, "component resolved");
        }
        Ok(())
    }

    fn resolve_method(&self, component: &str, method: &str) -> EngineResult<()> {
        if !self.resolved.contains(component) {
            return Err(EngineError::ClassNotFound(component.to_owned()));
        }
        if LIFECYCLE_METHODS.contains(&method) || self.natives.contains_key(&binding_key(component, method)) {
            return Ok(());
        }
        Err(EngineError::MethodNotFound {
            component: component.to_owned(),
            method: method.to_owned(),
        })
    }

    fn register_native(&mut self, component: &str, method: &str, symbol: &str) -> EngineResult<()> {
        if !self.resolved.contains(component) {
            return Err(EngineError::ClassNotFound(component.to_owned()));
        }
        self.natives
            .insert(binding_key(component, method), symbol.to_owned());
        Ok(())
    }
}

fn binding_key(component: &str, method: &str) -> String {
    format!("{component}.{method}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_components_preloaded() {
        let engine = StubEngine::new();
        assert_eq!(engine.resolved_count(), CORE_COMPONENTS.len());
        assert!(engine.is_resolved("strato.app.Activity"));
    }

    #[test]
    fn test_well_formed_name_resolves() {
        let mut engine = StubEngine::new();
        engine.resolve_component("com.example.MainActivity").unwrap();
        assert!(engine.is_resolved("com.example.MainActivity"));
    }

    #[test]
    fn test_malformed_names_rejected() {
        let mut engine = StubEngine::new();
        for name in ["", "NoPackage", "com..Main", "com.1bad.Main", "com.example.Ma in"] {
            assert!(
                matches!(
                    engine.resolve_component(name),
                    Err(EngineError::ClassNotFound(_))
                ),
                "accepted {name:?}"
            );
        }
    }

    #[test]
    fn test_lifecycle_methods_resolve_on_resolved_component() {
        let mut engine = StubEngine::new();
        engine.resolve_component("com.example.MainActivity").unwrap();
        engine
            .resolve_method("com.example.MainActivity", "onCreate")
            .unwrap();
    }

    #[test]
    fn test_unknown_method_is_method_not_found() {
        let mut engine = StubEngine::new();
        engine.resolve_component("com.example.MainActivity").unwrap();
        assert!(matches!(
            engine.resolve_method("com.example.MainActivity", "onTeleport"),
            Err(EngineError::MethodNotFound { .. })
        ));
    }

    #[test]
    fn test_unresolved_component_is_class_not_found() {
        let engine = StubEngine::new();
        assert!(matches!(
            engine.resolve_method("com.example.Ghost", "onCreate"),
            Err(EngineError::ClassNotFound(_))
        ));
    }

    #[test]
    fn test_registered_native_becomes_resolvable() {
        let mut engine = StubEngine::new();
        engine.resolve_component("com.example.MainActivity").unwrap();
        engine
            .register_native("com.example.MainActivity", "nativeRender", "Java_render")
            .unwrap();
        engine
            .resolve_method("com.example.MainActivity", "nativeRender")
            .unwrap();
        assert_eq!(engine.native_count(), 1);
    }
}

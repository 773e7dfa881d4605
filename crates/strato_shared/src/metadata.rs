//! Immutable package metadata.
//!
//! Created exactly once by the package loader and never mutated after
//! that. Fields are private so no other unit can write them; the loader
//! goes through [`PackageMetadata::new`].

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::api_level::ApiLevel;

/// The immutable metadata snapshot for a loaded package.
#[derive(Clone, Debug)]
pub struct PackageMetadata {
    /// Package identifier, e.g. `com.example.app`.
    package_name: String,
    /// Human-readable version string.
    version_name: String,
    /// Monotonic version code.
    version_code: u32,
    /// Minimum platform level the package requires.
    min_sdk: ApiLevel,
    /// Platform level the package targets.
    target_sdk: ApiLevel,
    /// Capabilities the package declares.
    capabilities: Vec<String>,
    /// Fully-qualified name of the entry component.
    entry_component: String,
    /// Path the package was loaded from.
    source_path: PathBuf,
    /// When the package was loaded.
    loaded_at: SystemTime,
}

impl PackageMetadata {
    /// Creates a metadata snapshot. Only the package loader should call
    /// this; everyone else receives the finished value.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        package_name: String,
        version_name: String,
        version_code: u32,
        min_sdk: ApiLevel,
        target_sdk: ApiLevel,
        capabilities: Vec<String>,
        entry_component: String,
        source_path: PathBuf,
    ) -> Self {
        Self {
            package_name,
            version_name,
            version_code,
            min_sdk,
            target_sdk,
            capabilities,
            entry_component,
            source_path,
            loaded_at: SystemTime::now(),
        }
    }

    /// Package identifier.
    #[inline]
    #[must_use]
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Human-readable version string.
    #[inline]
    #[must_use]
    pub fn version_name(&self) -> &str {
        &self.version_name
    }

    /// Monotonic version code.
    #[inline]
    #[must_use]
    pub const fn version_code(&self) -> u32 {
        self.version_code
    }

    /// Minimum platform level the package requires.
    #[inline]
    #[must_use]
    pub const fn min_sdk(&self) -> ApiLevel {
        self.min_sdk
    }

    /// Platform level the package targets.
    #[inline]
    #[must_use]
    pub const fn target_sdk(&self) -> ApiLevel {
        self.target_sdk
    }

    /// Capabilities the package declares.
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    /// Returns whether the package declares `capability`.
    #[must_use]
    pub fn declares_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    /// Fully-qualified name of the entry component.
    #[inline]
    #[must_use]
    pub fn entry_component(&self) -> &str {
        &self.entry_component
    }

    /// Path the package was loaded from.
    #[inline]
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// When the package was loaded.
    #[inline]
    #[must_use]
    pub const fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }
}

//! Package loading.
//!
//! `load` is the whole public surface: validate the path, open the
//! container, parse the manifest, map the payload. The result is an
//! immutable metadata snapshot plus the payload handle; the loader
//! keeps no state of its own.

use std::path::Path;

use tracing::info;

use strato_shared::PackageMetadata;

use crate::container::{Container, TarContainer, MANIFEST_ENTRY, PAYLOAD_ENTRY};
use crate::error::{LoadError, LoadResult};
use crate::manifest::PackageManifest;
use crate::payload::PayloadMapping;

/// A fully loaded package: metadata snapshot plus mapped payload.
#[derive(Debug)]
pub struct LoadedPackage {
    /// The immutable metadata snapshot.
    metadata: PackageMetadata,
    /// The mapped executable payload.
    payload: PayloadMapping,
}

impl LoadedPackage {
    /// The immutable metadata snapshot.
    #[inline]
    #[must_use]
    pub const fn metadata(&self) -> &PackageMetadata {
        &self.metadata
    }

    /// The mapped executable payload.
    #[inline]
    #[must_use]
    pub const fn payload(&self) -> &PayloadMapping {
        &self.payload
    }

    /// Releases the payload mapping now instead of at drop.
    pub fn unload(&mut self) {
        self.payload.unload();
    }
}

/// Stateless package loader.
pub struct PackageLoader;

impl PackageLoader {
    /// Loads the package at `path` through the shipped tar container.
    ///
    /// # Errors
    ///
    /// See [`LoadError`] for the failure taxonomy. Every failure leaves
    /// the process alive; the coordinator maps it to its error state.
    pub fn load(path: &Path) -> LoadResult<LoadedPackage> {
        let container = TarContainer::open(path)?;
        Self::load_from(&container, path)
    }

    /// Loads a package from an already-opened container. `path` is only
    /// recorded in the metadata snapshot.
    ///
    /// # Errors
    ///
    /// See [`LoadError`].
    pub fn load_from<C: Container>(container: &C, path: &Path) -> LoadResult<LoadedPackage> {
        let mut buf = Vec::new();

        if !container.read(MANIFEST_ENTRY, &mut buf)? {
            return Err(LoadError::ManifestMissing);
        }
        let manifest = PackageManifest::parse(&buf)?;

        // Stat first so a missing payload is reported as such rather
        // than as an empty mapping.
        match container.stat(PAYLOAD_ENTRY)? {
            None | Some(0) => return Err(LoadError::PayloadMissing),
            Some(_) => {}
        }
        if !container.read(PAYLOAD_ENTRY, &mut buf)? {
            return Err(LoadError::PayloadMissing);
        }
        let payload = PayloadMapping::from_bytes(&buf)?;

        let metadata = manifest.into_metadata(path);
        info!(
            package = metadata.package_name(),
            version = metadata.version_name(),
            payload_bytes = payload.len(),
            "package loaded"
        );

        Ok(LoadedPackage { metadata, payload })
    }
}

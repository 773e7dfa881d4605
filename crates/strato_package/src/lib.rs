//! # STRATO Package Loader
//!
//! Validates and opens an application package, extracts its executable
//! payload into an anonymous memory mapping and parses the manifest
//! into an immutable [`strato_shared::PackageMetadata`] snapshot.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   stat/read    ┌──────────────┐
//! │ PackageLoader│ ─────────────> │  Container   │  (tar.gz on disk)
//! └──────┬───────┘                └──────────────┘
//!        │ produces
//!        ▼
//! ┌──────────────────────────────────────────────┐
//! │ LoadedPackage                                │
//! │   ├─ PackageMetadata  (immutable snapshot)   │
//! │   └─ PayloadMapping   (anonymous map, exact  │
//! │                        size, freed once)     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The container format is a collaborator, not a core concern: the only
//! contract is "open by path, stat a named entry, stream its bytes into
//! a caller-provided buffer".

pub mod container;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod payload;

pub use container::{Container, TarContainer, MANIFEST_ENTRY, PAYLOAD_ENTRY};
pub use error::LoadError;
pub use loader::{LoadedPackage, PackageLoader};
pub use manifest::PackageManifest;
pub use payload::PayloadMapping;

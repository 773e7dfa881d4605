//! # STRATO Shared Types
//!
//! Common vocabulary between the package loader, the app layer, the
//! renderer and the coordinator:
//!
//! - [`ApiLevel`] - the platform API levels a package may declare
//! - [`PackageMetadata`] - the immutable snapshot produced by the loader
//! - [`capability`] - capability name constants and the fixed allow-list
//!
//! This crate must stay dependency-light. If you need a lock, a thread
//! or an archive here, the type belongs in another unit.

pub mod api_level;
pub mod capability;
pub mod metadata;

pub use api_level::ApiLevel;
pub use metadata::PackageMetadata;

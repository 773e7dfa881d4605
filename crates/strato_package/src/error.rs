//! # Load Error Types
//!
//! All errors that can occur while loading a package.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a package.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The package path does not exist.
    #[error("package not found: {0}")]
    NotFound(PathBuf),

    /// The container could not be opened or read.
    #[error("container error: {message}")]
    Archive {
        /// What went wrong at the container level.
        message: String,
    },

    /// The container has no executable payload entry.
    #[error("executable payload missing from package")]
    PayloadMissing,

    /// The container has no manifest entry.
    #[error("manifest missing from package")]
    ManifestMissing,

    /// The manifest exists but cannot be parsed or fails validation.
    #[error("invalid manifest: {0}")]
    ManifestInvalid(String),

    /// The anonymous mapping for the payload could not be created.
    /// This is the only fatal load condition for the coordinator.
    #[error("failed to allocate {size} byte payload mapping: {source}")]
    AllocationFailed {
        /// Requested mapping size in bytes.
        size: usize,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Wraps a container-level I/O failure.
    #[must_use]
    pub fn archive(err: &dyn std::fmt::Display) -> Self {
        Self::Archive {
            message: err.to_string(),
        }
    }
}

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

//! # App Layer Error Types
//!
//! Failures from the dispatch layer and the native handle table.
//! Lifecycle transitions never fail - invalid transitions are no-ops.

use thiserror::Error;

/// Errors that can occur in the app layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// `initialize` was called on an already-initialized dispatcher.
    #[error("API already initialized")]
    AlreadyInitialized,

    /// An operation requires an initialized dispatcher.
    #[error("not initialized")]
    NotInitialized,

    /// A handler required a request parameter that was absent.
    #[error("missing request parameter: {0}")]
    MissingParam(String),

    /// A capability check failed.
    #[error("capability denied: {capability}")]
    PermissionDenied {
        /// The capability that was denied.
        capability: String,
    },

    /// A native handle referred to a released or recycled slot.
    #[error("stale native handle {index}v{generation}")]
    StaleHandle {
        /// Slot index of the offending handle.
        index: u32,
        /// Generation the handle carried.
        generation: u32,
    },
}

/// Result type for app layer operations.
pub type ApiResult<T> = Result<T, ApiError>;

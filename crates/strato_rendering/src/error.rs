//! # Graphics Error Types
//!
//! Failures from shader compilation, program linking and the backend.

use thiserror::Error;

/// Errors that can occur in the render pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// A shader stage failed to compile. Fatal to initialization.
    #[error("{stage} shader compilation failed: {log}")]
    ShaderCompile {
        /// Which stage failed ("vertex" or "fragment").
        stage: &'static str,
        /// The backend's compile log.
        log: String,
    },

    /// Program linking failed. Fatal to initialization.
    #[error("program linking failed: {log}")]
    ProgramLink {
        /// The backend's link log.
        log: String,
    },

    /// The GPU context was lost. Fatal to the render thread.
    #[error("GPU context lost")]
    ContextLost,

    /// A backend call failed for one command. The command is skipped.
    #[error("backend call failed: {0}")]
    Backend(String),
}

/// Result type for graphics operations.
pub type GraphicsResult<T> = Result<T, GraphicsError>;

//! # Coordinator Error Types
//!
//! [`EngineError`] covers the execution-engine seam; [`ExecutorError`]
//! is the coordinator's own taxonomy and wraps every subsystem error.
//! The coordinator is the final backstop: anything it cannot classify
//! becomes [`ExecutorError::Runtime`] with a human-readable message.

use thiserror::Error;

use strato_app::ApiError;
use strato_package::LoadError;
use strato_rendering::GraphicsError;

use crate::state::ExecutionState;

/// Failures from the execution-engine collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The named component could not be resolved.
    #[error("class not found: {0}")]
    ClassNotFound(String),

    /// The component exists but the entry method does not.
    #[error("method not found: {component}.{method}")]
    MethodNotFound {
        /// The resolved component.
        component: String,
        /// The missing method.
        method: String,
    },

    /// The engine failed for a reason other than resolution.
    #[error("engine runtime error: {0}")]
    Runtime(String),
}

/// Result type for execution-engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Top-level coordinator errors.
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// Package loading failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The execution engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The render pipeline failed.
    #[error(transparent)]
    Graphics(#[from] GraphicsError),

    /// The API dispatcher failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An operation was requested in a state that forbids it.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        /// The requested operation.
        operation: &'static str,
        /// The coordinator state at the time.
        state: ExecutionState,
    },

    /// Unclassified runtime failure.
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Result type for coordinator operations.
pub type ExecutorResult<T> = Result<T, ExecutorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_messages() {
        assert_eq!(
            EngineError::ClassNotFound("com.example.Main".to_owned()).to_string(),
            "class not found: com.example.Main"
        );
        assert_eq!(
            EngineError::MethodNotFound {
                component: "com.example.Main".to_owned(),
                method: "onCreate".to_owned(),
            }
            .to_string(),
            "method not found: com.example.Main.onCreate"
        );
    }

    #[test]
    fn test_invalid_state_message_names_operation_and_state() {
        let err = ExecutorError::InvalidState {
            operation: "start",
            state: ExecutionState::Running,
        };
        assert_eq!(err.to_string(), "cannot start while Running");
    }
}

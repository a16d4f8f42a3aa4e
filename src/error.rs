//! Error types for Cairn operations.
//!
//! This module defines [`CairnError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Structural errors (`DuplicateStepId`, `InvalidWorkflow`,
//!   `CircularDependency`) are returned to the caller and abort before any
//!   step executes
//! - Per-step failures are absorbed into the run's result sequence and never
//!   surface as `Err`
//! - Use `anyhow::Error` (via `CairnError::Other`) for unexpected errors in
//!   executor implementations

use thiserror::Error;

/// Core error type for Cairn operations.
#[derive(Debug, Error)]
pub enum CairnError {
    /// Two steps in a workflow share the same id.
    #[error("Duplicate step id: {id}")]
    DuplicateStepId { id: String },

    /// Invalid workflow structure or values.
    #[error("Invalid workflow: {message}")]
    InvalidWorkflow { message: String },

    /// Step dependency cycle detected.
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// Step execution failed.
    #[error("Step '{step}' failed: {message}")]
    StepExecutionError { step: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Cairn operations.
pub type Result<T> = std::result::Result<T, CairnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_step_id_displays_id() {
        let err = CairnError::DuplicateStepId {
            id: "migrate".into(),
        };
        assert!(err.to_string().contains("migrate"));
    }

    #[test]
    fn invalid_workflow_displays_message() {
        let err = CairnError::InvalidWorkflow {
            message: "step id must not be empty".into(),
        };
        assert!(err.to_string().contains("step id must not be empty"));
    }

    #[test]
    fn circular_dependency_displays_cycle() {
        let err = CairnError::CircularDependency {
            cycle: "a -> b -> a".into(),
        };
        assert!(err.to_string().contains("a -> b -> a"));
    }

    #[test]
    fn step_execution_error_displays_step_and_message() {
        let err = CairnError::StepExecutionError {
            step: "install_deps".into(),
            message: "npm not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("install_deps"));
        assert!(msg.contains("npm not found"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: CairnError = io_err.into();
        assert!(matches!(err, CairnError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(CairnError::InvalidWorkflow {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}

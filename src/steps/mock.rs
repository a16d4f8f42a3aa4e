//! Mock step executor for testing.
//!
//! `MockExecutor` implements the `StepExecutor` trait with pre-configured
//! per-step outcomes and captures the execution order for later assertion.
//!
//! # Example
//!
//! ```
//! use cairn::steps::{MockExecutor, StepExecutor};
//! use cairn::workflow::Step;
//!
//! let mut executor = MockExecutor::new();
//! executor.set_output("build", "compiled 14 crates");
//! executor.set_failure("deploy", "connection refused");
//!
//! let output = executor.execute(&Step::new("build")).unwrap();
//! assert_eq!(output.output.as_deref(), Some("compiled 14 crates"));
//! assert!(executor.execute(&Step::new("deploy")).is_err());
//! assert_eq!(executor.executed(), ["build", "deploy"]);
//! ```

use std::collections::HashMap;

use crate::error::{CairnError, Result};
use crate::workflow::Step;

use super::{StepExecutor, StepOutput};

#[derive(Debug, Clone)]
enum MockOutcome {
    Succeed(Option<String>),
    Fail(String),
}

/// Mock step executor for testing.
///
/// Steps succeed with no output unless configured otherwise.
#[derive(Debug, Default)]
pub struct MockExecutor {
    outcomes: HashMap<String, MockOutcome>,
    executed: Vec<String>,
}

impl MockExecutor {
    /// Create a new executor where every step succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a step to succeed with captured output.
    pub fn set_output(&mut self, id: &str, output: &str) {
        self.outcomes.insert(
            id.to_string(),
            MockOutcome::Succeed(Some(output.to_string())),
        );
    }

    /// Configure a step to fail with the given error message.
    pub fn set_failure(&mut self, id: &str, error: &str) {
        self.outcomes
            .insert(id.to_string(), MockOutcome::Fail(error.to_string()));
    }

    /// Ids of the steps that were executed, in order.
    pub fn executed(&self) -> &[String] {
        &self.executed
    }
}

impl StepExecutor for MockExecutor {
    fn execute(&mut self, step: &Step) -> Result<StepOutput> {
        self.executed.push(step.id.clone());

        match self.outcomes.get(&step.id) {
            Some(MockOutcome::Fail(error)) => Err(CairnError::StepExecutionError {
                step: step.id.clone(),
                message: error.clone(),
            }),
            Some(MockOutcome::Succeed(output)) => Ok(StepOutput {
                output: output.clone(),
            }),
            None => Ok(StepOutput::none()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_succeed_by_default() {
        let mut executor = MockExecutor::new();
        let output = executor.execute(&Step::new("anything")).unwrap();
        assert!(output.output.is_none());
    }

    #[test]
    fn configured_failure_returns_error() {
        let mut executor = MockExecutor::new();
        executor.set_failure("deploy", "connection refused");

        let err = executor.execute(&Step::new("deploy")).unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn records_execution_order() {
        let mut executor = MockExecutor::new();
        executor.execute(&Step::new("a")).unwrap();
        executor.execute(&Step::new("b")).unwrap();

        assert_eq!(executor.executed(), ["a", "b"]);
    }
}

//! Schema definitions for workflows and their steps.
//!
//! A [`Workflow`] is a named, ordered collection of [`Step`]s. Construction
//! validates the invariants a run relies on (unique, non-empty step ids), so
//! a `Workflow` value is always safe to hand to the runner. The dependency
//! relation is *not* required to be acyclic here; cycles are detected at run
//! start and reported as [`CairnError::CircularDependency`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{CairnError, Result};

/// A unit of work with an id and dependencies on other steps.
///
/// The `payload` is opaque to the engine: it is carried through to the step
/// executor untouched and never inspected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Step id, unique within a workflow.
    pub id: String,

    /// Ids of steps that must complete before this one may run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Opaque payload interpreted by the step executor.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl Step {
    /// Create a step with no dependencies and no payload.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            depends_on: Vec::new(),
            payload: Value::Null,
        }
    }

    /// Add a dependency on another step.
    pub fn depends_on(mut self, dep: impl Into<String>) -> Self {
        self.depends_on.push(dep.into());
        self
    }

    /// Attach an executor payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// A named, ordered collection of steps.
///
/// Fields are private so the unique-id invariant established by
/// [`Workflow::new`] cannot be broken after construction. `Workflow`
/// serializes for reporting; to deserialize a definition, parse a list of
/// [`Step`] values and pass them through [`Workflow::new`] so validation
/// still applies.
#[derive(Debug, Clone, Serialize)]
pub struct Workflow {
    name: String,
    steps: Vec<Step>,
}

impl Workflow {
    /// Create a workflow, validating step ids.
    ///
    /// Returns [`CairnError::DuplicateStepId`] if two steps share an id and
    /// [`CairnError::InvalidWorkflow`] if any id is empty.
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Result<Self> {
        let mut seen: HashSet<&str> = HashSet::new();
        for step in &steps {
            if step.id.is_empty() {
                return Err(CairnError::InvalidWorkflow {
                    message: "step id must not be empty".to_string(),
                });
            }
            if !seen.insert(step.id.as_str()) {
                return Err(CairnError::DuplicateStepId {
                    id: step.id.clone(),
                });
            }
        }

        Ok(Self {
            name: name.into(),
            steps,
        })
    }

    /// Create a new workflow builder.
    pub fn builder(name: impl Into<String>) -> WorkflowBuilder {
        WorkflowBuilder {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Workflow name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Steps in declared order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the workflow has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check if a step id exists in this workflow.
    pub fn contains(&self, id: &str) -> bool {
        self.steps.iter().any(|s| s.id == id)
    }

    /// Look up a step by id.
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }
}

/// Builder for constructing a [`Workflow`].
#[derive(Debug)]
pub struct WorkflowBuilder {
    name: String,
    steps: Vec<Step>,
}

impl WorkflowBuilder {
    /// Add a step.
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Build the workflow, validating step ids.
    pub fn build(self) -> Result<Workflow> {
        Workflow::new(self.name, self.steps)
    }
}

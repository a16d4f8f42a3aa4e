//! Step eligibility classification.
//!
//! The checker is a pure function over a step and the current run context:
//! it decides whether the step can execute now and, if not, why. The
//! classification is an explicit enum so downstream behavior never has to be
//! derived from reason text.

use std::fmt;

use crate::steps::StepStatus;
use crate::workflow::{Step, Workflow};

use super::workflow::RunContext;

/// Why a step cannot execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockClassification {
    /// A declared dependency does not exist in the workflow at all.
    ///
    /// This can never be resolved by further execution, so the step is
    /// surfaced as a visible failed result.
    MissingDependency,

    /// A dependency failed, or was itself blocked.
    ///
    /// The upstream failure is already visible, so the step cascades
    /// silently.
    FailedDependency,
}

impl fmt::Display for BlockClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockClassification::MissingDependency => write!(f, "missing dependency"),
            BlockClassification::FailedDependency => write!(f, "failed dependency"),
        }
    }
}

/// Outcome of checking one step's dependencies.
///
/// Transient: produced per check, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCheckResult {
    /// Whether every dependency is satisfied.
    pub can_execute: bool,

    /// Why the step is blocked, when it is.
    pub classification: Option<BlockClassification>,

    /// Human-readable blocking reason, when blocked.
    pub reason: Option<String>,

    /// Every dependency id that triggered the block: missing ids first,
    /// then failed/blocked ones, each in declared order.
    pub failed_dependencies: Vec<String>,
}

impl DependencyCheckResult {
    fn satisfied() -> Self {
        Self {
            can_execute: true,
            classification: None,
            reason: None,
            failed_dependencies: Vec::new(),
        }
    }
}

/// Classify whether a step can execute given the run so far.
///
/// A dependency is satisfied only by a recorded `Completed` result. A
/// dependency id not present in the workflow at all is missing; anything
/// else unsatisfied (failed, blocked, or not yet terminal) is a failed
/// dependency. When both kinds occur, the missing classification wins: it
/// is the structurally unresolvable one.
///
/// Pure function of its inputs; identical inputs give identical results.
pub fn check_step(step: &Step, workflow: &Workflow, ctx: &RunContext) -> DependencyCheckResult {
    let mut missing: Vec<String> = Vec::new();
    let mut failed: Vec<String> = Vec::new();

    for dep in &step.depends_on {
        if !workflow.contains(dep) {
            if !missing.contains(dep) {
                missing.push(dep.clone());
            }
            continue;
        }

        if ctx.is_blocked_or_failed(dep) {
            if !failed.contains(dep) {
                failed.push(dep.clone());
            }
            continue;
        }

        let completed = matches!(
            ctx.result_of(dep),
            Some(result) if result.status() == StepStatus::Completed
        );
        if !completed && !failed.contains(dep) {
            failed.push(dep.clone());
        }
    }

    if missing.is_empty() && failed.is_empty() {
        return DependencyCheckResult::satisfied();
    }

    let (classification, reason) = if missing.is_empty() {
        (
            BlockClassification::FailedDependency,
            format!("failed dependencies: {}", failed.join(", ")),
        )
    } else {
        (
            BlockClassification::MissingDependency,
            format!("missing dependencies: {}", missing.join(", ")),
        )
    };

    let mut implicated = missing;
    implicated.extend(failed);

    DependencyCheckResult {
        can_execute: false,
        classification: Some(classification),
        reason: Some(reason),
        failed_dependencies: implicated,
    }
}

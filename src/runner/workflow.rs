//! Workflow execution orchestration.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::steps::{StepExecutor, StepResult, StepStatus};
use crate::workflow::Workflow;

use super::checker::{check_step, BlockClassification};
use super::dependency::DependencyGraph;

/// Terminal status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Every declared step produced a visible, successful result.
    Completed,

    /// At least one step failed, was blocked, or was never reached.
    Failed,

    /// The run was cancelled between steps.
    Cancelled,
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Failed => "failed",
            WorkflowStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Cancellation handle for a run.
///
/// Polled between steps only: a running step always reaches its own
/// terminal outcome. Clone the token and call [`CancelToken::cancel`] from
/// another thread to stop the run at the next step boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a new, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation at the next step boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress events emitted during workflow execution.
///
/// Advisory only: observers must never affect control flow.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// A step is about to start.
    StepStarting {
        id: &'a str,
        index: usize,
        total: usize,
    },
    /// A step finished executing.
    StepFinished { id: &'a str, result: &'a StepResult },
    /// A step was blocked by its dependencies.
    StepBlocked {
        id: &'a str,
        classification: BlockClassification,
        dependencies: &'a [String],
    },
    /// The run reached its terminal status.
    RunFinished { status: WorkflowStatus },
}

/// Per-run execution state.
///
/// Holds the insertion-ordered result sequence, an id index for O(1)
/// dependency lookups, and the blocked/failed sets used to cascade blocking
/// to descendants. Created at run start and discarded at run end, so
/// concurrent runs of different workflows cannot interfere.
#[derive(Debug, Default)]
pub struct RunContext {
    results: Vec<StepResult>,
    index: HashMap<String, usize>,
    blocked: HashSet<String>,
    failed: HashSet<String>,
}

impl RunContext {
    /// Look up the recorded result for a step.
    pub fn result_of(&self, id: &str) -> Option<&StepResult> {
        self.index.get(id).map(|&i| &self.results[i])
    }

    /// Check whether a step was blocked or failed earlier in the run.
    pub fn is_blocked_or_failed(&self, id: &str) -> bool {
        self.blocked.contains(id) || self.failed.contains(id)
    }

    /// Recorded results so far, in insertion order.
    pub fn results(&self) -> &[StepResult] {
        &self.results
    }

    pub(crate) fn record(&mut self, result: StepResult) {
        self.index.insert(result.id.clone(), self.results.len());
        self.results.push(result);
    }

    pub(crate) fn mark_failed(&mut self, id: &str) {
        self.failed.insert(id.to_string());
    }

    pub(crate) fn mark_blocked(&mut self, id: &str) {
        self.blocked.insert(id.to_string());
        self.failed.insert(id.to_string());
    }

    fn into_results(self) -> Vec<StepResult> {
        self.results
    }
}

/// Result of running a workflow.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Workflow name.
    pub workflow: String,

    /// Results in insertion order: one per executed step, plus one
    /// synthesized entry per step blocked by a missing dependency.
    pub steps: Vec<StepResult>,

    /// Ids of steps blocked by upstream failures. These produced no result
    /// entry; they are listed here for observability only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocked: Vec<String>,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// Total duration.
    pub duration: Duration,

    /// Terminal status.
    pub status: WorkflowStatus,
}

impl RunReport {
    /// Look up the result for a step.
    pub fn result_for(&self, id: &str) -> Option<&StepResult> {
        self.steps.iter().find(|r| r.id == id)
    }

    /// Whether the run completed successfully.
    pub fn success(&self) -> bool {
        self.status == WorkflowStatus::Completed
    }
}

/// Orchestrates the execution of a workflow.
///
/// Steps run sequentially in a deterministic topological order (declared
/// order as tie-break), so every known dependency has reached a terminal
/// state before its dependents are checked. Per-step failures are absorbed
/// into the result sequence; only structural errors (a dependency cycle)
/// abort the run.
pub struct WorkflowRunner<'a> {
    workflow: &'a Workflow,
}

impl<'a> WorkflowRunner<'a> {
    /// Create a new workflow runner.
    pub fn new(workflow: &'a Workflow) -> Self {
        Self { workflow }
    }

    /// Run the workflow to completion.
    pub fn run(&self, executor: &mut dyn StepExecutor) -> Result<RunReport> {
        self.run_with_progress(executor, &CancelToken::new(), |_| {})
    }

    /// Run the workflow with a cancellation token and a progress callback.
    pub fn run_with_progress(
        &self,
        executor: &mut dyn StepExecutor,
        cancel: &CancelToken,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> Result<RunReport> {
        let start = Instant::now();
        let started_at = Utc::now();

        // A cycle is structural: abort before any step executes.
        let graph = DependencyGraph::new(self.workflow);
        let order = graph.execution_order()?;
        let total = order.len();

        let mut ctx = RunContext::default();
        let mut blocked_silent: Vec<String> = Vec::new();
        let mut cancelled = false;

        for (index, &step_index) in order.iter().enumerate() {
            if cancel.is_cancelled() {
                debug!(workflow = self.workflow.name(), "run cancelled between steps");
                cancelled = true;
                break;
            }

            let step = &self.workflow.steps()[step_index];
            let check = check_step(step, self.workflow, &ctx);

            if !check.can_execute {
                let classification = check
                    .classification
                    .unwrap_or(BlockClassification::FailedDependency);
                let reason = check.reason.unwrap_or_default();

                warn!(step = %step.id, %classification, reason = %reason, "step blocked");
                on_progress(RunProgress::StepBlocked {
                    id: &step.id,
                    classification,
                    dependencies: &check.failed_dependencies,
                });

                match classification {
                    BlockClassification::MissingDependency => {
                        // The definition itself is broken: record a visible
                        // failed result so the caller sees which step.
                        let result =
                            StepResult::blocked(&step.id, reason, check.failed_dependencies);
                        ctx.record(result);
                        ctx.mark_blocked(&step.id);
                    }
                    BlockClassification::FailedDependency => {
                        // The upstream failure is already visible; cascade
                        // without a duplicate result entry.
                        blocked_silent.push(step.id.clone());
                        ctx.mark_blocked(&step.id);
                    }
                }
                continue;
            }

            on_progress(RunProgress::StepStarting {
                id: &step.id,
                index,
                total,
            });
            debug!(step = %step.id, "executing step");

            let step_start = Instant::now();
            let result = match executor.execute(step) {
                Ok(output) => StepResult::success(&step.id, step_start.elapsed(), output.output),
                Err(e) => {
                    warn!(step = %step.id, error = %e, "step errored");
                    StepResult::failure(&step.id, step_start.elapsed(), e.to_string())
                }
            };

            on_progress(RunProgress::StepFinished {
                id: &step.id,
                result: &result,
            });

            let failed = !result.success;
            ctx.record(result);
            if failed {
                ctx.mark_failed(&step.id);
            }
        }

        let status = if cancelled {
            WorkflowStatus::Cancelled
        } else {
            terminal_status(ctx.results(), self.workflow.len())
        };

        info!(
            workflow = self.workflow.name(),
            %status,
            steps = ctx.results().len(),
            "workflow finished"
        );
        on_progress(RunProgress::RunFinished { status });

        Ok(RunReport {
            workflow: self.workflow.name().to_string(),
            steps: ctx.into_results(),
            blocked: blocked_silent,
            started_at,
            duration: start.elapsed(),
            status,
        })
    }
}

/// Compute the terminal status from the accumulated results.
///
/// Completed only when every declared step produced a visible, successful
/// result. A count gap against the total step count means at least one step
/// was silently blocked; synthesized blocked results do appear in the count,
/// so the gap is independent of how many of those were injected.
fn terminal_status(results: &[StepResult], total_steps: usize) -> WorkflowStatus {
    let has_failed = results.iter().any(|r| r.status() == StepStatus::Failed);
    let has_blocked = results.len() < total_steps;

    if !has_failed && !has_blocked && results.iter().all(|r| r.status() == StepStatus::Completed) {
        WorkflowStatus::Completed
    } else {
        WorkflowStatus::Failed
    }
}

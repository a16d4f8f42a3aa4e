//! Step execution boundary and results.
//!
//! The engine never owns a step's business logic. Callers implement
//! [`StepExecutor`] to interpret each step's payload; the runner records
//! whatever outcome comes back as a [`StepResult`].

use serde::Serialize;
use std::time::Duration;

use crate::error::Result;
use crate::workflow::Step;

/// Status of a step in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step is waiting to run.
    Pending,

    /// Step is currently executing.
    Running,

    /// Step completed successfully.
    Completed,

    /// Step failed.
    Failed,

    /// Step was prevented from executing by its dependencies.
    Blocked,
}

impl StepStatus {
    /// Check if this is a terminal state (no more changes expected).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepStatus::Completed | StepStatus::Failed | StepStatus::Blocked
        )
    }

    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Pending => '○',
            StepStatus::Running => '◉',
            StepStatus::Completed => '✓',
            StepStatus::Failed => '✗',
            StepStatus::Blocked => '⊘',
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
            StepStatus::Blocked => "blocked",
        };
        write!(f, "{}", s)
    }
}

/// Output returned by a successful step execution.
#[derive(Debug, Clone, Default)]
pub struct StepOutput {
    /// Captured output, if the executor produced any.
    pub output: Option<String>,
}

impl StepOutput {
    /// An empty output.
    pub fn none() -> Self {
        Self::default()
    }

    /// Output with captured text.
    pub fn with_output(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
        }
    }
}

/// Executes a single step's payload.
///
/// Implementations own retries, timeouts, and whatever the payload means.
/// Returning `Err` is recorded by the runner as a failed result for that
/// step; it never aborts the run.
pub trait StepExecutor {
    /// Execute a step, returning its output on success.
    fn execute(&mut self, step: &Step) -> Result<StepOutput>;
}

/// Result of executing (or blocking) a step.
///
/// Appended exactly once per executed or blocked-and-reported step.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    /// Step id.
    pub id: String,

    /// Whether the step succeeded.
    pub success: bool,

    /// Execution duration (zero for synthesized blocked results).
    pub duration: Duration,

    /// Captured output (if available).
    pub output: Option<String>,

    /// Error message (if failed).
    pub error: Option<String>,

    /// Dependency ids implicated when the step was blocked.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_dependencies: Vec<String>,
}

impl StepResult {
    /// Create a success result.
    pub fn success(id: &str, duration: Duration, output: Option<String>) -> Self {
        Self {
            id: id.to_string(),
            success: true,
            duration,
            output,
            error: None,
            failed_dependencies: Vec::new(),
        }
    }

    /// Create a failure result.
    pub fn failure(id: &str, duration: Duration, error: String) -> Self {
        Self {
            id: id.to_string(),
            success: false,
            duration,
            output: None,
            error: Some(error),
            failed_dependencies: Vec::new(),
        }
    }

    /// Create a synthesized result for a step blocked by missing dependencies.
    ///
    /// The step never executed, so the result carries no output and a zero
    /// duration; it counts as failed.
    pub fn blocked(id: &str, reason: String, failed_dependencies: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            success: false,
            duration: Duration::ZERO,
            output: None,
            error: Some(reason),
            failed_dependencies,
        }
    }

    /// Get the status of this result.
    pub fn status(&self) -> StepStatus {
        if self.success {
            StepStatus::Completed
        } else {
            StepStatus::Failed
        }
    }

    /// Whether this result was synthesized for a blocked step.
    pub fn was_blocked(&self) -> bool {
        !self.failed_dependencies.is_empty()
    }

    /// Generate a summary line for display.
    pub fn summary_line(&self) -> String {
        let status = self.status();
        if self.success {
            format!(
                "{} {} ({})",
                status.display_char(),
                self.id,
                format_duration(self.duration)
            )
        } else {
            let error = self.error.as_deref().unwrap_or("unknown error");
            format!("{} {} - {}", status.display_char(), self.id, error)
        }
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{}s", secs, millis / 100)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_terminal_states() {
        assert!(StepStatus::Completed.is_terminal());
        assert!(StepStatus::Failed.is_terminal());
        assert!(StepStatus::Blocked.is_terminal());
        assert!(!StepStatus::Pending.is_terminal());
        assert!(!StepStatus::Running.is_terminal());
    }

    #[test]
    fn success_result_reports_completed() {
        let result = StepResult::success("install", Duration::from_secs(2), None);
        assert_eq!(result.status(), StepStatus::Completed);
        assert!(!result.was_blocked());
    }

    #[test]
    fn failure_result_reports_failed() {
        let result = StepResult::failure("install", Duration::from_secs(1), "exit 1".into());
        assert_eq!(result.status(), StepStatus::Failed);
        assert_eq!(result.error.as_deref(), Some("exit 1"));
    }

    #[test]
    fn blocked_result_is_failed_with_implicated_deps() {
        let result = StepResult::blocked(
            "deploy",
            "missing dependencies: build".into(),
            vec!["build".into()],
        );
        assert_eq!(result.status(), StepStatus::Failed);
        assert!(result.was_blocked());
        assert_eq!(result.duration, Duration::ZERO);
        assert_eq!(result.failed_dependencies, vec!["build"]);
    }

    #[test]
    fn summary_line_formatting() {
        let success = StepResult::success("test", Duration::from_secs(1), None);
        let summary = success.summary_line();
        assert!(summary.contains('✓'));
        assert!(summary.contains("test"));

        let failure =
            StepResult::failure("broken", Duration::from_secs(5), "command not found".into());
        let summary = failure.summary_line();
        assert!(summary.contains('✗'));
        assert!(summary.contains("command not found"));
    }

    #[test]
    fn format_duration_ranges() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(95)), "1m 35s");
    }

    #[test]
    fn result_serializes_to_json() {
        let result = StepResult::success("install", Duration::from_secs(1), Some("ok".into()));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["id"], "install");
        assert_eq!(json["success"], true);
        assert_eq!(json["output"], "ok");
    }
}

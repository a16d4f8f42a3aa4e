//! Step execution orchestration and dependency management.

pub mod checker;
pub mod dependency;
pub mod workflow;

pub use checker::{check_step, BlockClassification, DependencyCheckResult};
pub use dependency::DependencyGraph;
pub use workflow::{
    CancelToken, RunContext, RunProgress, RunReport, WorkflowRunner, WorkflowStatus,
};

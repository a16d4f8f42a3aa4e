//! Cairn - dependency-aware workflow step execution.
//!
//! Cairn runs a workflow of steps with declared dependencies: it decides per
//! step whether it may execute, invokes a caller-supplied executor for
//! runnable steps, cascades blocking through the dependency graph, and
//! computes one terminal status for the run.
//!
//! # Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`runner`] - Step execution orchestration and dependency management
//! - [`steps`] - Step execution boundary and results
//! - [`workflow`] - Workflow and step definitions
//!
//! # Example
//!
//! ```
//! use cairn::runner::{WorkflowRunner, WorkflowStatus};
//! use cairn::steps::MockExecutor;
//! use cairn::workflow::{Step, Workflow};
//!
//! let workflow = Workflow::builder("setup")
//!     .step(Step::new("install"))
//!     .step(Step::new("migrate").depends_on("install"))
//!     .build()
//!     .unwrap();
//!
//! let mut executor = MockExecutor::new();
//! let report = WorkflowRunner::new(&workflow).run(&mut executor).unwrap();
//! assert_eq!(report.status, WorkflowStatus::Completed);
//! ```
//!
//! How steps actually execute is the caller's business: implement
//! [`steps::StepExecutor`] to interpret each step's payload.

pub mod error;
pub mod runner;
pub mod steps;
pub mod workflow;

pub use error::{CairnError, Result};

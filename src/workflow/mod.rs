//! Workflow and step definitions.

pub mod schema;

pub use schema::{Step, Workflow, WorkflowBuilder};

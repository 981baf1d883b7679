//! Diesel models for the workflow tracking tables.

mod file;
mod workflow;
mod workflow_file;

pub use file::{File, NewFile};
pub use workflow::{NewWorkflow, Workflow};
pub use workflow_file::{NewWorkflowFile, WorkflowFile};

//! Workflow payloads, graph construction and the remote status vocabulary.

mod builder;
mod execution;
mod model;
mod name;
mod state;

pub use builder::WorkflowGraphBuilder;
pub use execution::{Execution, ExecutionList, ExecutionMetadata, ExecutionStatus, ListMetadata};
pub use model::{
    Arguments, Artifact, Dag, Parameter, Task, TaskArguments, Template, TemplateRef, Workflow,
    WorkflowMetadata, WorkflowSpec,
};
pub use name::{NameFormatError, WorkflowName};
pub use state::{StatusFilterError, WorkflowState, format_status_filter, parse_status_filter};

//! Workflow submission response types.

use filepipe_argo::PipelineConfig;
use filepipe_postgres::CommittedWorkflow;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Workflow started for a single committed file.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedFile {
    /// Full workflow name, `{pipeline}-{recordId}-{sequenceId}`.
    pub workflow_name: String,
    /// Sequence number allocated for the record.
    pub sequence_id: u64,
}

impl From<&CommittedWorkflow> for ProcessedFile {
    fn from(committed: &CommittedWorkflow) -> Self {
        Self {
            workflow_name: committed.full_name(),
            sequence_id: committed.sequence_id,
        }
    }
}

/// A started workflow and the token its tasks use to call back.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowContext {
    /// Full workflow name, `{pipeline}-{recordId}-{sequenceId}`.
    pub workflow_name: String,
    /// Per-workflow secret, revoked by the last task of the workflow.
    pub secret_key: String,
}

/// Workflows started for a record.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowContexts {
    pub workflow_contexts: Vec<WorkflowContext>,
}

/// A pipeline and the files it would process.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableWorkflow {
    /// Pipeline name.
    pub name: String,
    /// Mimetype the pipeline accepts.
    pub mimetype: String,
    /// Names of the accepted files, in request order.
    pub files: Vec<String>,
}

impl AvailableWorkflow {
    pub fn new(pipeline: &PipelineConfig, files: Vec<String>) -> Self {
        Self {
            name: pipeline.name.clone(),
            mimetype: pipeline.mimetype.clone(),
            files,
        }
    }
}

/// Pipelines applicable to a set of files.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableWorkflows {
    pub workflows: Vec<AvailableWorkflow>,
}

//! Remote workflow execution response types.

use filepipe_argo::WorkflowState;
use filepipe_argo::workflow::{Execution, ExecutionList};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::service::WorkflowDetail;

/// Status of one workflow execution.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    /// Full workflow name.
    pub name: String,
    /// Absent until the engine has picked the workflow up.
    pub phase: Option<WorkflowState>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    /// Completed over total nodes, e.g. `3/4`.
    pub progress: Option<String>,
}

impl From<Execution> for ExecutionSummary {
    fn from(execution: Execution) -> Self {
        Self {
            name: execution.metadata.name,
            phase: execution.status.phase,
            started_at: execution.status.started_at,
            finished_at: execution.status.finished_at,
            progress: execution.status.progress,
        }
    }
}

/// One page of a record's workflow executions.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionsPage {
    pub items: Vec<ExecutionSummary>,
    /// Cursor for the next page, absent on the last one.
    #[serde(rename = "continue", skip_serializing_if = "Option::is_none")]
    pub continue_token: Option<String>,
}

impl From<ExecutionList> for ExecutionsPage {
    fn from(list: ExecutionList) -> Self {
        Self {
            items: list.items.into_iter().map(ExecutionSummary::from).collect(),
            continue_token: list.metadata.continue_token,
        }
    }
}

/// A workflow execution together with the files it processes.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDetail {
    pub workflow: Execution,
    /// Keys of the files linked to the workflow, ordered by key.
    pub files: Vec<String>,
}

impl From<WorkflowDetail> for ExecutionDetail {
    fn from(detail: WorkflowDetail) -> Self {
        Self {
            workflow: detail.execution,
            files: detail.file_keys,
        }
    }
}

//! Path parameter types for HTTP handlers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path parameters for record-level operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPathParams {
    /// Identifier of the record in the record store.
    pub record_id: String,
}

/// Path parameters for starting one pipeline on a record.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPipelinePathParams {
    /// Identifier of the record in the record store.
    pub record_id: String,
    /// Name of the configured pipeline.
    pub pipeline: String,
}

/// Path parameters for workflow detail operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPathParams {
    /// Full workflow name, `{pipeline}-{recordId}-{sequenceId}`.
    pub workflow_name: String,
}

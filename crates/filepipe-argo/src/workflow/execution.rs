//! Responses of the remote list and detail endpoints.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use super::state::WorkflowState;

/// One remote workflow execution, reduced to the projected fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    #[serde(default)]
    pub metadata: ExecutionMetadata,
    #[serde(default)]
    pub status: ExecutionStatus,
}

impl Execution {
    /// Returns the execution name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStatus {
    /// Absent until the engine has picked up the workflow.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub phase: Option<WorkflowState>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    /// Completed over total nodes, e.g. `3/4`.
    #[serde(default)]
    pub progress: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One page of executions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ExecutionList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<Execution>,
    #[serde(default)]
    pub metadata: ListMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListMetadata {
    /// Opaque cursor for the next page, absent on the last one.
    #[serde(default, rename = "continue")]
    pub continue_token: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<WorkflowState>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(phase) => phase.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Execution>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Execution>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_projected_list() -> anyhow::Result<()> {
        let body = json!({
            "metadata": { "continue": "eyJ2IjoibWV0YS5rOHMuaW8vdjEi" },
            "items": [
                {
                    "metadata": { "name": "count-words-ab12-xy34-1", "namespace": "argo" },
                    "status": {
                        "phase": "Succeeded",
                        "startedAt": "2025-06-01T10:00:00Z",
                        "finishedAt": "2025-06-01T10:01:30Z",
                        "progress": "4/4"
                    }
                },
                { "metadata": { "name": "count-words-ab12-xy34-2" }, "status": { "phase": "" } }
            ]
        });

        let list: ExecutionList = serde_json::from_value(body)?;
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].status.phase, Some(WorkflowState::Succeeded));
        assert_eq!(list.items[0].status.progress.as_deref(), Some("4/4"));
        assert_eq!(list.items[1].status.phase, None);
        assert_eq!(
            list.metadata.continue_token.as_deref(),
            Some("eyJ2IjoibWV0YS5rOHMuaW8vdjEi")
        );
        Ok(())
    }

    #[test]
    fn null_items_decode_as_empty() -> anyhow::Result<()> {
        let list: ExecutionList = serde_json::from_value(json!({ "items": null, "metadata": {} }))?;
        assert!(list.items.is_empty());
        assert_eq!(list.metadata.continue_token, None);
        Ok(())
    }

    #[test]
    fn rejects_unknown_phase() {
        let result = serde_json::from_value::<Execution>(json!({ "status": { "phase": "Exploded" } }));
        assert!(result.is_err());
    }
}

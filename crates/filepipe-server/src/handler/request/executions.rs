//! Execution listing request types.

use filepipe_argo::client::DEFAULT_LIST_LIMIT;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

/// Query parameters for listing a record's executions.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListExecutions {
    /// Maximum number of executions returned.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Number of executions to skip, passed to the engine as its cursor.
    #[serde(default)]
    pub skip: u32,
    /// Status filter such as `(Running, Pending)`. Empty means no filter.
    #[serde(default)]
    pub status: String,
}

impl Default for ListExecutions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            skip: 0,
            status: String::new(),
        }
    }
}

//! Remote execution states and the status-filter grammar.

use std::sync::LazyLock;

use regex::Regex;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Lifecycle phase of a remote workflow execution.
///
/// Names are case-sensitive and round-trip exactly through [`Display`]
/// and [`FromStr`](std::str::FromStr).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumIter, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub enum WorkflowState {
    Error,
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl WorkflowState {
    /// Returns whether the execution has stopped.
    #[inline]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Error | Self::Succeeded | Self::Failed)
    }
}

/// Rejection of a malformed status filter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusFilterError {
    /// Missing parentheses, other bracketing, or empty tokens.
    #[error("status filter must be a parenthesized, comma-separated list, e.g. (Running, Pending)")]
    Format,
    /// A token that names no known state.
    #[error("unknown workflow status: {token}")]
    UnknownState { token: String },
}

static STATUS_FILTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(\s*[A-Za-z]+\s*(?:,\s*[A-Za-z]+\s*)*\)$")
        .expect("status filter pattern compiles")
});

/// Parses a filter such as `(Running, Pending)` into its states.
///
/// An empty input means no filtering and yields an empty list.
pub fn parse_status_filter(input: &str) -> Result<Vec<WorkflowState>, StatusFilterError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }

    if !STATUS_FILTER.is_match(input) {
        return Err(StatusFilterError::Format);
    }

    input[1..input.len() - 1]
        .split(',')
        .map(str::trim)
        .map(|token| {
            token
                .parse::<WorkflowState>()
                .map_err(|_| StatusFilterError::UnknownState {
                    token: token.to_owned(),
                })
        })
        .collect()
}

/// Renders states in the `(A,B)` form the remote label selector expects.
pub fn format_status_filter(states: &[WorkflowState]) -> String {
    let joined: Vec<&'static str> = states.iter().map(|state| state.into()).collect();
    format!("({})", joined.join(","))
}

//! Query parameters of the workflow listing endpoint.

use url::Url;

use crate::WorkflowState;
use crate::workflow::format_status_filter;

/// Page size used when the caller gives none.
pub const DEFAULT_LIST_LIMIT: u32 = 20;

/// Fixed field projection requested from the listing endpoint.
pub const LIST_FIELDS: &str = "metadata,items.metadata.uid,items.metadata.name,\
items.metadata.namespace,items.metadata.creationTimestamp,items.metadata.labels,\
items.metadata.annotations,items.status.phase,items.status.message,\
items.status.finishedAt,items.status.startedAt,items.status.estimatedDuration,\
items.status.progress,items.spec.suspend";

const PHASE_SELECTOR: &str = "workflows.argoproj.io/phase in";

/// Filters and pagination for the workflows of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ListQuery {
    /// Matched as a substring of the workflow name.
    pub record_id: String,
    pub limit: u32,
    /// Forwarded as the continuation cursor when non-zero.
    pub skip: u32,
    /// Empty means every state.
    pub states: Vec<WorkflowState>,
}

impl ListQuery {
    pub fn new(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            limit: DEFAULT_LIST_LIMIT,
            skip: 0,
            states: Vec::new(),
        }
    }

    /// Sets the page size. Zero means "no limit" to the engine, so it is raised to 1.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_states(mut self, states: Vec<WorkflowState>) -> Self {
        self.states = states;
        self
    }

    /// Appends the query parameters to `url`.
    pub(crate) fn apply(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("listOptions.limit", &self.limit.to_string())
            .append_pair("fields", LIST_FIELDS)
            .append_pair("nameFilter", "Contains")
            .append_pair(
                "listOptions.fieldSelector",
                &format!("metadata.name={}", self.record_id),
            );

        if self.skip > 0 {
            pairs.append_pair("listOptions.continue", &self.skip.to_string());
        }

        if !self.states.is_empty() {
            pairs.append_pair(PHASE_SELECTOR, &format_status_filter(&self.states));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn params(query: &ListQuery) -> anyhow::Result<HashMap<String, String>> {
        let mut url: Url = "http://argo/api/v1/workflows/argo".parse()?;
        query.apply(&mut url);
        Ok(url.query_pairs().into_owned().collect())
    }

    #[test]
    fn minimal_query() -> anyhow::Result<()> {
        let params = params(&ListQuery::new("ab12-xy34"))?;

        assert_eq!(params["listOptions.limit"], "20");
        assert_eq!(params["fields"], LIST_FIELDS);
        assert_eq!(params["nameFilter"], "Contains");
        assert_eq!(params["listOptions.fieldSelector"], "metadata.name=ab12-xy34");
        assert!(!params.contains_key("listOptions.continue"));
        assert!(!params.contains_key(PHASE_SELECTOR));
        Ok(())
    }

    #[test]
    fn skip_and_states() -> anyhow::Result<()> {
        let query = ListQuery::new("ab12-xy34")
            .with_limit(5)
            .with_skip(10)
            .with_states(vec![WorkflowState::Running, WorkflowState::Pending]);
        let params = params(&query)?;

        assert_eq!(params["listOptions.limit"], "5");
        assert_eq!(params["listOptions.continue"], "10");
        assert_eq!(params[PHASE_SELECTOR], "(Running,Pending)");
        Ok(())
    }

    #[test]
    fn zero_limit_still_caps_page() -> anyhow::Result<()> {
        let params = params(&ListQuery::new("ab12-xy34").with_limit(0))?;
        assert_eq!(params["listOptions.limit"], "1");
        Ok(())
    }

    #[test]
    fn projection_has_no_whitespace() {
        assert!(!LIST_FIELDS.contains(char::is_whitespace));
        assert!(LIST_FIELDS.starts_with("metadata,items.metadata.uid,"));
        assert!(LIST_FIELDS.ends_with(",items.spec.suspend"));
    }
}

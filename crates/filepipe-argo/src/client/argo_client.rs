//! Workflow creation, listing and detail calls.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{ArgoConfig, ListQuery};
use crate::workflow::{Execution, ExecutionList, Workflow};
use crate::{Error, HttpClient, RequestOptions, Result, TRACING_TARGET_CLIENT};

/// Body of the workflow creation endpoint.
#[derive(Serialize)]
struct CreateWorkflowRequest<'a> {
    workflow: &'a Workflow,
}

struct ArgoClientInner {
    http: HttpClient,
    config: ArgoConfig,
}

/// Client for one namespace of an Argo server. Cheap to clone.
#[derive(Clone)]
pub struct ArgoClient {
    inner: Arc<ArgoClientInner>,
}

impl ArgoClient {
    /// Creates a client with the retry policy from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the server URL cannot carry a path,
    /// or [`Error::Transport`] if the HTTP client cannot be built.
    pub fn new(config: ArgoConfig) -> Result<Self> {
        if config.argo_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(
                format!("'{}' cannot be used as a base url", config.argo_url).into(),
            ));
        }

        let http = HttpClient::new(config.retry_policy(), &config.argo_user_agent)?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            argo_url = %config.argo_url,
            namespace = %config.argo_namespace,
            insecure_tls = config.argo_insecure_tls,
            "Created argo client"
        );

        Ok(Self {
            inner: Arc::new(ArgoClientInner { http, config }),
        })
    }

    /// Returns the configuration this client was created with.
    pub fn config(&self) -> &ArgoConfig {
        &self.inner.config
    }

    /// Returns the namespace workflows are submitted to.
    pub fn namespace(&self) -> &str {
        &self.inner.config.argo_namespace
    }

    /// Submits a workflow and returns the created execution.
    pub async fn submit_workflow(
        &self,
        workflow: &Workflow,
        cancel: &CancellationToken,
    ) -> Result<Execution> {
        let url = self.workflows_url(&[])?;
        let body = CreateWorkflowRequest { workflow };

        let created: Execution = self
            .inner
            .http
            .post(url, &body, self.options(), cancel)
            .await?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            workflow_name = workflow.name(),
            namespace = self.namespace(),
            "Submitted workflow"
        );

        Ok(created)
    }

    /// Lists the workflows of one record.
    ///
    /// A missing `items` array in the response is returned as an empty page.
    pub async fn list_workflows(
        &self,
        query: &ListQuery,
        cancel: &CancellationToken,
    ) -> Result<ExecutionList> {
        let mut url = self.workflows_url(&[])?;
        query.apply(&mut url);

        let list: ExecutionList = self.inner.http.get(url, self.options(), cancel).await?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            record_id = %query.record_id,
            items = list.items.len(),
            has_more = list.metadata.continue_token.is_some(),
            "Listed workflows"
        );

        Ok(list)
    }

    /// Fetches one workflow by its full name.
    pub async fn get_workflow(&self, name: &str, cancel: &CancellationToken) -> Result<Execution> {
        let url = self.workflows_url(&[name])?;
        self.inner.http.get(url, self.options(), cancel).await
    }

    fn options(&self) -> RequestOptions {
        RequestOptions {
            skip_tls_verify: self.inner.config.argo_insecure_tls,
        }
    }

    /// `{argo_url}/api/v1/workflows/{namespace}/{extra..}`
    fn workflows_url(&self, extra: &[&str]) -> Result<Url> {
        let mut url = self.inner.config.argo_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidUrl("argo url cannot be a base".into()))?;
            segments
                .pop_if_empty()
                .extend(["api", "v1", "workflows", self.namespace()])
                .extend(extra);
        }
        Ok(url)
    }
}

impl fmt::Debug for ArgoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgoClient")
            .field("argo_url", &self.inner.config.argo_url.as_str())
            .field("namespace", &self.namespace())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;
    use crate::{PipelineConfig, ProcessingStep, RetryPolicy, WorkflowGraphBuilder, WorkflowState};

    type Captured = Arc<Mutex<Vec<Value>>>;

    async fn spawn(router: Router) -> anyhow::Result<Url> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move { axum::serve(listener, router).await });
        Ok(format!("http://{addr}/").parse()?)
    }

    fn client(url: Url) -> anyhow::Result<ArgoClient> {
        let policy = RetryPolicy::new(2, Duration::from_millis(5), Duration::from_secs(5));
        let config = ArgoConfig::new(url)
            .with_namespace("pipelines")
            .with_retry_policy(policy)
            .with_user_agent("filepipe-test");
        Ok(ArgoClient::new(config)?)
    }

    fn mock_argo(captured: Captured) -> Router {
        let submitted = captured.clone();
        Router::new()
            .route(
                "/api/v1/workflows/{namespace}",
                get(
                    |Path(namespace): Path<String>,
                     Query(params): Query<HashMap<String, String>>| async move {
                        assert_eq!(namespace, "pipelines");
                        let record = params["listOptions.fieldSelector"].clone();
                        Json(json!({
                            "metadata": {},
                            "items": [{
                                "metadata": { "name": format!("count-words-{}", &record[14..]) },
                                "status": { "phase": "Running", "progress": "1/4" }
                            }]
                        }))
                    },
                )
                .post(move |Json(body): Json<Value>| {
                    let submitted = submitted.clone();
                    async move {
                        let name = body["workflow"]["metadata"]["name"].clone();
                        submitted.lock().unwrap().push(body);
                        Json(json!({ "metadata": { "name": name }, "status": {} }))
                    }
                }),
            )
            .route(
                "/api/v1/workflows/{namespace}/{name}",
                get(|Path((_, name)): Path<(String, String)>| async move {
                    if name == "missing-ab12-xy34-1" {
                        return Err(StatusCode::NOT_FOUND);
                    }
                    Ok(Json(json!({
                        "metadata": { "name": name },
                        "status": { "phase": "Succeeded", "finishedAt": "2025-06-01T10:01:30Z" }
                    })))
                }),
            )
    }

    #[tokio::test]
    async fn submits_wrapped_workflow() -> anyhow::Result<()> {
        let captured = Captured::default();
        let client = client(spawn(mock_argo(captured.clone())).await?)?;

        let pipeline = PipelineConfig::new("count-words", "text/plain")
            .with_step(ProcessingStep::new("count-words-template", "count-words"));
        let workflow = WorkflowGraphBuilder::new(&pipeline, "http://callback")
            .record("ab12-xy34", 1)
            .files(["a.txt"])
            .build();

        let created = client
            .submit_workflow(&workflow, &CancellationToken::new())
            .await?;
        assert_eq!(created.name(), "count-words-ab12-xy34-1");

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0]["workflow"], serde_json::to_value(&workflow)?);
        Ok(())
    }

    #[tokio::test]
    async fn lists_record_workflows() -> anyhow::Result<()> {
        let client = client(spawn(mock_argo(Captured::default())).await?)?;

        let query = ListQuery::new("ab12-xy34").with_states(vec![WorkflowState::Running]);
        let list = client
            .list_workflows(&query, &CancellationToken::new())
            .await?;

        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].name(), "count-words-ab12-xy34");
        assert_eq!(list.items[0].status.phase, Some(WorkflowState::Running));
        assert_eq!(list.metadata.continue_token, None);
        Ok(())
    }

    #[tokio::test]
    async fn fetches_single_workflow() -> anyhow::Result<()> {
        let client = client(spawn(mock_argo(Captured::default())).await?)?;

        let execution = client
            .get_workflow("count-words-ab12-xy34-2", &CancellationToken::new())
            .await?;
        assert_eq!(execution.name(), "count-words-ab12-xy34-2");
        assert_eq!(execution.status.phase, Some(WorkflowState::Succeeded));

        let missing = client
            .get_workflow("missing-ab12-xy34-1", &CancellationToken::new())
            .await;
        assert!(matches!(missing, Err(Error::Client { status: 404, .. })));
        Ok(())
    }

    #[test]
    fn builds_namespaced_urls() -> anyhow::Result<()> {
        let client = client("https://argo.internal:2746/prefix/".parse()?)?;
        assert_eq!(
            client.workflows_url(&["wf-1"])?.as_str(),
            "https://argo.internal:2746/prefix/api/v1/workflows/pipelines/wf-1"
        );
        Ok(())
    }

    #[test]
    fn rejects_non_base_url() -> anyhow::Result<()> {
        let config = ArgoConfig::new("mailto:ops@example.com".parse()?);
        assert!(matches!(
            ArgoClient::new(config),
            Err(Error::InvalidUrl(_))
        ));
        Ok(())
    }
}

//! Workflow execution status handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;

use crate::extract::{Json, Path, Query};
use crate::handler::Result;
use crate::handler::request::{ListExecutions, RecordPathParams, WorkflowPathParams};
use crate::handler::response::{ErrorResponse, ExecutionDetail, ExecutionsPage};
use crate::service::{ServiceState, StatusQueryService};

/// Tracing target for execution status operations.
const TRACING_TARGET: &str = "filepipe_server::handler::executions";

/// Lists the workflow executions of a record.
#[tracing::instrument(
    skip_all,
    fields(
        record_id = %path_params.record_id,
        limit = query.limit,
        skip = query.skip,
    )
)]
pub(super) async fn list_executions(
    State(status_query): State<StatusQueryService>,
    Path(path_params): Path<RecordPathParams>,
    Query(query): Query<ListExecutions>,
) -> Result<(StatusCode, Json<ExecutionsPage>)> {
    let list = status_query
        .list(&path_params.record_id, query.limit, query.skip, &query.status)
        .await?;

    tracing::debug!(
        target: TRACING_TARGET,
        items = list.items.len(),
        "Executions listed"
    );

    Ok((StatusCode::OK, Json(ExecutionsPage::from(list))))
}

pub(super) fn list_executions_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List workflow executions")
        .description(
            "Returns the executions whose name contains the record id. `status` takes a \
            parenthesized list such as `(Running, Pending)`; `skip` is passed to the engine \
            as its continuation cursor.",
        )
        .response::<200, Json<ExecutionsPage>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<503, Json<ErrorResponse>>()
}

/// Returns one execution and the files linked to it.
#[tracing::instrument(skip_all, fields(workflow_name = %path_params.workflow_name))]
async fn get_execution(
    State(status_query): State<StatusQueryService>,
    Path(path_params): Path<WorkflowPathParams>,
) -> Result<(StatusCode, Json<ExecutionDetail>)> {
    let detail = status_query.detail(&path_params.workflow_name).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        files = detail.file_keys.len(),
        "Execution retrieved"
    );

    Ok((StatusCode::OK, Json(ExecutionDetail::from(detail))))
}

fn get_execution_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get workflow execution")
        .description(
            "Returns the execution named `{pipeline}-{recordId}-{sequenceId}` together with \
            the keys of the files it processes.",
        )
        .response::<200, Json<ExecutionDetail>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<503, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with the execution detail route.
///
/// The record listing shares its path with workflow submission and is
/// routed by [`workflows::routes`](super::workflows::routes).
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/workflows/{workflowName}",
            get_with(get_execution, get_execution_docs),
        )
        .with_path_items(|item| item.tag("Executions"))
}

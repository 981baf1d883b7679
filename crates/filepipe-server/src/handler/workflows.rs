//! Workflow submission handlers.
//!
//! Every submission follows the same order: validate the request, resolve
//! the pipeline, commit the tracking rows in one transaction, and only
//! then queue the workflow graph for the engine. The response is sent as
//! soon as the rows are committed.

use std::sync::Arc;

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use filepipe_argo::{PipelineConfig, PipelineRegistry, Workflow, WorkflowGraphBuilder};
use filepipe_postgres::query::PersistenceCoordinator;
use filepipe_postgres::{CommittedWorkflow, PgClient, SubmissionFile, WorkflowSubmission};

use super::executions::{list_executions, list_executions_docs};
use crate::extract::{Json, Path, ValidateJson};
use crate::handler::request::{
    AvailableWorkflowsRequest, ProcessFile, RecordPathParams, RecordPipelinePathParams,
    RequestFile, StartWorkflow, StartWorkflows,
};
use crate::handler::response::{
    AvailableWorkflow, AvailableWorkflows, ErrorResponse, ProcessedFile, WorkflowContext,
    WorkflowContexts,
};
use crate::handler::{ErrorKind, Result};
use crate::service::{ServiceState, WorkflowSubmitter, generate_secret_key};

/// Tracing target for workflow submission operations.
const TRACING_TARGET: &str = "filepipe_server::handler::workflows";

/// Builds the graph for a committed workflow.
fn build_workflow(
    pipeline: &PipelineConfig,
    committed: &CommittedWorkflow,
    submitter: &WorkflowSubmitter,
    secret_key: Option<&str>,
) -> Workflow {
    let callback_url = submitter.callback_url().as_str().trim_end_matches('/');
    let builder = WorkflowGraphBuilder::new(pipeline, callback_url)
        .record(&committed.record_id, committed.sequence_id)
        .files(committed.file_keys.iter().map(String::as_str));

    match secret_key {
        Some(secret_key) => builder.secret_key(secret_key).build(),
        None => builder.build(),
    }
}

fn file_key(file: &RequestFile) -> (&str, &str) {
    (&file.file_name, &file.mimetype)
}

/// Starts the pipeline for a file that was just committed to a record.
#[tracing::instrument(
    skip_all,
    fields(
        record_id = %request.record_id,
        mimetype = %request.mimetype,
    )
)]
async fn process_file(
    State(pg_client): State<PgClient>,
    State(pipelines): State<Arc<PipelineRegistry>>,
    State(submitter): State<WorkflowSubmitter>,
    ValidateJson(request): ValidateJson<ProcessFile>,
) -> Result<(StatusCode, Json<ProcessedFile>)> {
    let Some(pipeline) = pipelines.find_by_mimetype(&request.mimetype) else {
        return Err(ErrorKind::NotFound
            .with_message(format!("No pipeline found for mimetype: {}", request.mimetype))
            .with_resource("pipeline"));
    };

    let submission = WorkflowSubmission::new(&pipeline.name)
        .with_file(SubmissionFile::new(&request.file_name, &request.mimetype));

    let mut conn = pg_client.get_connection().await?;
    let committed = conn.commit_workflow(&request.record_id, submission).await?;
    drop(conn);

    submitter.enqueue(build_workflow(pipeline, &committed, &submitter, None));

    tracing::info!(
        target: TRACING_TARGET,
        workflow_name = %committed.full_name(),
        sequence_id = committed.sequence_id,
        "File queued for processing"
    );

    Ok((StatusCode::CREATED, Json(ProcessedFile::from(&committed))))
}

fn process_file_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Process file")
        .description(
            "Starts the pipeline configured for the file's mimetype. The workflow is \
            recorded before it is submitted, so it may not be visible in the engine yet.",
        )
        .response::<201, Json<ProcessedFile>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Starts every pipeline that accepts at least one of the files.
#[tracing::instrument(
    skip_all,
    fields(
        record_id = %path_params.record_id,
        files = request.files.len(),
    )
)]
async fn start_workflows(
    State(pg_client): State<PgClient>,
    State(pipelines): State<Arc<PipelineRegistry>>,
    State(submitter): State<WorkflowSubmitter>,
    Path(path_params): Path<RecordPathParams>,
    ValidateJson(request): ValidateJson<StartWorkflows>,
) -> Result<(StatusCode, Json<WorkflowContexts>)> {
    let groups = pipelines.group_files(&request.files, file_key);
    if groups.is_empty() {
        return Err(ErrorKind::NotFound
            .with_message("No pipeline found for files")
            .with_resource("pipeline"));
    }

    let submissions = groups
        .iter()
        .map(|(pipeline, files)| {
            WorkflowSubmission::new(&pipeline.name)
                .with_files(files.iter().map(|file| SubmissionFile::from(*file)))
        })
        .collect();

    let mut conn = pg_client.get_connection().await?;
    let committed = conn
        .commit_workflows(&path_params.record_id, submissions)
        .await?;
    drop(conn);

    let mut workflow_contexts = Vec::with_capacity(committed.len());
    for ((pipeline, _), committed) in groups.iter().zip(&committed) {
        let secret_key = generate_secret_key();
        submitter.enqueue(build_workflow(
            pipeline,
            committed,
            &submitter,
            Some(&secret_key),
        ));

        workflow_contexts.push(WorkflowContext {
            workflow_name: committed.full_name(),
            secret_key,
        });
    }

    tracing::info!(
        target: TRACING_TARGET,
        workflows = workflow_contexts.len(),
        "Workflows queued for record"
    );

    Ok((StatusCode::CREATED, Json(WorkflowContexts { workflow_contexts })))
}

fn start_workflows_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Start all workflows")
        .description(
            "Groups the files by every pipeline that accepts them and starts one workflow \
            per pipeline. All workflows are recorded in a single transaction.",
        )
        .response::<201, Json<WorkflowContexts>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Starts one named pipeline for a set of files.
#[tracing::instrument(
    skip_all,
    fields(
        record_id = %path_params.record_id,
        pipeline = %path_params.pipeline,
    )
)]
async fn start_workflow(
    State(pg_client): State<PgClient>,
    State(pipelines): State<Arc<PipelineRegistry>>,
    State(submitter): State<WorkflowSubmitter>,
    Path(path_params): Path<RecordPipelinePathParams>,
    ValidateJson(request): ValidateJson<StartWorkflow>,
) -> Result<(StatusCode, Json<WorkflowContext>)> {
    let Some(pipeline) = pipelines.get(&path_params.pipeline) else {
        return Err(ErrorKind::NotFound
            .with_message(format!("No pipeline with name: {}", path_params.pipeline))
            .with_resource("pipeline"));
    };

    for file in &request.files {
        pipeline.check_file(&file.mimetype, &file.file_name)?;
    }

    let submission = WorkflowSubmission::new(&pipeline.name)
        .with_files(request.files.iter().map(SubmissionFile::from));

    let mut conn = pg_client.get_connection().await?;
    let committed = conn
        .commit_workflow(&path_params.record_id, submission)
        .await?;
    drop(conn);

    let secret_key = generate_secret_key();
    submitter.enqueue(build_workflow(
        pipeline,
        &committed,
        &submitter,
        Some(&secret_key),
    ));

    tracing::info!(
        target: TRACING_TARGET,
        workflow_name = %committed.full_name(),
        "Workflow queued"
    );

    let context = WorkflowContext {
        workflow_name: committed.full_name(),
        secret_key,
    };
    Ok((StatusCode::CREATED, Json(context)))
}

fn start_workflow_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Start workflow")
        .description(
            "Starts the named pipeline. Every file must match the pipeline's mimetype and, \
            if it declares one, its file extension.",
        )
        .response::<201, Json<WorkflowContext>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Lists the pipelines that would run for a set of files.
#[tracing::instrument(skip_all, fields(files = request.files.len()))]
async fn available_workflows(
    State(pipelines): State<Arc<PipelineRegistry>>,
    Json(request): Json<AvailableWorkflowsRequest>,
) -> Result<(StatusCode, Json<AvailableWorkflows>)> {
    let workflows = pipelines
        .group_files(&request.files, file_key)
        .into_iter()
        .map(|(pipeline, files)| {
            let files = files.iter().map(|file| file.file_name.clone()).collect();
            AvailableWorkflow::new(pipeline, files)
        })
        .collect();

    Ok((StatusCode::OK, Json(AvailableWorkflows { workflows })))
}

fn available_workflows_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List available workflows")
        .description("Returns every pipeline that accepts at least one of the files.")
        .response::<200, Json<AvailableWorkflows>>()
        .response::<400, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all workflow submission routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/workflows", post_with(process_file, process_file_docs))
        .api_route(
            "/workflows/available",
            post_with(available_workflows, available_workflows_docs),
        )
        .api_route(
            "/records/{recordId}/workflows",
            post_with(start_workflows, start_workflows_docs)
                .get_with(list_executions, list_executions_docs),
        )
        .api_route(
            "/records/{recordId}/workflows/{pipeline}",
            post_with(start_workflow, start_workflow_docs),
        )
        .with_path_items(|item| item.tag("Workflows"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::handler::response::AvailableWorkflows;
    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn process_requires_attributes() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .post("/api/v1/workflows")
            .json(&json!({ "fileName": "notes.txt" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(
            body["message"],
            "Invalid request data. Missing attributes: recordId, mimetype"
        );
        Ok(())
    }

    #[tokio::test]
    async fn process_unknown_mimetype_is_not_found() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .post("/api/v1/workflows")
            .json(&json!({
                "recordId": "ab12-xy34",
                "fileName": "scan.pdf",
                "mimetype": "application/pdf",
            }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn start_all_without_matching_pipeline() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .post("/api/v1/records/ab12-xy34/workflows")
            .json(&json!({ "files": [{ "fileName": "scan.pdf", "mimetype": "application/pdf" }] }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json();
        assert!(
            body["message"]
                .as_str()
                .is_some_and(|m| m.contains("No pipeline found for files"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn start_all_names_missing_file_attributes() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .post("/api/v1/records/ab12-xy34/workflows")
            .json(&json!({ "files": [{ "fileName": "notes.txt" }] }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(
            body["message"]
                .as_str()
                .is_some_and(|m| m.ends_with("Missing attributes: mimetype-0"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn start_one_unknown_pipeline() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .post("/api/v1/records/ab12-xy34/workflows/translate")
            .json(&json!({ "files": [{ "fileName": "notes.txt", "mimetype": "text/plain" }] }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json();
        assert!(
            body["message"]
                .as_str()
                .is_some_and(|m| m.contains("No pipeline with name: translate"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn start_one_rejects_wrong_extension() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .post("/api/v1/records/ab12-xy34/workflows/render-molecule")
            .json(&json!({ "files": [{ "fileName": "mol.pdb", "mimetype": "chemical/x-xyz" }] }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["message"].as_str().is_some_and(|m| m.contains("mol.pdb")));
        Ok(())
    }

    #[tokio::test]
    async fn start_one_requires_single_mimetype() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .post("/api/v1/records/ab12-xy34/workflows/count-words")
            .json(&json!({ "files": [
                { "fileName": "notes.txt", "mimetype": "text/plain" },
                { "fileName": "mol.xyz", "mimetype": "chemical/x-xyz" },
            ] }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn available_groups_files_by_pipeline() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server
            .post("/api/v1/workflows/available")
            .json(&json!({ "files": [
                { "fileName": "notes.txt", "mimetype": "text/plain" },
                { "fileName": "mol.xyz", "mimetype": "chemical/x-xyz" },
                { "fileName": "mol.pdb", "mimetype": "chemical/x-xyz" },
                { "fileName": "summary.txt", "mimetype": "text/plain" },
            ] }))
            .await;

        response.assert_status_ok();
        let body: AvailableWorkflows = response.json();
        assert_eq!(body.workflows.len(), 2);
        assert_eq!(body.workflows[0].name, "count-words");
        assert_eq!(body.workflows[0].files, ["notes.txt", "summary.txt"]);
        assert_eq!(body.workflows[1].name, "render-molecule");
        assert_eq!(body.workflows[1].files, ["mol.xyz"]);
        Ok(())
    }
}

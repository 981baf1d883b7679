//! Read side: execution listings and details.

use filepipe_argo::workflow::{Execution, ExecutionList};
use filepipe_argo::{
    ArgoClient, ListQuery, NameFormatError, StatusFilterError, WorkflowName, parse_status_filter,
};
use filepipe_postgres::query::WorkflowFileRepository;
use filepipe_postgres::{PgClient, PgError};
use tokio_util::sync::CancellationToken;

/// Failure of a status query.
#[derive(Debug, thiserror::Error)]
pub enum StatusQueryError {
    #[error(transparent)]
    StatusFilter(#[from] StatusFilterError),
    #[error(transparent)]
    NameFormat(#[from] NameFormatError),
    #[error(transparent)]
    Argo(#[from] filepipe_argo::Error),
    #[error(transparent)]
    Postgres(#[from] PgError),
}

/// A remote execution together with the file keys linked to it.
#[derive(Debug, Clone)]
pub struct WorkflowDetail {
    pub execution: Execution,
    pub file_keys: Vec<String>,
}

/// Lists a record's executions and resolves single executions.
///
/// Remote calls stop early once `cancel` fires, which happens on shutdown.
#[derive(Clone)]
pub struct StatusQueryService {
    argo: ArgoClient,
    postgres: PgClient,
    cancel: CancellationToken,
}

impl StatusQueryService {
    pub fn new(argo: ArgoClient, postgres: PgClient, cancel: CancellationToken) -> Self {
        Self {
            argo,
            postgres,
            cancel,
        }
    }

    /// Lists executions whose name contains `record_id`.
    ///
    /// `status` uses the `(Running, Pending)` grammar; an empty string
    /// disables filtering. It is parsed before any remote call.
    pub async fn list(
        &self,
        record_id: &str,
        limit: u32,
        skip: u32,
        status: &str,
    ) -> Result<ExecutionList, StatusQueryError> {
        let states = parse_status_filter(status)?;
        let query = ListQuery::new(record_id)
            .with_limit(limit)
            .with_skip(skip)
            .with_states(states);

        Ok(self.argo.list_workflows(&query, &self.cancel).await?)
    }

    /// Fetches an execution by its full name, then the files linked to it.
    ///
    /// The name is parsed before any remote call.
    pub async fn detail(&self, workflow_name: &str) -> Result<WorkflowDetail, StatusQueryError> {
        let name: WorkflowName = workflow_name.parse()?;
        let execution = self.argo.get_workflow(workflow_name, &self.cancel).await?;

        let mut conn = self.postgres.get_connection().await?;
        let sequence_id = i64::try_from(name.sequence_id).map_err(|_| NameFormatError {
            name: workflow_name.to_owned(),
            reason: "sequence number is out of range",
        })?;
        let file_keys = conn
            .list_workflow_file_keys(&name.record_id, &name.pipeline, sequence_id)
            .await?;

        Ok(WorkflowDetail {
            execution,
            file_keys,
        })
    }
}

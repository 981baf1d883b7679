//! Workflow/file links repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{NewWorkflowFile, WorkflowFile};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for links between files and workflows.
pub trait WorkflowFileRepository {
    /// Links a file to a workflow.
    ///
    /// Fails with a `workflow_files_link_unique` violation if the file is
    /// already linked to the workflow.
    fn create_workflow_file(
        &mut self,
        new_link: NewWorkflowFile,
    ) -> impl Future<Output = PgResult<WorkflowFile>> + Send;

    /// Lists the keys of all files linked to the identified workflow, ordered by key.
    ///
    /// Returns an empty list when the workflow does not exist.
    fn list_workflow_file_keys(
        &mut self,
        record_id: &str,
        workflow_name: &str,
        sequence_id: i64,
    ) -> impl Future<Output = PgResult<Vec<String>>> + Send;
}

impl WorkflowFileRepository for PgConnection {
    async fn create_workflow_file(&mut self, new_link: NewWorkflowFile) -> PgResult<WorkflowFile> {
        use schema::workflow_files;

        let link = diesel::insert_into(workflow_files::table)
            .values(&new_link)
            .returning(WorkflowFile::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(link)
    }

    async fn list_workflow_file_keys(
        &mut self,
        record_id: &str,
        workflow_name: &str,
        sequence_id: i64,
    ) -> PgResult<Vec<String>> {
        use schema::{files, workflow_files, workflows};

        let keys = workflow_files::table
            .inner_join(files::table)
            .inner_join(workflows::table)
            .filter(workflows::record_id.eq(record_id))
            .filter(workflows::workflow_name.eq(workflow_name))
            .filter(workflows::sequence_id.eq(sequence_id))
            .order(files::file_key.asc())
            .select(files::file_key)
            .load::<String>(self)
            .await
            .map_err(PgError::from)?;

        Ok(keys)
    }
}

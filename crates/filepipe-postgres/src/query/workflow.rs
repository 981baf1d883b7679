//! Workflows repository and per-record sequence allocation.

use std::future::Future;

use diesel::dsl::max;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{NewWorkflow, Workflow};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for workflow rows.
pub trait WorkflowRepository {
    /// Returns the next sequence number for a record: `max(sequence_id) + 1`, or `1`.
    ///
    /// Must be called inside a repeatable-read transaction together with the
    /// matching [`create_workflow`]. Two concurrent callers can observe the
    /// same maximum; the later insert then fails on
    /// `workflows_record_sequence_unique`, which is the actual guarantee.
    ///
    /// [`create_workflow`]: WorkflowRepository::create_workflow
    fn next_workflow_sequence(
        &mut self,
        record_id: &str,
    ) -> impl Future<Output = PgResult<i64>> + Send;

    /// Creates a new workflow row.
    fn create_workflow(
        &mut self,
        new_workflow: NewWorkflow,
    ) -> impl Future<Output = PgResult<Workflow>> + Send;

    /// Finds a workflow by its `(record_id, workflow_name, sequence_id)` identity.
    fn find_workflow_by_identity(
        &mut self,
        record_id: &str,
        workflow_name: &str,
        sequence_id: i64,
    ) -> impl Future<Output = PgResult<Option<Workflow>>> + Send;

    /// Lists the workflows of a record, newest first.
    fn list_record_workflows(
        &mut self,
        record_id: &str,
    ) -> impl Future<Output = PgResult<Vec<Workflow>>> + Send;
}

impl WorkflowRepository for PgConnection {
    async fn next_workflow_sequence(&mut self, record_id: &str) -> PgResult<i64> {
        use schema::workflows::{self, dsl};

        let current: Option<i64> = workflows::table
            .filter(dsl::record_id.eq(record_id))
            .select(max(dsl::sequence_id))
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(current.unwrap_or(0) + 1)
    }

    async fn create_workflow(&mut self, new_workflow: NewWorkflow) -> PgResult<Workflow> {
        use schema::workflows;

        let workflow = diesel::insert_into(workflows::table)
            .values(&new_workflow)
            .returning(Workflow::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(workflow)
    }

    async fn find_workflow_by_identity(
        &mut self,
        record_id: &str,
        workflow_name: &str,
        sequence_id: i64,
    ) -> PgResult<Option<Workflow>> {
        use schema::workflows::{self, dsl};

        let workflow = workflows::table
            .filter(dsl::record_id.eq(record_id))
            .filter(dsl::workflow_name.eq(workflow_name))
            .filter(dsl::sequence_id.eq(sequence_id))
            .select(Workflow::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(workflow)
    }

    async fn list_record_workflows(&mut self, record_id: &str) -> PgResult<Vec<Workflow>> {
        use schema::workflows::{self, dsl};

        let workflows = workflows::table
            .filter(dsl::record_id.eq(record_id))
            .order(dsl::sequence_id.desc())
            .select(Workflow::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(workflows)
    }
}

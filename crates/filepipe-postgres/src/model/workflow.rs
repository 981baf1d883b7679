//! Workflow model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::workflows;

/// One submission of a pipeline for a record.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = workflows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Workflow {
    /// Unique workflow identifier.
    pub id: Uuid,
    /// Record the workflow was submitted for.
    pub record_id: String,
    /// Name of the pipeline that was submitted.
    pub workflow_name: String,
    /// Position among all workflows of the record, starting at 1.
    pub sequence_id: i64,
    /// Timestamp when the row was created.
    pub created_at: Timestamp,
}

impl Workflow {
    /// Returns the canonical external name `{workflow_name}-{record_id}-{sequence_id}`.
    pub fn full_name(&self) -> String {
        format!(
            "{}-{}-{}",
            self.workflow_name, self.record_id, self.sequence_id
        )
    }
}

/// Data for creating a new workflow.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workflows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWorkflow {
    /// Record the workflow is submitted for.
    pub record_id: String,
    /// Name of the submitted pipeline.
    pub workflow_name: String,
    /// Allocated sequence number.
    pub sequence_id: i64,
}

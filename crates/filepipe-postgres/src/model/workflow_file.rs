//! Workflow/file link model.

use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::workflow_files;

/// Link between a file and a workflow it was grouped into.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = workflow_files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkflowFile {
    pub id: Uuid,
    pub file_id: Uuid,
    pub workflow_id: Uuid,
}

/// Data for linking a file to a workflow.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = workflow_files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWorkflowFile {
    pub file_id: Uuid,
    pub workflow_id: Uuid,
}

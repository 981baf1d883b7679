//! Database error to HTTP error conversion.

use filepipe_postgres::PgError;
use filepipe_postgres::types::{
    ConstraintViolation, FileConstraints, WorkflowConstraints, WorkflowFileConstraints,
};

use crate::handler::{Error, ErrorKind};

const TRACING_TARGET: &str = "filepipe_server::postgres";

impl From<FileConstraints> for Error<'static> {
    fn from(c: FileConstraints) -> Self {
        let error = match c {
            FileConstraints::RecordKeyUnique => {
                ErrorKind::Conflict.with_message("File already exists for this record")
            }
            FileConstraints::RecordIdNotEmpty => {
                ErrorKind::BadRequest.with_message("Record id must not be empty")
            }
            FileConstraints::FileKeyNotEmpty => {
                ErrorKind::BadRequest.with_message("File name must not be empty")
            }
        };

        error.with_resource("file")
    }
}

impl From<WorkflowConstraints> for Error<'static> {
    fn from(c: WorkflowConstraints) -> Self {
        let error = match c {
            WorkflowConstraints::RecordSequenceUnique => ErrorKind::Conflict
                .with_message("Workflow already exists for this sequence number"),
            WorkflowConstraints::SequenceIdMin => {
                ErrorKind::InternalServerError.with_context("allocated sequence id below 1")
            }
            WorkflowConstraints::WorkflowNameNotEmpty => {
                ErrorKind::BadRequest.with_message("Workflow name must not be empty")
            }
        };

        error.with_resource("workflow")
    }
}

impl From<WorkflowFileConstraints> for Error<'static> {
    fn from(c: WorkflowFileConstraints) -> Self {
        let error = match c {
            WorkflowFileConstraints::LinkUnique => {
                ErrorKind::Conflict.with_message("File is already linked to this workflow")
            }
            WorkflowFileConstraints::FileReference
            | WorkflowFileConstraints::WorkflowReference => ErrorKind::InternalServerError
                .with_context("workflow file link references a missing row"),
        };

        error.with_resource("workflow_file")
    }
}

impl From<ConstraintViolation> for Error<'static> {
    fn from(constraint: ConstraintViolation) -> Self {
        match constraint {
            ConstraintViolation::File(c) => c.into(),
            ConstraintViolation::Workflow(c) => c.into(),
            ConstraintViolation::WorkflowFile(c) => c.into(),
        }
    }
}

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        if let Some(constraint) = error.constraint_violation() {
            tracing::warn!(
                target: TRACING_TARGET,
                constraint = %constraint,
                error = %error,
                "query error (constraint violation)"
            );
            return constraint.into();
        }

        if error.is_conflict() {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "concurrent write conflict"
            );
            return ErrorKind::Conflict
                .with_message("Workflow already exists, a concurrent submission won the race")
                .with_resource("workflow");
        }

        match &error {
            PgError::Timeout(timeout) => {
                tracing::error!(target: TRACING_TARGET, timeout = ?timeout, "database timeout");
            }
            PgError::Connection(err) => {
                tracing::error!(target: TRACING_TARGET, error = %err, "database connection error");
            }
            other => {
                tracing::error!(target: TRACING_TARGET, error = %other, "database error");
            }
        }

        ErrorKind::InternalServerError.into_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_collision_is_conflict() {
        let error: Error = ConstraintViolation::Workflow(WorkflowConstraints::RecordSequenceUnique)
            .into();
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.resource(), Some("workflow"));
    }

    #[test]
    fn duplicate_link_is_conflict() {
        let error: Error = WorkflowFileConstraints::LinkUnique.into();
        assert_eq!(error.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn other_errors_are_internal() {
        let error: Error = PgError::Unexpected("pool closed".into()).into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), None);
    }
}

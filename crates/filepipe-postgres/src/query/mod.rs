//! Repositories for the workflow tracking tables.
//!
//! Each repository is a trait implemented for [`PgConnection`], so it can be
//! used both on a pooled [`PgConn`] and on the connection handed to a
//! transaction closure. [`PersistenceCoordinator`] composes them into the
//! transactional write path.
//!
//! [`PgConnection`]: crate::PgConnection
//! [`PgConn`]: crate::PgConn

mod coordinator;
mod file;
mod workflow;
mod workflow_file;

pub use coordinator::{
    CommittedWorkflow, PersistenceCoordinator, SubmissionFile, WorkflowSubmission,
};
pub use file::FileRepository;
pub use workflow::WorkflowRepository;
pub use workflow_file::WorkflowFileRepository;

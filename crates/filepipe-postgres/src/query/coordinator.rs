//! Transactional write path for workflow submissions.
//!
//! A submission allocates the next sequence number of its record, inserts the
//! workflow row, reuses or creates a row for each of its files and links them.
//! All of it happens in one repeatable-read transaction, so other transactions
//! see either the whole submission or nothing.

use std::future::Future;

use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use super::{FileRepository, WorkflowFileRepository, WorkflowRepository};
use crate::model::{NewFile, NewWorkflow, NewWorkflowFile};
use crate::{PgConn, PgConnection, PgError, PgResult, TRACING_TARGET_QUERY};

/// A file referenced by a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFile {
    /// Key of the file inside the record.
    pub file_key: String,
    /// Mimetype of the file.
    pub mimetype: String,
}

impl SubmissionFile {
    pub fn new(file_key: impl Into<String>, mimetype: impl Into<String>) -> Self {
        Self {
            file_key: file_key.into(),
            mimetype: mimetype.into(),
        }
    }
}

/// A pipeline to be committed for a record together with its input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSubmission {
    /// Name of the pipeline.
    pub workflow_name: String,
    /// Input files, in submission order.
    pub files: Vec<SubmissionFile>,
}

impl WorkflowSubmission {
    pub fn new(workflow_name: impl Into<String>) -> Self {
        Self {
            workflow_name: workflow_name.into(),
            files: Vec::new(),
        }
    }

    /// Adds an input file.
    pub fn with_file(mut self, file: SubmissionFile) -> Self {
        self.files.push(file);
        self
    }

    /// Replaces the input files.
    pub fn with_files(mut self, files: impl IntoIterator<Item = SubmissionFile>) -> Self {
        self.files = files.into_iter().collect();
        self
    }
}

/// A submission that has been durably committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedWorkflow {
    /// Identifier of the workflow row.
    pub workflow_id: Uuid,
    /// Record the workflow belongs to.
    pub record_id: String,
    /// Name of the pipeline.
    pub workflow_name: String,
    /// Allocated sequence number, starting at 1.
    pub sequence_id: u64,
    /// Keys of the linked files, in submission order.
    pub file_keys: Vec<String>,
}

impl CommittedWorkflow {
    /// Returns the canonical external name `{workflow_name}-{record_id}-{sequence_id}`.
    pub fn full_name(&self) -> String {
        format!(
            "{}-{}-{}",
            self.workflow_name, self.record_id, self.sequence_id
        )
    }
}

/// Commits workflow submissions atomically.
pub trait PersistenceCoordinator {
    /// Commits a single submission and returns its allocated identity.
    ///
    /// # Errors
    ///
    /// Any failure rolls the whole transaction back. A uniqueness violation
    /// (a concurrent writer took the same sequence number, or a file is listed
    /// twice) is reported as a query error for which [`PgError::is_conflict`]
    /// returns `true`; it is not retried here.
    fn commit_workflow(
        &mut self,
        record_id: &str,
        submission: WorkflowSubmission,
    ) -> impl Future<Output = PgResult<CommittedWorkflow>> + Send;

    /// Commits several submissions for the same record in one transaction.
    ///
    /// Sequence numbers are allocated in the order of `submissions`. Files
    /// shared between submissions are stored once and linked to each.
    fn commit_workflows(
        &mut self,
        record_id: &str,
        submissions: Vec<WorkflowSubmission>,
    ) -> impl Future<Output = PgResult<Vec<CommittedWorkflow>>> + Send;
}

impl PersistenceCoordinator for PgConn {
    async fn commit_workflow(
        &mut self,
        record_id: &str,
        submission: WorkflowSubmission,
    ) -> PgResult<CommittedWorkflow> {
        let mut committed = self.commit_workflows(record_id, vec![submission]).await?;
        committed
            .pop()
            .ok_or_else(|| PgError::Unexpected("transaction committed no workflow".into()))
    }

    async fn commit_workflows(
        &mut self,
        record_id: &str,
        submissions: Vec<WorkflowSubmission>,
    ) -> PgResult<Vec<CommittedWorkflow>> {
        let record_id = record_id.to_owned();

        let result = self
            .repeatable_read(move |conn| {
                async move {
                    let mut committed = Vec::with_capacity(submissions.len());
                    for submission in submissions {
                        committed.push(insert_submission(conn, &record_id, submission).await?);
                    }
                    Ok::<_, PgError>(committed)
                }
                .scope_boxed()
            })
            .await;

        match &result {
            Ok(committed) => {
                for workflow in committed {
                    tracing::info!(
                        target: TRACING_TARGET_QUERY,
                        workflow_name = %workflow.full_name(),
                        files = workflow.file_keys.len(),
                        "Workflow committed"
                    );
                }
            }
            Err(error) if error.is_conflict() => {
                tracing::warn!(
                    target: TRACING_TARGET_QUERY,
                    constraint = error.constraint().unwrap_or("unknown"),
                    "Workflow commit conflicted, transaction rolled back"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_QUERY,
                    error = %error,
                    "Workflow commit failed, transaction rolled back"
                );
            }
        }

        result
    }
}

/// Inserts one submission on a connection that is already inside a transaction.
async fn insert_submission(
    conn: &mut PgConnection,
    record_id: &str,
    submission: WorkflowSubmission,
) -> PgResult<CommittedWorkflow> {
    let sequence_id = conn.next_workflow_sequence(record_id).await?;

    let workflow = conn
        .create_workflow(NewWorkflow {
            record_id: record_id.to_owned(),
            workflow_name: submission.workflow_name,
            sequence_id,
        })
        .await?;

    let mut file_keys = Vec::with_capacity(submission.files.len());
    for file in submission.files {
        let file = conn
            .find_or_create_file(NewFile {
                record_id: record_id.to_owned(),
                file_key: file.file_key,
                mimetype: file.mimetype,
            })
            .await?;

        conn.create_workflow_file(NewWorkflowFile {
            file_id: file.id,
            workflow_id: workflow.id,
        })
        .await?;

        file_keys.push(file.file_key);
    }

    tracing::debug!(
        target: TRACING_TARGET_QUERY,
        record_id,
        sequence_id,
        "Allocated workflow sequence"
    );

    Ok(CommittedWorkflow {
        workflow_id: workflow.id,
        record_id: workflow.record_id,
        workflow_name: workflow.workflow_name,
        sequence_id: sequence_id.unsigned_abs(),
        file_keys,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::{PgClient, PgConfig};

    fn submission(name: &str, keys: &[&str]) -> WorkflowSubmission {
        WorkflowSubmission::new(name)
            .with_files(keys.iter().map(|key| SubmissionFile::new(*key, "text/plain")))
    }

    #[test]
    fn full_name_joins_identity() {
        let committed = CommittedWorkflow {
            workflow_id: Uuid::nil(),
            record_id: "ab12-xy34".into(),
            workflow_name: "count-words".into(),
            sequence_id: 3,
            file_keys: vec![],
        };
        assert_eq!(committed.full_name(), "count-words-ab12-xy34-3");
    }

    #[test]
    fn submission_builder_keeps_order() {
        let submission = submission("count-words", &["b.txt", "a.txt"]);
        let keys: Vec<_> = submission.files.iter().map(|f| f.file_key.as_str()).collect();
        assert_eq!(keys, ["b.txt", "a.txt"]);
    }

    /// Connects to the database named by `POSTGRES_URL` and applies migrations.
    async fn connect() -> anyhow::Result<PgClient> {
        let _ = dotenvy::dotenv();
        let url = std::env::var("POSTGRES_URL")?;
        let client = PgConfig::new(url).build()?;
        crate::run_pending_migrations(&client).await?;
        Ok(client)
    }

    fn unique_record_id() -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("{}-{}", &id[..4], &id[4..8])
    }

    #[tokio::test]
    #[ignore = "requires POSTGRES_URL"]
    async fn sequences_start_at_one_and_increase() -> anyhow::Result<()> {
        let client = connect().await?;
        let mut conn = client.get_connection().await?;
        let record_id = unique_record_id();

        for expected in 1..=3 {
            let committed = conn
                .commit_workflow(&record_id, submission("count-words", &["a.txt"]))
                .await?;
            assert_eq!(committed.sequence_id, expected);
        }

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires POSTGRES_URL"]
    async fn resubmitted_file_reuses_row_and_adds_link() -> anyhow::Result<()> {
        let client = connect().await?;
        let mut conn = client.get_connection().await?;
        let record_id = unique_record_id();

        let first = conn
            .commit_workflow(&record_id, submission("count-words", &["a.txt"]))
            .await?;
        let second = conn
            .commit_workflow(&record_id, submission("count-words", &["a.txt"]))
            .await?;

        assert_eq!(conn.list_record_files(&record_id).await?.len(), 1);

        let first_keys = conn
            .list_workflow_file_keys(&record_id, "count-words", first.sequence_id as i64)
            .await?;
        let second_keys = conn
            .list_workflow_file_keys(&record_id, "count-words", second.sequence_id as i64)
            .await?;
        assert_eq!(first_keys, ["a.txt"]);
        assert_eq!(second_keys, ["a.txt"]);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires POSTGRES_URL"]
    async fn duplicate_file_in_submission_rolls_back() -> anyhow::Result<()> {
        let client = connect().await?;
        let mut conn = client.get_connection().await?;
        let record_id = unique_record_id();

        let error = conn
            .commit_workflow(&record_id, submission("count-words", &["a.txt", "a.txt"]))
            .await
            .expect_err("duplicate link must fail");
        assert!(error.is_conflict());

        assert!(conn.list_record_workflows(&record_id).await?.is_empty());
        assert!(conn.list_record_files(&record_id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires POSTGRES_URL"]
    async fn batch_commit_allocates_consecutive_sequences() -> anyhow::Result<()> {
        let client = connect().await?;
        let mut conn = client.get_connection().await?;
        let record_id = unique_record_id();

        let committed = conn
            .commit_workflows(
                &record_id,
                vec![
                    submission("count-words", &["a.txt", "b.txt"]),
                    submission("detect-language", &["a.txt"]),
                ],
            )
            .await?;

        let sequences: Vec<_> = committed.iter().map(|c| c.sequence_id).collect();
        assert_eq!(sequences, [1, 2]);
        assert_eq!(conn.list_record_files(&record_id).await?.len(), 2);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires POSTGRES_URL"]
    async fn concurrent_commits_never_share_a_sequence() -> anyhow::Result<()> {
        let client = connect().await?;
        let record_id = unique_record_id();

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let client = client.clone();
            let record_id = record_id.clone();
            tasks.push(tokio::spawn(async move {
                let mut conn = client.get_connection().await?;
                conn.commit_workflow(&record_id, submission("count-words", &["a.txt"]))
                    .await
            }));
        }

        let mut committed = BTreeSet::new();
        for task in tasks {
            match task.await? {
                Ok(workflow) => assert!(committed.insert(workflow.sequence_id)),
                Err(error) => assert!(error.is_conflict(), "unexpected error: {error}"),
            }
        }

        let expected: BTreeSet<u64> = (1..=committed.len() as u64).collect();
        assert!(!committed.is_empty());
        assert_eq!(committed, expected);

        Ok(())
    }
}

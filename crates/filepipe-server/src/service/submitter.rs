//! Background submission of workflow graphs.
//!
//! Handlers commit the tracking rows first and then hand the built graph
//! to the [`WorkflowSubmitter`]. Submission runs on a single worker task
//! after the HTTP response is sent; its outcome is only logged. A
//! committed workflow whose submission failed, or was still queued when
//! the process died, has no remote execution and stays that way until it
//! is resubmitted.

use std::sync::Arc;
use std::time::Duration;

use filepipe_argo::{ArgoClient, Workflow};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::TRACING_TARGET_SUBMITTER;

struct SubmitterInner {
    sender: mpsc::Sender<Workflow>,
    callback_url: Url,
    /// Stops intake; the worker drains what is already queued.
    closing: CancellationToken,
    /// Aborts requests still running after the drain deadline.
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

/// Bounded queue of workflow submissions with one worker. Cheap to clone.
#[derive(Clone)]
pub struct WorkflowSubmitter {
    inner: Arc<SubmitterInner>,
}

impl WorkflowSubmitter {
    /// Starts the worker. Must be called inside a tokio runtime.
    pub fn spawn(argo: ArgoClient, callback_url: Url, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let closing = CancellationToken::new();
        let cancel = CancellationToken::new();

        let worker = SubmitWorker {
            argo,
            receiver,
            closing: closing.clone(),
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(worker.run());

        Self {
            inner: Arc::new(SubmitterInner {
                sender,
                callback_url,
                closing,
                cancel,
                worker: Mutex::new(Some(handle)),
            }),
        }
    }

    /// Base URL that submitted workflows call back into.
    pub fn callback_url(&self) -> &Url {
        &self.inner.callback_url
    }

    /// Queues a workflow without waiting.
    ///
    /// Returns `false` if the queue is full or shut down, in which case the
    /// workflow is dropped and logged.
    pub fn enqueue(&self, workflow: Workflow) -> bool {
        if self.inner.closing.is_cancelled() {
            tracing::error!(
                target: TRACING_TARGET_SUBMITTER,
                workflow_name = workflow.name(),
                "Submitter is shutting down, workflow dropped"
            );
            return false;
        }

        match self.inner.sender.try_send(workflow) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(workflow)) => {
                tracing::error!(
                    target: TRACING_TARGET_SUBMITTER,
                    workflow_name = workflow.name(),
                    capacity = self.inner.sender.max_capacity(),
                    "Submission queue is full, workflow dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(workflow)) => {
                tracing::error!(
                    target: TRACING_TARGET_SUBMITTER,
                    workflow_name = workflow.name(),
                    "Submission worker stopped, workflow dropped"
                );
                false
            }
        }
    }

    /// Number of submissions waiting for the worker.
    pub fn pending(&self) -> usize {
        self.inner.sender.max_capacity() - self.inner.sender.capacity()
    }

    /// Stops accepting submissions and waits for the queue to drain.
    ///
    /// Requests still in flight after `timeout` are cancelled. Returns
    /// `true` if everything queued was attempted before the deadline.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.inner.closing.cancel();

        let Some(mut handle) = self.inner.worker.lock().await.take() else {
            return true;
        };

        if tokio::time::timeout(timeout, &mut handle).await.is_ok() {
            tracing::info!(target: TRACING_TARGET_SUBMITTER, "Submission queue drained");
            return true;
        }

        tracing::warn!(
            target: TRACING_TARGET_SUBMITTER,
            timeout_secs = timeout.as_secs(),
            "Submission queue did not drain in time, cancelling"
        );
        self.inner.cancel.cancel();
        let _ = handle.await;
        false
    }
}

struct SubmitWorker {
    argo: ArgoClient,
    receiver: mpsc::Receiver<Workflow>,
    closing: CancellationToken,
    cancel: CancellationToken,
}

impl SubmitWorker {
    async fn run(mut self) {
        loop {
            let workflow = tokio::select! {
                biased;
                () = self.closing.cancelled() => break,
                workflow = self.receiver.recv() => match workflow {
                    Some(workflow) => workflow,
                    None => return,
                },
            };
            self.submit(&workflow).await;
        }

        self.receiver.close();
        tracing::debug!(
            target: TRACING_TARGET_SUBMITTER,
            pending = self.receiver.len(),
            "Draining submission queue"
        );

        while let Some(workflow) = self.receiver.recv().await {
            if self.cancel.is_cancelled() {
                tracing::error!(
                    target: TRACING_TARGET_SUBMITTER,
                    workflow_name = workflow.name(),
                    dropped = self.receiver.len() + 1,
                    "Shutdown deadline passed, queued workflows dropped"
                );
                return;
            }
            self.submit(&workflow).await;
        }
    }

    async fn submit(&self, workflow: &Workflow) {
        let cancel = self.cancel.child_token();
        match self.argo.submit_workflow(workflow, &cancel).await {
            Ok(_) => tracing::info!(
                target: TRACING_TARGET_SUBMITTER,
                workflow_name = workflow.name(),
                "Workflow submitted"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET_SUBMITTER,
                workflow_name = workflow.name(),
                error = %error,
                "Workflow submission failed, committed workflow has no execution"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Router;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use filepipe_argo::{
        ArgoConfig, PipelineConfig, ProcessingStep, RetryPolicy, WorkflowGraphBuilder,
    };
    use tokio::net::TcpListener;

    use super::*;

    async fn mock_argo(status: StatusCode) -> anyhow::Result<(Url, Arc<AtomicUsize>)> {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/api/v1/workflows/argo",
                post(move |State(calls): State<Arc<AtomicUsize>>| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    (status, "{}")
                }),
            )
            .with_state(calls.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?).parse()?;
        tokio::spawn(async move { axum::serve(listener, app).await });
        Ok((url, calls))
    }

    fn client(url: Url) -> anyhow::Result<ArgoClient> {
        let policy = RetryPolicy::new(2, Duration::from_millis(10), Duration::from_secs(2));
        Ok(ArgoClient::new(ArgoConfig::new(url).with_retry_policy(policy))?)
    }

    fn workflow(sequence_id: u64) -> Workflow {
        let pipeline = PipelineConfig::new("count-words", "text/plain")
            .with_step(ProcessingStep::new("count", "count-words"));
        WorkflowGraphBuilder::new(&pipeline, "http://filepipe.local")
            .record("ab12-xy34", sequence_id)
            .files(["notes.txt"])
            .build()
    }

    #[tokio::test]
    async fn shutdown_drains_queue() -> anyhow::Result<()> {
        let (url, calls) = mock_argo(StatusCode::OK).await?;
        let submitter = WorkflowSubmitter::spawn(client(url.clone())?, url, 8);

        for sequence_id in 1..=3 {
            assert!(submitter.enqueue(workflow(sequence_id)));
        }

        assert!(submitter.shutdown(Duration::from_secs(5)).await);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(!submitter.enqueue(workflow(4)));
        Ok(())
    }

    #[tokio::test]
    async fn failed_submission_does_not_stop_worker() -> anyhow::Result<()> {
        let (url, calls) = mock_argo(StatusCode::BAD_REQUEST).await?;
        let submitter = WorkflowSubmitter::spawn(client(url.clone())?, url, 8);

        assert!(submitter.enqueue(workflow(1)));
        assert!(submitter.enqueue(workflow(2)));

        assert!(submitter.shutdown(Duration::from_secs(5)).await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[tokio::test]
    async fn closing_submitter_drops_workflow() -> anyhow::Result<()> {
        let url: Url = "http://127.0.0.1:9".parse()?;
        let submitter = WorkflowSubmitter::spawn(client(url.clone())?, url, 1);
        submitter.inner.closing.cancel();

        assert!(!submitter.enqueue(workflow(1)));
        assert_eq!(submitter.pending(), 0);
        Ok(())
    }
}

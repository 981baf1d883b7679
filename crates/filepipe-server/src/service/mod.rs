//! Application state and dependency injection.

mod config;
mod secret;
mod status;
mod submitter;

use std::sync::Arc;

use filepipe_argo::{ArgoClient, PipelineRegistry};
use filepipe_postgres::PgClient;
use tokio_util::sync::CancellationToken;

pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::secret::{SECRET_KEY_LENGTH, generate_secret_key};
pub use crate::service::status::{StatusQueryError, StatusQueryService, WorkflowDetail};
pub use crate::service::submitter::WorkflowSubmitter;
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    // External services:
    pub postgres: PgClient,
    pub argo: ArgoClient,

    // Internal services:
    pub pipelines: Arc<PipelineRegistry>,
    pub submitter: WorkflowSubmitter,
    pub status_query: StatusQueryService,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Connects to Postgres (applying migrations), loads the pipeline list
    /// and starts the submission worker. Remote status queries are cancelled
    /// once `shutdown` fires.
    pub async fn new(service_config: ServiceConfig, shutdown: &CancellationToken) -> Result<Self> {
        service_config.validate()?;

        let postgres = service_config.connect_postgres().await?;
        let argo = service_config.connect_argo()?;
        let pipelines = service_config.load_pipelines().await?;

        Ok(Self::from_parts(
            postgres,
            argo,
            pipelines,
            &service_config,
            shutdown,
        ))
    }

    /// Assembles state from already created clients.
    ///
    /// Must be called inside a tokio runtime, as it spawns the submission
    /// worker.
    pub fn from_parts(
        postgres: PgClient,
        argo: ArgoClient,
        pipelines: PipelineRegistry,
        service_config: &ServiceConfig,
        shutdown: &CancellationToken,
    ) -> Self {
        let submitter = WorkflowSubmitter::spawn(
            argo.clone(),
            service_config.callback_url.clone(),
            service_config.submission_queue_capacity,
        );
        let status_query =
            StatusQueryService::new(argo.clone(), postgres.clone(), shutdown.child_token());

        Self {
            postgres,
            argo,
            pipelines: Arc::new(pipelines),
            submitter,
            status_query,
        }
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// External services:
impl_di!(postgres: PgClient);
impl_di!(argo: ArgoClient);

// Internal services:
impl_di!(pipelines: Arc<PipelineRegistry>);
impl_di!(submitter: WorkflowSubmitter);
impl_di!(status_query: StatusQueryService);

use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use filepipe_argo::{ArgoClient, ArgoConfig, PipelineRegistry};
use filepipe_postgres::{PgClient, PgConfig, run_pending_migrations};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result, TRACING_TARGET_SERVICE};

/// Default values for configuration options.
mod defaults {
    use std::path::PathBuf;

    /// Default location of the pipeline list.
    pub fn pipelines_path() -> PathBuf {
        "./pipelines.json".into()
    }

    /// Default number of submissions waiting for the worker.
    pub const SUBMISSION_QUEUE_CAPACITY: usize = 64;
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate", error = "Error")
)]
pub struct ServiceConfig {
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres: PgConfig,

    #[cfg_attr(feature = "config", command(flatten))]
    pub argo: ArgoConfig,

    /// Base URL workflow tasks call back into
    #[cfg_attr(feature = "config", arg(long = "callback-url", env = "CALLBACK_URL"))]
    pub callback_url: Url,

    /// JSON file listing the configured pipelines
    #[cfg_attr(
        feature = "config",
        arg(long = "pipelines", env = "PIPELINES_PATH", default_value = "./pipelines.json")
    )]
    #[builder(default = "defaults::pipelines_path()")]
    pub pipelines_path: PathBuf,

    /// Submissions that may wait for the worker before new ones are dropped
    #[cfg_attr(
        feature = "config",
        arg(
            long = "submission-queue-capacity",
            env = "SUBMISSION_QUEUE_CAPACITY",
            default_value_t = defaults::SUBMISSION_QUEUE_CAPACITY
        )
    )]
    #[builder(default = "defaults::SUBMISSION_QUEUE_CAPACITY")]
    pub submission_queue_capacity: usize,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Checks values that clap cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        validate_callback_url(&self.callback_url)?;
        validate_queue_capacity(self.submission_queue_capacity)?;
        validate_postgres(&self.postgres)
    }

    /// Creates the connection pool and applies pending migrations.
    pub async fn connect_postgres(&self) -> Result<PgClient> {
        let pg_client = PgClient::new(self.postgres.clone())?;
        let migrations = run_pending_migrations(&pg_client).await?;

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            applied = migrations.applied_versions.len(),
            duration_ms = migrations.duration.as_millis() as u64,
            "Database is up to date"
        );

        Ok(pg_client)
    }

    /// Creates the workflow engine client.
    pub fn connect_argo(&self) -> Result<ArgoClient> {
        Ok(ArgoClient::new(self.argo.clone())?)
    }

    /// Loads and validates the pipeline list.
    pub async fn load_pipelines(&self) -> Result<PipelineRegistry> {
        let registry = PipelineRegistry::from_file(&self.pipelines_path).await?;

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            path = %self.pipelines_path.display(),
            pipelines = registry.len(),
            "Loaded pipeline configuration"
        );

        Ok(registry)
    }
}

fn validate_callback_url(url: &Url) -> Result<()> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config("Callback URL must use http or https"));
    }
    if url.cannot_be_a_base() || url.host().is_none() {
        return Err(Error::config("Callback URL must include a host"));
    }
    Ok(())
}

fn validate_queue_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(Error::config(
            "Submission queue capacity must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_postgres(config: &PgConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| Error::config(e.to_string()).with_source(e))
}

impl ServiceConfigBuilder {
    fn validate(builder: &ServiceConfigBuilder) -> Result<()> {
        if let Some(url) = &builder.callback_url {
            validate_callback_url(url)?;
        }
        if let Some(capacity) = builder.submission_queue_capacity {
            validate_queue_capacity(capacity)?;
        }
        if let Some(postgres) = &builder.postgres {
            validate_postgres(postgres)?;
        }
        Ok(())
    }
}

impl From<derive_builder::UninitializedFieldError> for Error {
    fn from(error: derive_builder::UninitializedFieldError) -> Self {
        Error::config(format!("Missing service configuration: {}", error.field_name()))
    }
}

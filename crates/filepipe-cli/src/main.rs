#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use filepipe_server::handler::routes;
use filepipe_server::middleware::{
    RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt, RouterSecurityExt,
};
use filepipe_server::service::ServiceState;
use tokio_util::sync::CancellationToken;

use crate::config::{Cli, MiddlewareConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "filepipe_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "filepipe_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "filepipe_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    Cli::init_tracing();

    cli.log();
    cli.validate()?;

    let shutdown = CancellationToken::new();
    let state = ServiceState::new(cli.service.clone(), &shutdown)
        .await
        .context("failed to create service state")?;

    let router = create_router(state.clone(), &cli.middleware);
    let signal = server::shutdown_signal(shutdown.clone());
    let served = server::serve(router, &cli.server, signal).await;

    // Queued submissions get the grace period even if serving failed.
    shutdown.cancel();
    drain_submissions(&state, &cli).await;

    served.context("http server failed")
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost): catches panics and enforces timeouts
/// 2. Observability: request IDs and tracing spans
/// 3. Security: CORS, body limits and headers
/// 4. Routes (innermost): the API and its OpenAPI document
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes()
        .with_open_api(middleware.openapi.clone())
        .with_state(state)
        .with_security(&middleware.cors)
        .with_observability()
        .with_recovery(&middleware.recovery)
}

async fn drain_submissions(state: &ServiceState, cli: &Cli) {
    let timeout = cli.server.shutdown_timeout();
    let pending = state.submitter.pending();

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        pending,
        timeout_secs = timeout.as_secs(),
        "draining submission queue"
    );

    if !state.submitter.shutdown(timeout).await {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "submission queue did not drain in time, remaining workflows were dropped"
        );
    }
}

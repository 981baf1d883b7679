//! Liveness and readiness probes.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use filepipe_postgres::PgClient;

use crate::extract::Json;
use crate::handler::response::{Liveness, Readiness};
use crate::service::ServiceState;

/// Tracing target for health probes.
const TRACING_TARGET: &str = "filepipe_server::handler::monitors";

async fn liveness() -> (StatusCode, Json<Liveness>) {
    (StatusCode::OK, Json(Liveness { alive: true }))
}

fn liveness_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Liveness probe")
        .description("Answers as long as the process serves requests.")
        .response::<200, Json<Liveness>>()
}

#[tracing::instrument(skip_all)]
async fn readiness(State(pg_client): State<PgClient>) -> (StatusCode, Json<Readiness>) {
    match pg_client.ping().await {
        Ok(()) => (StatusCode::OK, Json(Readiness::new(true))),
        Err(error) => {
            tracing::warn!(target: TRACING_TARGET, error = %error, "Database is not reachable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(Readiness::new(false)))
        }
    }
}

fn readiness_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Readiness probe")
        .description("Answers `503` while the database cannot be reached.")
        .response::<200, Json<Readiness>>()
        .response::<503, Json<Readiness>>()
}

/// Returns a [`Router`] with the health probe routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/health/liveness", get_with(liveness, liveness_docs))
        .api_route("/health/readiness", get_with(readiness, readiness_docs))
        .with_path_items(|item| item.tag("Health"))
}

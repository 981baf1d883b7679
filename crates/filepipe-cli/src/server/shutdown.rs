//! Graceful shutdown signal handling.

use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix;
use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Resolves on SIGINT, SIGTERM (Unix) or when `shutdown` is cancelled elsewhere.
///
/// Cancels `shutdown` before returning, which aborts outstanding engine
/// queries so in-flight requests finish quickly.
pub async fn shutdown_signal(shutdown: CancellationToken) {
    let interrupt = async {
        match ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %err,
                    "Failed to listen for SIGINT"
                );
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                "SIGTERM"
            }
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %err,
                    "Failed to listen for SIGTERM"
                );
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let reason = tokio::select! {
        signal = interrupt => signal,
        signal = terminate => signal,
        () = shutdown.cancelled() => "cancellation",
    };

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        reason,
        "Graceful shutdown initiated"
    );

    shutdown.cancel();
}

//! HTTP server startup.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves `app` until `signal` resolves.
///
/// Returns once every in-flight request has completed.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve<F>(app: Router, server_config: &ServerConfig, signal: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let server_addr = server_config.server_addr();
    let listener = TcpListener::bind(server_addr)
        .await
        .inspect_err(|err| log_failure(err, "Failed to bind to address"))?;

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server bound to all interfaces, ensure firewall is configured"
        );
    }

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "Server is ready and listening for connections"
    );

    let started = Instant::now();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(signal)
    .await
    .inspect_err(|err| log_failure(err, "Server failed"))?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        uptime_secs = started.elapsed().as_secs(),
        "HTTP server stopped"
    );

    Ok(())
}

fn log_failure(err: &io::Error, message: &'static str) {
    tracing::error!(
        target: TRACING_TARGET_SERVER_STARTUP,
        error = %err,
        kind = ?err.kind(),
        hint = hint(err),
        "{message}"
    );
}

/// Returns an operator hint for common bind failures.
fn hint(err: &io::Error) -> Option<&'static str> {
    match err.kind() {
        io::ErrorKind::PermissionDenied => Some("use a port above 1024"),
        io::ErrorKind::AddrInUse => Some("another process is listening on this port"),
        io::ErrorKind::AddrNotAvailable => Some("the host address is not assigned to this machine"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;

    #[tokio::test]
    async fn reports_address_in_use() -> anyhow::Result<()> {
        let occupied = TcpListener::bind("127.0.0.1:0").await?;
        let config = ServerConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: occupied.local_addr()?.port(),
            ..ServerConfig::default()
        };

        let error = serve(Router::new(), &config, std::future::ready(()))
            .await
            .err()
            .ok_or_else(|| anyhow::anyhow!("bind should fail"))?;
        assert_eq!(error.kind(), io::ErrorKind::AddrInUse);
        Ok(())
    }

    #[tokio::test]
    async fn stops_when_signalled() -> anyhow::Result<()> {
        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };

        serve(Router::new(), &config, std::future::ready(())).await?;
        Ok(())
    }

    #[test]
    fn hints_at_busy_port() {
        assert!(hint(&io::Error::from(io::ErrorKind::AddrInUse)).is_some());
        assert!(hint(&io::Error::other("boom")).is_none());
    }
}

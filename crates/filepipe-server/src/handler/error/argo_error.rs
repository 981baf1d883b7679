//! Workflow engine error to HTTP error conversion.
//!
//! Remote messages, URLs and retry counts stay in the logs; clients only
//! learn whether the engine rejected the request or could not be reached.

use filepipe_argo::Error as ArgoError;

use crate::handler::{Error, ErrorKind};

const TRACING_TARGET: &str = "filepipe_server::argo";

impl From<ArgoError> for Error<'static> {
    fn from(error: ArgoError) -> Self {
        match error {
            ArgoError::Client { status: 404, .. } => {
                tracing::debug!(target: TRACING_TARGET, error = %error, "workflow not found");
                ErrorKind::NotFound
                    .with_message("Workflow not found")
                    .with_resource("workflow")
            }
            ArgoError::Client { .. } => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "workflow engine rejected the request"
                );
                ErrorKind::InternalServerError
                    .with_message("Request could not be processed by the workflow engine")
            }
            ArgoError::Server { .. } | ArgoError::Transport(_) | ArgoError::Cancelled => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "workflow engine unavailable"
                );
                ErrorKind::ServiceUnavailable
                    .with_message("Workflow engine might currently be unavailable")
            }
            other => {
                tracing::error!(target: TRACING_TARGET, error = %other, "workflow engine error");
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(status: u16) -> ArgoError {
        ArgoError::Client {
            status,
            message: "http://argo.internal/api/v1/workflows/argo".to_owned(),
        }
    }

    #[test]
    fn client_error_is_internal() {
        let error: Error = client(400).into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert!(!error.message().unwrap_or_default().contains("argo.internal"));
    }

    #[test]
    fn missing_workflow_is_not_found() {
        let error: Error = client(404).into();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn server_error_is_unavailable() {
        let error: Error = ArgoError::Server {
            status: 503,
            message: "upstream connect error".to_owned(),
        }
        .into();
        assert_eq!(error.kind(), ErrorKind::ServiceUnavailable);
    }
}

//! Errors returned by the HTTP and Argo clients.

use std::borrow::Cow;

/// Upper bound on how much of a response body is kept in an error message.
const MAX_MESSAGE_LEN: usize = 1024;

/// Errors returned by [`HttpClient`] and [`ArgoClient`].
///
/// [`HttpClient`]: crate::HttpClient
/// [`ArgoClient`]: crate::ArgoClient
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote answered with a 4xx status. Never retried.
    #[error("client error ({status}): {message}")]
    Client { status: u16, message: String },

    /// The remote answered with a 5xx status on the last attempt.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The remote answered with a status that is neither success nor error.
    #[error("unexpected status ({status}): {message}")]
    Unexpected { status: u16, message: String },

    /// The request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not the expected JSON document.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The request URL could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(Cow<'static, str>),

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,
}

impl Error {
    /// Builds the error for a non-success status and its response body.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &[u8]) -> Self {
        let mut message = String::from_utf8_lossy(body).trim().to_owned();
        if message.len() > MAX_MESSAGE_LEN {
            let mut end = MAX_MESSAGE_LEN;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message.truncate(end);
        }

        let code = status.as_u16();
        if status.is_client_error() {
            Self::Client {
                status: code,
                message,
            }
        } else if status.is_server_error() {
            Self::Server {
                status: code,
                message,
            }
        } else {
            Self::Unexpected {
                status: code,
                message,
            }
        }
    }

    /// Returns whether another attempt may succeed.
    ///
    /// Only transport failures and 5xx responses are retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Transport(_))
    }

    /// Returns the HTTP status the remote answered with, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. }
            | Self::Server { status, .. }
            | Self::Unexpected { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Specialized [`Result`] type for remote calls.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn classifies_statuses() {
        let error = Error::from_status(StatusCode::BAD_REQUEST, b"bad payload");
        assert!(matches!(error, Error::Client { status: 400, .. }));
        assert!(!error.is_retryable());

        let error = Error::from_status(StatusCode::SERVICE_UNAVAILABLE, b"");
        assert!(matches!(error, Error::Server { status: 503, .. }));
        assert!(error.is_retryable());

        let error = Error::from_status(StatusCode::NOT_MODIFIED, b"");
        assert!(matches!(error, Error::Unexpected { status: 304, .. }));
        assert!(!error.is_retryable());
    }

    #[test]
    fn truncates_long_bodies() {
        let body = "é".repeat(MAX_MESSAGE_LEN);
        let error = Error::from_status(StatusCode::INTERNAL_SERVER_ERROR, body.as_bytes());
        let Error::Server { message, .. } = error else {
            panic!("expected server error");
        };
        assert!(message.len() <= MAX_MESSAGE_LEN);
    }

    #[test]
    fn cancellation_is_final() {
        assert!(!Error::Cancelled.is_retryable());
        assert_eq!(Error::Cancelled.status(), None);
    }
}

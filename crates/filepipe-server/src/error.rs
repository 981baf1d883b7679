//! Service layer error types.
//!
//! Raised while building the [`ServiceState`] from configuration, before any
//! request is served. Request-time failures use the handler [`Error`] instead.
//!
//! [`ServiceState`]: crate::service::ServiceState
//! [`Error`]: crate::handler::Error

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Boxed error that is `Send + Sync`, used as an error source.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for service layer operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Category of a service layer error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid or inconsistent configuration.
    Config,
    /// An external service could not be reached or set up.
    External,
    /// A file could not be read.
    FileSystem,
    /// Internal service logic errors.
    Internal,
}

impl ErrorKind {
    /// Returns the error kind as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::External => "external_service",
            Self::FileSystem => "file_system",
            Self::Internal => "internal_service",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service layer error with a kind, a message and an optional source.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    #[inline]
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a new configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a new external service error, prefixed with the service name.
    #[inline]
    pub fn external(service: &str, message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::External, format!("{service}: {message}"))
    }

    /// Creates a new file system error.
    #[inline]
    pub fn file_system(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::FileSystem, message)
    }

    /// Creates a new internal service error.
    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl From<filepipe_postgres::PgError> for Error {
    fn from(err: filepipe_postgres::PgError) -> Self {
        Error::external("postgres", &err).with_source(err)
    }
}

impl From<filepipe_argo::Error> for Error {
    fn from(err: filepipe_argo::Error) -> Self {
        Error::external("argo", &err).with_source(err)
    }
}

impl From<filepipe_argo::PipelineError> for Error {
    fn from(err: filepipe_argo::PipelineError) -> Self {
        let kind = match &err {
            filepipe_argo::PipelineError::Io { .. } => ErrorKind::FileSystem,
            _ => ErrorKind::Config,
        };
        Error::new(kind, err.to_string()).with_source(err)
    }
}

//! [`Error`], [`ErrorKind`] and [`Result`].

mod argo_error;
mod http_error;
mod pg_error;
mod workflow_error;

pub use http_error::{Error, ErrorKind, Result};

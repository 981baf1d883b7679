#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod service;

pub use crate::error::{BoxedError, Error, ErrorKind, Result};

/// Tracing target for request handlers.
pub const TRACING_TARGET_HANDLER: &str = "filepipe_server::handler";

/// Tracing target for the workflow submission queue.
pub const TRACING_TARGET_SUBMITTER: &str = "filepipe_server::submitter";

/// Tracing target for service initialization.
pub const TRACING_TARGET_SERVICE: &str = "filepipe_server::service";

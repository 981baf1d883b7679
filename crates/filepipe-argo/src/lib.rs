#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod client;
pub mod http;
pub mod pipeline;
pub mod workflow;

pub use client::{ArgoClient, ArgoConfig, ListQuery};
pub use error::{Error, Result};
pub use http::{HttpClient, RequestOptions, RetryPolicy};
pub use pipeline::{FileMismatch, PipelineConfig, PipelineError, PipelineRegistry, ProcessingStep};
pub use workflow::{
    NameFormatError, StatusFilterError, Workflow, WorkflowGraphBuilder, WorkflowName,
    WorkflowState, format_status_filter, parse_status_filter,
};

/// Tracing target for the resilient HTTP client.
pub const TRACING_TARGET_HTTP: &str = "filepipe_argo::http";

/// Tracing target for Argo API operations.
pub const TRACING_TARGET_CLIENT: &str = "filepipe_argo::client";

/// Tracing target for pipeline configuration loading.
pub const TRACING_TARGET_PIPELINE: &str = "filepipe_argo::pipeline";

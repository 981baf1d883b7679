//! Argo Workflows API client.
//!
//! [`ArgoClient`] wraps the resilient [`HttpClient`](crate::HttpClient)
//! with the three endpoints the service needs: workflow creation, the
//! filtered listing and the single-workflow detail.

mod argo_client;
mod argo_config;
mod list_query;

pub use argo_client::ArgoClient;
pub use argo_config::{ArgoConfig, DEFAULT_NAMESPACE, DEFAULT_USER_AGENT};
pub use list_query::{DEFAULT_LIST_LIMIT, LIST_FIELDS, ListQuery};

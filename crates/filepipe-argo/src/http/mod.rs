//! JSON over HTTP with bounded retries.
//!
//! [`HttpClient`] sends one request per attempt, each bounded by the policy
//! timeout. Transport failures and 5xx answers are retried after a fixed
//! delay until the attempt budget is spent; the last error is returned
//! unchanged. A 4xx answer ends the call at once. A [`CancellationToken`]
//! passed by the caller interrupts both in-flight requests and the wait
//! between attempts.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

mod client;
mod policy;

pub use client::HttpClient;
pub use policy::{RequestOptions, RetryPolicy};

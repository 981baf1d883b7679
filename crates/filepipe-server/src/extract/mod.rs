//! Request extractors that answer with the service's error body.
//!
//! The wrappers in [`reject`] behave like their axum counterparts but turn
//! every rejection into a [`handler::Error`](crate::handler::Error), so a
//! malformed request gets the same JSON shape as any other failure.

pub mod reject;

pub use crate::extract::reject::{Json, Path, Query, ValidateJson};

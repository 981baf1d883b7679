//! Request types for HTTP handlers.

mod executions;
mod paths;
mod validations;
mod workflows;

pub use executions::*;
pub use paths::*;
pub use workflows::*;

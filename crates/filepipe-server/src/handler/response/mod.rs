//! Response types for HTTP handlers.

mod errors;
mod executions;
mod monitors;
mod workflows;

pub use errors::*;
pub use executions::*;
pub use monitors::*;
pub use workflows::*;

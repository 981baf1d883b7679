//! Constraint classifications and other custom types.

mod constraint;

pub use constraint::{
    ConstraintCategory, ConstraintViolation, FileConstraints, WorkflowConstraints,
    WorkflowFileConstraints,
};

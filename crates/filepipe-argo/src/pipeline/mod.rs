//! Declarative pipeline configuration.
//!
//! A pipeline names the mimetype it applies to and an ordered list of
//! processing steps, each pointing at a workflow template installed in the
//! cluster. Pipelines are loaded once at startup into a [`PipelineRegistry`]
//! and never change afterwards.

mod config;
mod registry;

pub use config::{FileMismatch, PipelineConfig, ProcessingStep};
pub use registry::{PipelineError, PipelineRegistry};

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use validator::{Validate, ValidationErrors};

use super::PipelineConfig;
use crate::TRACING_TARGET_PIPELINE;

/// Errors raised while loading pipeline configuration.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to read pipeline configuration '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pipeline configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("pipeline '{name}' is invalid: {errors}")]
    Invalid {
        name: String,
        #[source]
        errors: ValidationErrors,
    },

    #[error("pipeline '{0}' is defined more than once")]
    DuplicateName(String),

    #[error("pipeline '{pipeline}' uses template '{template}' in more than one step")]
    DuplicateTemplate { pipeline: String, template: String },
}

/// Immutable set of pipelines, in configured order.
#[derive(Debug, Clone, Default)]
pub struct PipelineRegistry {
    pipelines: Vec<PipelineConfig>,
    by_name: HashMap<String, usize>,
}

impl PipelineRegistry {
    /// Validates and indexes `pipelines`.
    ///
    /// # Errors
    ///
    /// Fails on the first pipeline that does not validate, on duplicate
    /// pipeline names, and on a template used by two steps of one pipeline
    /// (their task names would collide).
    pub fn new(pipelines: Vec<PipelineConfig>) -> Result<Self, PipelineError> {
        let mut by_name = HashMap::with_capacity(pipelines.len());

        for (index, pipeline) in pipelines.iter().enumerate() {
            pipeline
                .validate()
                .map_err(|errors| PipelineError::Invalid {
                    name: pipeline.name.clone(),
                    errors,
                })?;

            let mut templates = HashSet::new();
            for step in &pipeline.steps {
                if !templates.insert(step.template.as_str()) {
                    return Err(PipelineError::DuplicateTemplate {
                        pipeline: pipeline.name.clone(),
                        template: step.template.clone(),
                    });
                }
            }

            if by_name.insert(pipeline.name.clone(), index).is_some() {
                return Err(PipelineError::DuplicateName(pipeline.name.clone()));
            }
        }

        Ok(Self { pipelines, by_name })
    }

    /// Parses a JSON array of pipelines.
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        let pipelines: Vec<PipelineConfig> = serde_json::from_str(json)?;
        Self::new(pipelines)
    }

    /// Reads and parses a JSON file containing an array of pipelines.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        tracing::info!(
            target: TRACING_TARGET_PIPELINE,
            path = %path.display(),
            "Loading pipeline configuration"
        );

        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PipelineError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let registry = Self::from_json(&json)?;
        tracing::info!(
            target: TRACING_TARGET_PIPELINE,
            pipelines = registry.len(),
            "Pipeline configuration loaded"
        );

        Ok(registry)
    }

    /// Returns the pipeline with the given name.
    pub fn get(&self, name: &str) -> Option<&PipelineConfig> {
        self.by_name.get(name).map(|&index| &self.pipelines[index])
    }

    /// Returns the first pipeline configured for a mimetype.
    pub fn find_by_mimetype(&self, mimetype: &str) -> Option<&PipelineConfig> {
        self.pipelines.iter().find(|p| p.mimetype == mimetype)
    }

    /// Groups `files` under every pipeline that accepts at least one of them.
    ///
    /// `key` returns the `(file_name, mimetype)` of a file. Pipelines keep
    /// their configured order and files keep their input order.
    pub fn group_files<'a, T, F>(
        &'a self,
        files: &'a [T],
        key: F,
    ) -> Vec<(&'a PipelineConfig, Vec<&'a T>)>
    where
        F: Fn(&T) -> (&str, &str),
    {
        self.pipelines
            .iter()
            .filter_map(|pipeline| {
                let accepted: Vec<&T> = files
                    .iter()
                    .filter(|file| {
                        let (name, mimetype) = key(*file);
                        pipeline.accepts(mimetype, name)
                    })
                    .collect();
                (!accepted.is_empty()).then_some((pipeline, accepted))
            })
            .collect()
    }

    /// Iterates over all pipelines in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &PipelineConfig> {
        self.pipelines.iter()
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Why a file cannot be processed by a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileMismatch {
    #[error("workflow requires mimetype: {expected}, found file {file} with type: {found}")]
    Mimetype {
        file: String,
        expected: String,
        found: String,
    },

    #[error("file {file} has no extension")]
    MissingExtension { file: String },

    #[error("file {file} has extension .{found}, expected .{expected}")]
    Extension {
        file: String,
        expected: String,
        found: String,
    },
}

/// A single processing step of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProcessingStep {
    /// Name of the `WorkflowTemplate` resource holding the step.
    #[validate(length(min = 1, message = "step name must not be empty"))]
    pub name: String,
    /// Template inside the resource. Also used to name the step's tasks.
    #[validate(length(min = 1, message = "step template must not be empty"))]
    pub template: String,
}

impl ProcessingStep {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }
}

/// A named pipeline applicable to files of one mimetype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    /// Pipeline name, the first segment of every workflow name built from it.
    #[validate(length(min = 1, message = "pipeline name must not be empty"))]
    pub name: String,
    /// Mimetype of the files the pipeline accepts.
    #[validate(length(min = 1, message = "pipeline mimetype must not be empty"))]
    pub mimetype: String,
    /// Required file extension without the leading dot, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// Processing steps in configured order.
    #[validate(length(min = 1, message = "pipeline needs at least one step"))]
    #[validate(nested)]
    pub steps: Vec<ProcessingStep>,
}

impl PipelineConfig {
    pub fn new(name: impl Into<String>, mimetype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mimetype: mimetype.into(),
            extension: None,
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    #[must_use]
    pub fn with_step(mut self, step: ProcessingStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Returns whether a file with this mimetype and name can be processed.
    ///
    /// The mimetype must match exactly. When an extension is configured the
    /// file name must end with it, compared case-insensitively.
    pub fn accepts(&self, mimetype: &str, file_name: &str) -> bool {
        self.check_file(mimetype, file_name).is_ok()
    }

    /// Like [`accepts`](Self::accepts), but reports why a file is rejected.
    pub fn check_file(&self, mimetype: &str, file_name: &str) -> Result<(), FileMismatch> {
        if self.mimetype != mimetype {
            return Err(FileMismatch::Mimetype {
                file: file_name.to_owned(),
                expected: self.mimetype.clone(),
                found: mimetype.to_owned(),
            });
        }

        let Some(expected) = &self.extension else {
            return Ok(());
        };

        match file_extension(file_name) {
            None => Err(FileMismatch::MissingExtension {
                file: file_name.to_owned(),
            }),
            Some(found) if !found.eq_ignore_ascii_case(expected) => Err(FileMismatch::Extension {
                file: file_name.to_owned(),
                expected: expected.clone(),
                found: found.to_ascii_lowercase(),
            }),
            Some(_) => Ok(()),
        }
    }
}

/// Returns the text after the last dot of a file name, if any.
pub(crate) fn file_extension(file_name: &str) -> Option<&str> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_count() -> PipelineConfig {
        PipelineConfig::new("count-words", "text/plain")
            .with_step(ProcessingStep::new("count-words-template", "count-words"))
    }

    #[test]
    fn valid_pipeline() {
        assert!(word_count().validate().is_ok());
    }

    #[test]
    fn pipeline_without_steps_is_invalid() {
        let pipeline = PipelineConfig::new("count-words", "text/plain");
        let errors = pipeline.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("steps"));
    }

    #[test]
    fn empty_step_template_is_invalid() {
        let pipeline = PipelineConfig::new("count-words", "text/plain")
            .with_step(ProcessingStep::new("count-words-template", ""));
        assert!(pipeline.validate().is_err());
    }

    #[test]
    fn accepts_by_mimetype() {
        let pipeline = word_count();
        assert!(pipeline.accepts("text/plain", "notes"));
        assert!(!pipeline.accepts("application/json", "notes.txt"));
    }

    #[test]
    fn accepts_by_extension() {
        let pipeline = word_count().with_extension("txt");
        assert!(pipeline.accepts("text/plain", "notes.TXT"));
        assert!(!pipeline.accepts("text/plain", "notes.md"));
        assert!(!pipeline.accepts("text/plain", "notes"));
    }

    #[test]
    fn names_the_rejected_file() {
        let pipeline = word_count().with_extension("txt");

        let err = pipeline.check_file("image/png", "a.png").unwrap_err();
        assert_eq!(
            err.to_string(),
            "workflow requires mimetype: text/plain, found file a.png with type: image/png"
        );

        let err = pipeline.check_file("text/plain", "notes").unwrap_err();
        assert_eq!(err.to_string(), "file notes has no extension");

        let err = pipeline.check_file("text/plain", "notes.MD").unwrap_err();
        assert_eq!(err.to_string(), "file notes.MD has extension .md, expected .txt");
    }

    #[test]
    fn extension_of_file_name() {
        assert_eq!(file_extension("a.tar.gz"), Some("gz"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension("trailing."), None);
    }
}

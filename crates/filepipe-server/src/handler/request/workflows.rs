//! Workflow submission request types.

use filepipe_postgres::SubmissionFile;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::validations::MissingAttributes;

/// A file of a record, as named in requests.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestFile {
    /// Key of the file inside the record.
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub mimetype: String,
}

impl RequestFile {
    pub fn new(file_name: impl Into<String>, mimetype: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            mimetype: mimetype.into(),
        }
    }
}

impl From<&RequestFile> for SubmissionFile {
    fn from(file: &RequestFile) -> Self {
        SubmissionFile::new(&file.file_name, &file.mimetype)
    }
}

/// Request to process a file that was just committed to a record.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_process_file"))]
pub struct ProcessFile {
    #[serde(default)]
    pub record_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub mimetype: String,
}

fn validate_process_file(request: &ProcessFile) -> Result<(), ValidationError> {
    MissingAttributes::default()
        .require("recordId", &request.record_id)
        .require("fileName", &request.file_name)
        .require("mimetype", &request.mimetype)
        .finish()
}

/// Request to start every applicable pipeline for a set of files.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_start_workflows"))]
pub struct StartWorkflows {
    #[serde(default)]
    pub files: Vec<RequestFile>,
}

fn validate_start_workflows(request: &StartWorkflows) -> Result<(), ValidationError> {
    MissingAttributes::default()
        .require_files(&request.files, false)
        .finish()
}

/// Request to start one named pipeline for a set of files.
///
/// All files must share one mimetype.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_start_workflow"))]
pub struct StartWorkflow {
    #[serde(default)]
    pub files: Vec<RequestFile>,
}

fn validate_start_workflow(request: &StartWorkflow) -> Result<(), ValidationError> {
    MissingAttributes::default()
        .require_files(&request.files, true)
        .finish()
}

/// Request listing the pipelines applicable to a set of files.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableWorkflowsRequest {
    #[serde(default)]
    pub files: Vec<RequestFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(errors: validator::ValidationErrors) -> String {
        let errors = errors.field_errors();
        let all = errors.get("__all__").expect("struct level error");
        all[0].message.as_deref().unwrap_or_default().to_owned()
    }

    #[test]
    fn process_file_names_missing_attributes() {
        let request = ProcessFile {
            file_name: "notes.txt".to_owned(),
            ..ProcessFile::default()
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(message(errors), "Missing attributes: recordId, mimetype");
    }

    #[test]
    fn complete_process_file_is_valid() {
        let request = ProcessFile {
            record_id: "ab12-xy34".to_owned(),
            file_name: "notes.txt".to_owned(),
            mimetype: "text/plain".to_owned(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn empty_file_list_is_missing() {
        let errors = StartWorkflows::default().validate().unwrap_err();
        assert_eq!(message(errors), "Missing attributes: files");
    }

    #[test]
    fn start_all_allows_mixed_mimetypes() {
        let request = StartWorkflows {
            files: vec![
                RequestFile::new("notes.txt", "text/plain"),
                RequestFile::new("mol.xyz", "chemical/x-xyz"),
            ],
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn start_one_requires_single_mimetype() {
        let request = StartWorkflow {
            files: vec![
                RequestFile::new("notes.txt", "text/plain"),
                RequestFile::new("", "text/plain"),
                RequestFile::new("mol.xyz", "chemical/x-xyz"),
            ],
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(message(errors), "Missing attributes: fileName-1, mimetype-2");
    }
}

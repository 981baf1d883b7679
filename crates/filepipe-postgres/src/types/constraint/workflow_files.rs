//! Workflow files table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Workflow files table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum WorkflowFileConstraints {
    #[strum(serialize = "workflow_files_link_unique")]
    LinkUnique,
    #[strum(serialize = "workflow_files_file_id_fkey")]
    FileReference,
    #[strum(serialize = "workflow_files_workflow_id_fkey")]
    WorkflowReference,
}

impl WorkflowFileConstraints {
    /// Creates a new [`WorkflowFileConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            WorkflowFileConstraints::LinkUnique => ConstraintCategory::Uniqueness,
            WorkflowFileConstraints::FileReference
            | WorkflowFileConstraints::WorkflowReference => ConstraintCategory::BusinessLogic,
        }
    }
}

impl From<WorkflowFileConstraints> for String {
    #[inline]
    fn from(val: WorkflowFileConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for WorkflowFileConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

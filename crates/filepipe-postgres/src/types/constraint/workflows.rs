//! Workflows table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Workflows table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum WorkflowConstraints {
    // Raised when two submissions for one record race on the same sequence number.
    #[strum(serialize = "workflows_record_sequence_unique")]
    RecordSequenceUnique,

    #[strum(serialize = "workflows_sequence_id_min")]
    SequenceIdMin,
    #[strum(serialize = "workflows_workflow_name_not_empty")]
    WorkflowNameNotEmpty,
}

impl WorkflowConstraints {
    /// Creates a new [`WorkflowConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            WorkflowConstraints::RecordSequenceUnique => ConstraintCategory::Uniqueness,
            WorkflowConstraints::SequenceIdMin | WorkflowConstraints::WorkflowNameNotEmpty => {
                ConstraintCategory::Validation
            }
        }
    }
}

impl From<WorkflowConstraints> for String {
    #[inline]
    fn from(val: WorkflowConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for WorkflowConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

//! Database constraint violations, one enum per table.

mod files;
mod workflow_files;
mod workflows;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::files::FileConstraints;
pub use self::workflow_files::WorkflowFileConstraints;
pub use self::workflows::WorkflowConstraints;

/// Any known constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    File(FileConstraints),
    Workflow(WorkflowConstraints),
    WorkflowFile(WorkflowFileConstraints),
}

/// Categories of database constraint violations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Format, length and range checks.
    Validation,
    /// References to rows in other tables.
    BusinessLogic,
    /// Primary keys and unique indexes.
    Uniqueness,
}

impl ConstraintViolation {
    /// Creates a new [`ConstraintViolation`] from the constraint name.
    ///
    /// ```
    /// use filepipe_postgres::types::ConstraintViolation;
    ///
    /// let violation = ConstraintViolation::new("workflows_record_sequence_unique");
    /// assert!(violation.is_some());
    ///
    /// assert!(ConstraintViolation::new("unknown_constraint").is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        let prefix = constraint.split('_').next()?;

        macro_rules! try_parse {
            ($($parser:expr => $variant:ident),+ $(,)?) => {
                None$(.or_else(|| $parser(constraint).map(Self::$variant)))+
            };
        }

        match prefix {
            "files" => try_parse!(FileConstraints::new => File),
            "workflows" => try_parse!(WorkflowConstraints::new => Workflow),
            "workflow" => try_parse!(WorkflowFileConstraints::new => WorkflowFile),
            _ => None,
        }
    }

    /// Returns the table the constraint belongs to.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConstraintViolation::File(_) => "files",
            ConstraintViolation::Workflow(_) => "workflows",
            ConstraintViolation::WorkflowFile(_) => "workflow_files",
        }
    }

    /// Returns the category of this constraint violation.
    pub fn constraint_category(&self) -> ConstraintCategory {
        match self {
            ConstraintViolation::File(c) => c.categorize(),
            ConstraintViolation::Workflow(c) => c.categorize(),
            ConstraintViolation::WorkflowFile(c) => c.categorize(),
        }
    }

    /// Returns the constraint name as used in the database.
    pub fn constraint_name(&self) -> String {
        match self {
            ConstraintViolation::File(c) => c.to_string(),
            ConstraintViolation::Workflow(c) => c.to_string(),
            ConstraintViolation::WorkflowFile(c) => c.to_string(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.constraint_name())
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.constraint_name()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("Unknown constraint: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_constraint_round_trips() {
        let names = FileConstraints::iter()
            .map(|c| c.to_string())
            .chain(WorkflowConstraints::iter().map(|c| c.to_string()))
            .chain(WorkflowFileConstraints::iter().map(|c| c.to_string()));

        for name in names {
            let violation = ConstraintViolation::new(&name);
            assert_eq!(violation.map(|v| v.constraint_name()), Some(name));
        }
    }

    #[test]
    fn dispatches_by_table_prefix() {
        let violation = ConstraintViolation::new("workflow_files_link_unique");
        assert_eq!(
            violation,
            Some(ConstraintViolation::WorkflowFile(
                WorkflowFileConstraints::LinkUnique
            ))
        );
        assert_eq!(violation.map(|v| v.table_name()), Some("workflow_files"));
    }

    #[test]
    fn uniqueness_constraints_are_categorized() {
        for name in [
            "files_record_key_unique",
            "workflows_record_sequence_unique",
            "workflow_files_link_unique",
        ] {
            let category = ConstraintViolation::new(name).map(|v| v.constraint_category());
            assert_eq!(category, Some(ConstraintCategory::Uniqueness), "{name}");
        }
    }

    #[test]
    fn serde_uses_constraint_name() {
        let violation = ConstraintViolation::Workflow(WorkflowConstraints::RecordSequenceUnique);
        let json = serde_json::to_string(&violation).unwrap();
        assert_eq!(json, "\"workflows_record_sequence_unique\"");
    }
}

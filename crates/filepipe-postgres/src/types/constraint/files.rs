//! Files table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Files table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum FileConstraints {
    #[strum(serialize = "files_record_key_unique")]
    RecordKeyUnique,

    #[strum(serialize = "files_record_id_not_empty")]
    RecordIdNotEmpty,
    #[strum(serialize = "files_file_key_not_empty")]
    FileKeyNotEmpty,
}

impl FileConstraints {
    /// Creates a new [`FileConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            FileConstraints::RecordKeyUnique => ConstraintCategory::Uniqueness,
            FileConstraints::RecordIdNotEmpty | FileConstraints::FileKeyNotEmpty => {
                ConstraintCategory::Validation
            }
        }
    }
}

impl From<FileConstraints> for String {
    #[inline]
    fn from(val: FileConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for FileConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

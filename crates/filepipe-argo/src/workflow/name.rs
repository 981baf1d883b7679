//! Canonical workflow names.

use std::fmt;
use std::str::FromStr;

/// Rejection of a string that is not a canonical workflow name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid workflow name '{name}': {reason}")]
pub struct NameFormatError {
    pub name: String,
    pub reason: &'static str,
}

/// Identity of one workflow: `{pipeline}-{record_id}-{sequence_id}`.
///
/// The pipeline name may itself contain dashes. The record id is always
/// two dash-delimited segments, so parsing takes the last segment as the
/// sequence, the two before it as the record id, and the rest as the
/// pipeline name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkflowName {
    pub pipeline: String,
    pub record_id: String,
    pub sequence_id: u64,
}

impl WorkflowName {
    pub fn new(pipeline: impl Into<String>, record_id: impl Into<String>, sequence_id: u64) -> Self {
        Self {
            pipeline: pipeline.into(),
            record_id: record_id.into(),
            sequence_id,
        }
    }
}

impl fmt::Display for WorkflowName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.pipeline, self.record_id, self.sequence_id)
    }
}

impl FromStr for WorkflowName {
    type Err = NameFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = |reason| NameFormatError {
            name: s.to_owned(),
            reason,
        };

        let segments: Vec<&str> = s.split('-').collect();
        if segments.len() < 4 {
            return Err(error("expected at least four dash-delimited segments"));
        }
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(error("empty dash-delimited segment"));
        }

        let (pipeline, rest) = segments.split_at(segments.len() - 3);
        let sequence_id = rest[2]
            .parse::<u64>()
            .map_err(|_| error("trailing segment is not a sequence number"))?;

        Ok(Self {
            pipeline: pipeline.join("-"),
            record_id: rest[..2].join("-"),
            sequence_id,
        })
    }
}

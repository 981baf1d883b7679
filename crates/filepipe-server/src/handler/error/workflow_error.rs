//! Query, naming and file-matching error to HTTP error conversion.

use filepipe_argo::{FileMismatch, NameFormatError, StatusFilterError};

use crate::handler::{Error, ErrorKind};
use crate::service::StatusQueryError;

impl From<StatusFilterError> for Error<'static> {
    fn from(error: StatusFilterError) -> Self {
        ErrorKind::BadRequest
            .with_message(error.to_string())
            .with_resource("status")
    }
}

impl From<NameFormatError> for Error<'static> {
    fn from(error: NameFormatError) -> Self {
        ErrorKind::BadRequest
            .with_message(error.to_string())
            .with_resource("workflowName")
    }
}

impl From<FileMismatch> for Error<'static> {
    fn from(error: FileMismatch) -> Self {
        ErrorKind::BadRequest
            .with_message(error.to_string())
            .with_resource("files")
    }
}

impl From<StatusQueryError> for Error<'static> {
    fn from(error: StatusQueryError) -> Self {
        match error {
            StatusQueryError::StatusFilter(error) => error.into(),
            StatusQueryError::NameFormat(error) => error.into(),
            StatusQueryError::Argo(error) => error.into(),
            StatusQueryError::Postgres(error) => error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use filepipe_argo::{WorkflowName, parse_status_filter};

    use super::*;

    #[test]
    fn unknown_state_names_the_token() {
        let error: Error = parse_status_filter("(Bogus)").unwrap_err().into();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert!(error.message().is_some_and(|m| m.contains("Bogus")));
    }

    #[test]
    fn malformed_name_is_bad_request() {
        let error: Error = "count-words".parse::<WorkflowName>().unwrap_err().into();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.resource(), Some("workflowName"));
    }

    #[test]
    fn status_query_errors_keep_their_mapping() {
        let filter_error = parse_status_filter("[Running]").unwrap_err();
        let error: Error = StatusQueryError::from(filter_error).into();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.resource(), Some("status"));
    }
}

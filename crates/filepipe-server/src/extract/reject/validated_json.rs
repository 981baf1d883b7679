//! JSON extractor that runs `validator` checks after deserialization.

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use super::Json;
use crate::TRACING_TARGET_HANDLER;
use crate::handler::{Error, ErrorKind};

/// Struct-level errors are reported by `validator` under this key.
const STRUCT_LEVEL: &str = "__all__";

/// JSON extractor that also validates the body.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self::new(data))
    }
}

fn format_validation_error(field: &str, error: &ValidationError) -> String {
    match (&error.message, field) {
        (Some(message), STRUCT_LEVEL) => message.to_string(),
        (Some(message), field) => format!("Field '{field}': {message}"),
        (None, field) => format!("Field '{field}' failed validation: {}", error.code),
    }
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));

        let messages = fields
            .iter()
            .flat_map(|(field, field_errors)| {
                field_errors
                    .iter()
                    .map(move |error| format_validation_error(field, error))
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            target: TRACING_TARGET_HANDLER,
            errors = ?messages,
            "request validation failed"
        );

        let message = match messages.as_slice() {
            [] => "Validation failed".to_owned(),
            messages => messages.join(". "),
        };

        ErrorKind::BadRequest.with_message(message)
    }
}

impl<T> aide::OperationInput for ValidateJson<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        Json::<T>::inferred_early_responses(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn struct_level_message_is_used_verbatim() {
        let mut errors = ValidationErrors::new();
        let mut error = ValidationError::new("missing_attributes");
        error.message = Some("Missing attributes: files".into());
        errors.add(STRUCT_LEVEL, error);

        let error = Error::from(errors);
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.message(), Some("Missing attributes: files"));
    }

    #[test]
    fn field_messages_are_prefixed() {
        let mut error = ValidationError::new("length");
        error.message = Some("too long".into());
        assert_eq!(
            format_validation_error("fileName", &error),
            "Field 'fileName': too long"
        );
    }
}

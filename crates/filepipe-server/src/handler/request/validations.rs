//! Request validation utilities.

use validator::ValidationError;

use super::RequestFile;

pub fn validation_error(code: &'static str, message: &str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.to_string().into());
    error
}

/// Collects the names of required attributes that are blank.
#[derive(Debug, Default)]
pub(crate) struct MissingAttributes(Vec<String>);

impl MissingAttributes {
    pub fn require(&mut self, name: impl Into<String>, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.0.push(name.into());
        }
        self
    }

    pub fn push(&mut self, name: impl Into<String>) -> &mut Self {
        self.0.push(name.into());
        self
    }

    /// Checks every file, naming attributes by their index, e.g. `fileName-0`.
    ///
    /// When `same_mimetype` is set, a file whose mimetype differs from the
    /// first file's is reported like a missing one.
    pub fn require_files(&mut self, files: &[RequestFile], same_mimetype: bool) -> &mut Self {
        if files.is_empty() {
            return self.push("files");
        }

        let first = files[0].mimetype.as_str();
        for (index, file) in files.iter().enumerate() {
            self.require(format!("fileName-{index}"), &file.file_name);

            let blank = file.mimetype.trim().is_empty();
            if blank || (same_mimetype && file.mimetype != first) {
                self.push(format!("mimetype-{index}"));
            }
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Ok(());
        }

        let message = format!("Missing attributes: {}", self.0.join(", "));
        Err(validation_error("missing_attributes", &message))
    }
}

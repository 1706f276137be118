//! Form validators.
//!
//! Each form takes the raw submitted values and either returns the cleaned
//! data or a [`FormErrors`] map keyed by field name, which the page layer
//! shows next to the offending inputs.

mod account;
mod comment;
mod group;
mod post;

use std::collections::BTreeMap;

use serde::Serialize;

pub use account::{
    LoginForm, PasswordChangeForm, SignupForm, validate_new_password, validate_username,
};
pub use comment::CommentForm;
pub use group::GroupForm;
pub use post::{CleanPost, PostForm};

/// Key for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_EMPTY_FILE: &str = "The submitted file is empty.";
pub const MSG_INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Field-level validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(value)` when nothing was recorded, the errors otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// A file received in a multipart submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Browsers send an unnamed, empty part when no file was chosen.
    pub fn is_absent(&self) -> bool {
        self.filename.as_deref().is_none_or(str::is_empty) && self.data.is_empty()
    }

    /// Lowercased extension of the client-side file name.
    pub fn extension(&self) -> Option<String> {
        let name = self.filename.as_deref()?;
        let (_, ext) = name.rsplit_once('.')?;
        (!ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .then(|| ext.to_ascii_lowercase())
    }
}

/// Trimmed value of a required text input.
fn required(errors: &mut FormErrors, field: &str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, MSG_REQUIRED);
    }
    value.to_string()
}

//! Portfolio entity records and the inputs that create or replace them.
//!
//! Records are what the backend returns; inputs are what the admin forms
//! submit. Every record kind implements [`Entity`] so a single store
//! implementation can cache any of them.

pub mod certification;
pub mod contact;
pub mod project;

use core::fmt;

pub use certification::{Certification, CertificationInput};
pub use contact::{ContactInput, ContactResponse};
pub use project::{Project, ProjectInput, ProjectLinks};

use crate::types::{Attachment, AttachmentError, EmailError};

/// A record with a backend-assigned identity.
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    /// Identifier type, unique within a store.
    type Id: Clone + Eq + fmt::Display + fmt::Debug + Send + Sync + 'static;

    /// Singular human-readable name, used in logs ("project").
    const KIND: &'static str;

    /// The record's identifier.
    fn id(&self) -> &Self::Id;
}

/// Errors raised by client-side form validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// A required field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The attachment failed validation.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// The email address is malformed.
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),
}

/// A single form field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Scalar text value.
    Text(String),
    /// Ordered list value (descriptions, tags, learnings).
    List(Vec<String>),
}

/// An input that is submitted as a multipart form.
pub trait FormPayload: Send + Sync {
    /// Form part name used for the attachment.
    const ATTACHMENT_FIELD: &'static str;

    /// Named text and list fields, in submission order.
    ///
    /// Optional fields that are unset are omitted.
    fn fields(&self) -> Vec<(&'static str, FieldValue)>;

    /// The attachment, if one was chosen.
    fn attachment(&self) -> Option<&Attachment>;

    /// Validate the input before it is sent.
    ///
    /// # Errors
    ///
    /// Returns the first [`InputError`] found.
    fn validate(&self) -> Result<(), InputError>;
}

/// Fail with [`InputError::MissingField`] when `value` is blank.
pub(crate) fn require(value: &str, field: &'static str) -> Result<(), InputError> {
    if value.trim().is_empty() {
        return Err(InputError::MissingField(field));
    }
    Ok(())
}

/// Push `value` as a text field when it is present and non-blank.
pub(crate) fn push_optional(
    fields: &mut Vec<(&'static str, FieldValue)>,
    name: &'static str,
    value: Option<&String>,
) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        fields.push((name, FieldValue::Text(value.clone())));
    }
}

//! Contact form submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, InputError, require};
use crate::types::{ContactId, Email};

/// A message left through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    /// Backend-assigned identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: ContactId,
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
    /// Message body.
    pub message: String,
    /// When the message was received.
    pub created_at: DateTime<Utc>,
}

impl Entity for ContactResponse {
    type Id = ContactId;

    const KIND: &'static str = "contact";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A contact form submission, sent as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
    pub message: String,
}

impl ContactInput {
    /// Validate the submission before it is sent.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::MissingField`] when the name or message is blank,
    /// [`InputError::Email`] when an email read from a payload file is malformed.
    pub fn validate(&self) -> Result<(), InputError> {
        require(&self.name, "name")?;
        self.normalized_email()?;
        require(&self.message, "message")?;
        Ok(())
    }

    /// The submission as it is sent, with the email trimmed and lowercased.
    ///
    /// An input read from a payload file carries the email exactly as
    /// written; this re-parses it.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Email`] when the email is malformed.
    pub fn normalized(&self) -> Result<Self, InputError> {
        Ok(Self {
            email: self.normalized_email()?,
            ..self.clone()
        })
    }

    fn normalized_email(&self) -> Result<Email, InputError> {
        Email::parse(self.email.as_str()).map_err(InputError::from)
    }
}

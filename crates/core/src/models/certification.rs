//! Certification records.

use serde::{Deserialize, Serialize};

use super::{Entity, FieldValue, FormPayload, InputError, push_optional, require};
use crate::types::{Attachment, CertificationId};

/// A completed course or certification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    /// Backend-assigned identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: CertificationId,
    /// Course title.
    pub course_name: String,
    /// Delivery mode ("Online", "In person").
    #[serde(default)]
    pub mode: String,
    /// Issuing provider.
    #[serde(default)]
    pub provider: String,
    /// Free-text duration.
    #[serde(default)]
    pub duration: String,
    /// Completion date as entered on the form.
    #[serde(default)]
    pub completion_date: String,
    /// Key learnings, in display order.
    #[serde(default)]
    pub key_learnings: Vec<String>,
    /// Stored certificate document reference, if one was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    /// Provider-issued certificate identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,
}

impl Entity for Certification {
    type Id = CertificationId;

    const KIND: &'static str = "certification";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Fields submitted by the certification form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationInput {
    pub course_name: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub completion_date: String,
    #[serde(default)]
    pub key_learnings: Vec<String>,
    #[serde(default)]
    pub certificate_id: Option<String>,
    /// Certificate document (PDF or image) to upload.
    #[serde(skip)]
    pub certificate: Option<Attachment>,
}

impl FormPayload for CertificationInput {
    const ATTACHMENT_FIELD: &'static str = "certificate";

    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        let mut fields = vec![
            ("courseName", FieldValue::Text(self.course_name.clone())),
            ("mode", FieldValue::Text(self.mode.clone())),
            ("provider", FieldValue::Text(self.provider.clone())),
            ("duration", FieldValue::Text(self.duration.clone())),
            (
                "completionDate",
                FieldValue::Text(self.completion_date.clone()),
            ),
            ("keyLearnings", FieldValue::List(self.key_learnings.clone())),
        ];
        push_optional(&mut fields, "certificateId", self.certificate_id.as_ref());
        fields
    }

    fn attachment(&self) -> Option<&Attachment> {
        self.certificate.as_ref()
    }

    fn validate(&self) -> Result<(), InputError> {
        require(&self.course_name, "courseName")?;
        require(&self.provider, "provider")?;
        require(&self.completion_date, "completionDate")?;
        Ok(())
    }
}

impl From<&Certification> for CertificationInput {
    fn from(certification: &Certification) -> Self {
        Self {
            course_name: certification.course_name.clone(),
            mode: certification.mode.clone(),
            provider: certification.provider.clone(),
            duration: certification.duration.clone(),
            completion_date: certification.completion_date.clone(),
            key_learnings: certification.key_learnings.clone(),
            certificate_id: certification.certificate_id.clone(),
            certificate: None,
        }
    }
}

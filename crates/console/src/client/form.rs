//! Request bodies and multipart encoding.

use portfolio_core::{FieldValue, FormPayload};
use reqwest::multipart::{Form, Part};

use super::ApiError;

/// A request body.
pub enum Body {
    /// JSON document.
    Json(serde_json::Value),
    /// Multipart form (entity fields plus optional attachment).
    Multipart(Form),
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(_) => f.write_str("Body::Json"),
            Self::Multipart(form) => f
                .debug_struct("Body::Multipart")
                .field("boundary", &form.boundary())
                .finish(),
        }
    }
}

impl Body {
    /// Serialize `value` into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if the value cannot be serialized.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| ApiError::Validation(format!("Failed to encode request body: {e}")))
    }

    /// Encode a form payload as multipart.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if the attachment's content type is
    /// not a valid MIME type.
    pub fn multipart<P: FormPayload>(payload: &P) -> Result<Self, ApiError> {
        let mut form = Form::new();

        for (name, value) in payload.fields() {
            form = form.text(name, encode_field(&value));
        }

        if let Some(attachment) = payload.attachment() {
            let part = Part::bytes(attachment.bytes().to_vec())
                .file_name(attachment.file_name().to_string())
                .mime_str(attachment.content_type())
                .map_err(|e| {
                    ApiError::Validation(format!(
                        "Invalid content type for {}: {e}",
                        attachment.file_name()
                    ))
                })?;
            form = form.part(P::ATTACHMENT_FIELD, part);
        }

        Ok(Self::Multipart(form))
    }
}

/// Render a field as the text of a multipart part.
///
/// Lists travel as a JSON array in a single part so that order survives and
/// an empty list is distinguishable from an absent field.
#[must_use]
pub fn encode_field(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::List(items) => {
            serde_json::to_string(items).unwrap_or_else(|_| String::from("[]"))
        }
    }
}
